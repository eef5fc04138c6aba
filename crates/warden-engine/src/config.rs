//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default index cell edge length, matching the host's chunk size.
pub const DEFAULT_CELL_SIZE: i32 = 16;

/// Host-supplied engine configuration.
///
/// Constructed by the integration layer and handed to
/// [`Engine::with_config`](crate::Engine::with_config); there is no
/// global configuration state.
///
/// # Example
///
/// ```
/// use warden_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "cell_size": 32 }"#)?;
/// assert_eq!(config.cell_size, 32);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of the coarse index cells, in world units.
    ///
    /// Smaller cells mean fewer false candidates per lookup but more
    /// bucket entries per region. The default aligns with the host's
    /// 16-unit chunks.
    pub cell_size: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}
