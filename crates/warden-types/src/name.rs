//! Validated object names.
//!
//! Regions and handlers are addressed by name. Names are unique within
//! their namespace and case-insensitive: `"Spawn"` and `"spawn"` refer to
//! the same object. [`ObjectName`] preserves the original spelling for
//! display while comparing, hashing, and sorting by the lowercase form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted name length, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Errors raised when validating an object name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// The name was empty.
    #[error("name must not be empty")]
    Empty,

    /// The name exceeded [`MAX_NAME_LEN`] bytes.
    #[error("name exceeds {MAX_NAME_LEN} characters: {0:?}")]
    TooLong(String),

    /// The name contained a character outside `[A-Za-z0-9_-]`.
    #[error("invalid character {1:?} in name {0:?}")]
    InvalidChar(String, char),
}

/// A validated, case-insensitive object name.
///
/// # Equality Semantics
///
/// `PartialEq`, `Hash`, and `Ord` all operate on the lowercase key, so
/// two names that differ only in case are the same name. [`Display`]
/// and [`as_str`](Self::as_str) keep the spelling the name was created
/// with.
///
/// # Example
///
/// ```
/// use warden_types::ObjectName;
///
/// let a = ObjectName::new("Spawn")?;
/// let b = ObjectName::new("spawn")?;
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "Spawn");
/// assert_eq!(a.key(), "spawn");
/// # Ok::<(), warden_types::NameError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName {
    display: String,
    key: String,
}

impl ObjectName {
    /// Validates and wraps a name.
    ///
    /// Accepted names are 1–64 characters drawn from `[A-Za-z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let display = name.into();
        if display.is_empty() {
            return Err(NameError::Empty);
        }
        if display.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(display));
        }
        if let Some(bad) = display
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(NameError::InvalidChar(display, bad));
        }
        let key = display.to_ascii_lowercase();
        Ok(Self { display, key })
    }

    /// Returns the name as originally spelled.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Returns the lowercase key used for equality and ordering.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ObjectName {}

impl std::hash::Hash for ObjectName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ObjectName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

impl TryFrom<String> for ObjectName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.display
    }
}

impl std::str::FromStr for ObjectName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
