//! The engine context.
//!
//! [`Engine`] owns every registry: handlers by name, server-wide regions,
//! and one region namespace per loaded world, each with its own cell
//! index. It is an explicitly constructed object — the host integration
//! layer builds one, shares it (`Arc<Engine>`), and tears it down; there
//! is no global state.
//!
//! # Concurrency
//!
//! The decision path takes a read lock, clones out the `Arc`s it needs,
//! and evaluates lock-free from there. Administrative mutations take the
//! write lock, so a reader never observes a half-applied mutation; cache
//! invalidation happens inside the affected handler under that handler's
//! own write lock before the mutating call returns.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use warden_policy::{evaluate_chain, FlagSet, Handler, Tristate};
use warden_types::{ActorId, ObjectName, Vec3, WorldId};

use crate::config::EngineConfig;
use crate::decision::review_chain;
use crate::error::EngineError;
use crate::event::{ActionEvent, Verdict};
use crate::handlers::{ControllerHandler, GlobalHandler, RuleHandler, GLOBAL_HANDLER_NAME};
use crate::index::CellIndex;
use crate::persist::{HandlerSnapshot, RegionSnapshot};
use crate::region::{Region, Volume, GLOBAL_REGION_NAME};

/// One region namespace (server-wide, or one world) with its index.
struct RegionMap {
    regions: HashMap<String, Arc<Region>>,
    index: CellIndex,
}

impl RegionMap {
    fn new(cell_size: i32) -> Self {
        Self {
            regions: HashMap::new(),
            index: CellIndex::new(cell_size),
        }
    }

    fn insert(&mut self, region: Arc<Region>) {
        self.index.insert(region.name().clone(), region.bounds());
        self.regions
            .insert(region.name().key().to_string(), region);
    }

    fn remove(&mut self, name: &ObjectName) -> Option<Arc<Region>> {
        let region = self.regions.remove(name.key())?;
        self.index.remove(name);
        Some(region)
    }

    fn get(&self, name: &ObjectName) -> Option<&Arc<Region>> {
        self.regions.get(name.key())
    }

    fn collect_containing(&self, world: &WorldId, point: Vec3, out: &mut Vec<Arc<Region>>) {
        let cell = point.cell(self.index.cell_size());
        for name in self.index.candidates(cell) {
            if let Some(region) = self.regions.get(name.key()) {
                if region.is_enabled() && region.contains(point, world) {
                    out.push(Arc::clone(region));
                }
            }
        }
    }
}

struct EngineState {
    handlers: HashMap<String, Arc<dyn Handler>>,
    server: RegionMap,
    worlds: HashMap<WorldId, RegionMap>,
}

/// The region/handler permission-resolution engine.
///
/// # Example
///
/// ```
/// use warden_engine::{Cuboid, Engine};
/// use warden_policy::{Flag, FlagSet, RuleEntry, Tristate};
/// use warden_types::{Vec3, WorldId};
///
/// let engine = Engine::new();
/// let world = WorldId::named("overworld");
///
/// engine.create_region(
///     "spawn",
///     Cuboid::new(Vec3::new(-64.0, 0.0, -64.0), Vec3::new(64.0, 256.0, 64.0)),
/// )?;
/// let shield = engine.create_handler("spawn-shield", 10)?;
/// shield.push_default_rule(RuleEntry::new(
///     FlagSet::of(&[Flag::Damage]),
///     Tristate::Deny,
/// ));
/// engine.link("spawn", "spawn-shield")?;
///
/// let damage = FlagSet::lineage_of(&[Flag::Damage, Flag::Entity]);
/// assert!(!engine.decide(&world, Vec3::new(0.0, 64.0, 0.0), None, damage));
/// assert!(engine.decide(&world, Vec3::new(500.0, 64.0, 0.0), None, damage));
/// # Ok::<(), warden_engine::EngineError>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    global_handler: Arc<GlobalHandler>,
    state: RwLock<EngineState>,
}

impl Engine {
    /// Creates an engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with host-supplied configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let global_handler = Arc::new(GlobalHandler::new());

        let mut server = RegionMap::new(config.cell_size);
        let global_region = Arc::new(Region::global(None));
        global_region.link(Arc::clone(&global_handler) as Arc<dyn Handler>);
        server.insert(global_region);

        let mut handlers: HashMap<String, Arc<dyn Handler>> = HashMap::new();
        handlers.insert(
            GLOBAL_HANDLER_NAME.to_string(),
            Arc::clone(&global_handler) as Arc<dyn Handler>,
        );

        Self {
            config,
            global_handler,
            state: RwLock::new(EngineState {
                handlers,
                server,
                worlds: HashMap::new(),
            }),
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// The always-present baseline handler.
    #[must_use]
    pub fn global_handler(&self) -> &Arc<GlobalHandler> {
        &self.global_handler
    }

    // ── Worlds ───────────────────────────────────────────────

    /// Registers a world, creating its global region. Idempotent.
    pub fn load_world(&self, world: WorldId) {
        let mut state = self.state.write();
        let cell_size = self.config.cell_size;
        state.worlds.entry(world.clone()).or_insert_with(|| {
            info!(world = %world, "world loaded");
            let mut map = RegionMap::new(cell_size);
            map.insert(Arc::new(Region::global(Some(world))));
            map
        });
    }

    /// Drops a world's region namespace.
    pub fn unload_world(&self, world: &WorldId) {
        if self.state.write().worlds.remove(world).is_some() {
            info!(world = %world, "world unloaded");
        }
    }

    // ── Regions ──────────────────────────────────────────────

    /// Creates a server-wide region.
    pub fn create_region(
        &self,
        name: &str,
        volume: impl Volume + 'static,
    ) -> Result<Arc<Region>, EngineError> {
        let name = ObjectName::new(name)?;
        reject_reserved_region(&name)?;
        let mut state = self.state.write();
        if state.server.get(&name).is_some() {
            return Err(EngineError::NameTaken(name.as_str().to_string()));
        }
        let region = Arc::new(Region::server(name.clone(), volume));
        state.server.insert(Arc::clone(&region));
        info!(region = %name, "region created");
        Ok(region)
    }

    /// Creates a region scoped to a loaded world.
    pub fn create_world_region(
        &self,
        world: &WorldId,
        name: &str,
        volume: impl Volume + 'static,
    ) -> Result<Arc<Region>, EngineError> {
        let name = ObjectName::new(name)?;
        reject_reserved_region(&name)?;
        let mut state = self.state.write();
        let Some(map) = state.worlds.get_mut(world) else {
            return Err(EngineError::UnknownWorld(world.name().to_string()));
        };
        if map.get(&name).is_some() {
            return Err(EngineError::NameTaken(name.as_str().to_string()));
        }
        let region = Arc::new(Region::world_scoped(name.clone(), world.clone(), volume));
        map.insert(Arc::clone(&region));
        info!(region = %name, world = %world, "world region created");
        Ok(region)
    }

    /// Removes a server-wide region.
    pub fn remove_region(&self, name: &str) -> Result<(), EngineError> {
        let name = ObjectName::new(name)?;
        reject_reserved_region(&name)?;
        let mut state = self.state.write();
        state
            .server
            .remove(&name)
            .ok_or_else(|| EngineError::UnknownRegion(name.as_str().to_string()))?;
        info!(region = %name, "region removed");
        Ok(())
    }

    /// Removes a world-scoped region.
    pub fn remove_world_region(&self, world: &WorldId, name: &str) -> Result<(), EngineError> {
        let name = ObjectName::new(name)?;
        reject_reserved_region(&name)?;
        let mut state = self.state.write();
        let Some(map) = state.worlds.get_mut(world) else {
            return Err(EngineError::UnknownWorld(world.name().to_string()));
        };
        map.remove(&name)
            .ok_or_else(|| EngineError::UnknownRegion(name.as_str().to_string()))?;
        info!(region = %name, world = %world, "world region removed");
        Ok(())
    }

    /// Looks up a server-wide region.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<Arc<Region>> {
        let name = ObjectName::new(name).ok()?;
        self.state.read().server.get(&name).cloned()
    }

    /// Looks up a world-scoped region.
    #[must_use]
    pub fn world_region(&self, world: &WorldId, name: &str) -> Option<Arc<Region>> {
        let name = ObjectName::new(name).ok()?;
        self.state.read().worlds.get(world)?.get(&name).cloned()
    }

    // ── Handlers ─────────────────────────────────────────────

    /// Creates and registers a rule handler, returning the typed handle
    /// used for rule and group edits.
    pub fn create_handler(
        &self,
        name: &str,
        priority: i32,
    ) -> Result<Arc<RuleHandler>, EngineError> {
        let name = ObjectName::new(name)?;
        let handler = Arc::new(RuleHandler::new(name, priority));
        self.register_handler(Arc::clone(&handler) as Arc<dyn Handler>)?;
        Ok(handler)
    }

    /// Creates and registers a controller handler.
    pub fn create_controller(
        &self,
        name: &str,
        priority: i32,
    ) -> Result<Arc<ControllerHandler>, EngineError> {
        let name = ObjectName::new(name)?;
        let handler = Arc::new(ControllerHandler::new(name, priority));
        self.register_handler(Arc::clone(&handler) as Arc<dyn Handler>)?;
        Ok(handler)
    }

    /// Registers a host-implemented handler.
    pub fn register_handler(&self, handler: Arc<dyn Handler>) -> Result<(), EngineError> {
        let name = handler.name().clone();
        if name.key() == GLOBAL_HANDLER_NAME {
            return Err(EngineError::Reserved(name.as_str().to_string()));
        }
        let mut state = self.state.write();
        if state.handlers.contains_key(name.key()) {
            return Err(EngineError::NameTaken(name.as_str().to_string()));
        }
        state.handlers.insert(name.key().to_string(), handler);
        info!(handler = %name, "handler registered");
        Ok(())
    }

    /// Removes a handler and unlinks it from every region.
    pub fn remove_handler(&self, name: &str) -> Result<(), EngineError> {
        let name = ObjectName::new(name)?;
        if name.key() == GLOBAL_HANDLER_NAME {
            return Err(EngineError::Reserved(name.as_str().to_string()));
        }
        let mut state = self.state.write();
        if state.handlers.remove(name.key()).is_none() {
            return Err(EngineError::UnknownHandler(name.as_str().to_string()));
        }
        for region in state.server.regions.values() {
            region.unlink(&name);
        }
        for map in state.worlds.values() {
            for region in map.regions.values() {
                region.unlink(&name);
            }
        }
        info!(handler = %name, "handler removed");
        Ok(())
    }

    /// Looks up a handler by name.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        let name = ObjectName::new(name).ok()?;
        self.state.read().handlers.get(name.key()).cloned()
    }

    // ── Links ────────────────────────────────────────────────

    /// Links a handler to a server-wide region.
    pub fn link(&self, region: &str, handler: &str) -> Result<(), EngineError> {
        let region_name = ObjectName::new(region)?;
        let handler_name = ObjectName::new(handler)?;
        let state = self.state.write();
        let region = state
            .server
            .get(&region_name)
            .ok_or_else(|| EngineError::UnknownRegion(region_name.as_str().to_string()))?;
        let handler = state
            .handlers
            .get(handler_name.key())
            .ok_or_else(|| EngineError::UnknownHandler(handler_name.as_str().to_string()))?;
        link_pair(region, handler)
    }

    /// Links a handler to a world-scoped region.
    pub fn link_world(
        &self,
        world: &WorldId,
        region: &str,
        handler: &str,
    ) -> Result<(), EngineError> {
        let region_name = ObjectName::new(region)?;
        let handler_name = ObjectName::new(handler)?;
        let state = self.state.write();
        let map = state
            .worlds
            .get(world)
            .ok_or_else(|| EngineError::UnknownWorld(world.name().to_string()))?;
        let region = map
            .get(&region_name)
            .ok_or_else(|| EngineError::UnknownRegion(region_name.as_str().to_string()))?;
        let handler = state
            .handlers
            .get(handler_name.key())
            .ok_or_else(|| EngineError::UnknownHandler(handler_name.as_str().to_string()))?;
        link_pair(region, handler)
    }

    /// Unlinks a handler from a server-wide region.
    pub fn unlink(&self, region: &str, handler: &str) -> Result<(), EngineError> {
        let region_name = ObjectName::new(region)?;
        let handler_name = ObjectName::new(handler)?;
        let state = self.state.write();
        let region = state
            .server
            .get(&region_name)
            .ok_or_else(|| EngineError::UnknownRegion(region_name.as_str().to_string()))?;
        if !region.unlink(&handler_name) {
            return Err(EngineError::NotLinked {
                region: region_name.as_str().to_string(),
                handler: handler_name.as_str().to_string(),
            });
        }
        debug!(region = %region_name, handler = %handler_name, "unlinked");
        Ok(())
    }

    /// Unlinks a handler from a world-scoped region.
    pub fn unlink_world(
        &self,
        world: &WorldId,
        region: &str,
        handler: &str,
    ) -> Result<(), EngineError> {
        let region_name = ObjectName::new(region)?;
        let handler_name = ObjectName::new(handler)?;
        let state = self.state.write();
        let map = state
            .worlds
            .get(world)
            .ok_or_else(|| EngineError::UnknownWorld(world.name().to_string()))?;
        let region = map
            .get(&region_name)
            .ok_or_else(|| EngineError::UnknownRegion(region_name.as_str().to_string()))?;
        if !region.unlink(&handler_name) {
            return Err(EngineError::NotLinked {
                region: region_name.as_str().to_string(),
                handler: handler_name.as_str().to_string(),
            });
        }
        debug!(region = %region_name, world = %world, handler = %handler_name, "unlinked");
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────

    /// Registers a rule handler rebuilt from a stored snapshot.
    pub fn restore_handler(
        &self,
        snapshot: &HandlerSnapshot,
    ) -> Result<Arc<RuleHandler>, EngineError> {
        let handler = RuleHandler::from_snapshot(snapshot);
        self.register_handler(Arc::clone(&handler) as Arc<dyn Handler>)?;
        Ok(handler)
    }

    /// Recreates a region from a stored snapshot, re-linking its
    /// handlers. Links whose handler is not registered are skipped with
    /// a warning; the persistence collaborator recreates those units
    /// separately.
    pub fn restore_region(&self, snapshot: &RegionSnapshot) -> Result<Arc<Region>, EngineError> {
        reject_reserved_region(&snapshot.name)?;
        let volume = snapshot.volume.build();

        let mut state = self.state.write();
        let map = match &snapshot.world {
            None => &mut state.server,
            Some(world) => state
                .worlds
                .get_mut(world)
                .ok_or_else(|| EngineError::UnknownWorld(world.name().to_string()))?,
        };
        if map.get(&snapshot.name).is_some() {
            return Err(EngineError::NameTaken(snapshot.name.as_str().to_string()));
        }
        let region = Arc::new(Region::from_parts(
            snapshot.name.clone(),
            snapshot.world.clone(),
            volume,
            snapshot.enabled,
        ));
        map.insert(Arc::clone(&region));

        for link in &snapshot.links {
            match state.handlers.get(link.key()) {
                Some(handler) => {
                    region.link(Arc::clone(handler));
                }
                None => {
                    warn!(region = %snapshot.name, handler = %link, "stored link skipped: handler not registered");
                }
            }
        }
        info!(region = %snapshot.name, "region restored");
        Ok(region)
    }

    // ── Decision path ────────────────────────────────────────

    /// Every enabled region whose volume contains the point in this
    /// world, global regions included. No ordering guarantee.
    #[must_use]
    pub fn regions_containing(&self, world: &WorldId, point: Vec3) -> Vec<Arc<Region>> {
        let state = self.state.read();
        let mut out = Vec::new();
        state.server.collect_containing(world, point, &mut out);
        if let Some(map) = state.worlds.get(world) {
            map.collect_containing(world, point, &mut out);
        }
        out
    }

    /// The de-duplicated, enabled handlers of every region covering the
    /// point, sorted by descending priority, ties by name.
    #[must_use]
    pub fn handlers_at(&self, world: &WorldId, point: Vec3) -> Vec<Arc<dyn Handler>> {
        let regions = self.regions_containing(world, point);
        let mut seen: HashSet<String> = HashSet::new();
        let mut handlers: Vec<Arc<dyn Handler>> = Vec::new();
        for region in &regions {
            for handler in region.handlers() {
                if handler.is_enabled() && seen.insert(handler.name().key().to_string()) {
                    handlers.push(handler);
                }
            }
        }
        handlers.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        handlers
    }

    /// Low-level decision: `true` iff the folded vote is not Deny.
    ///
    /// Undefined fails open — unregulated space imposes no restriction.
    #[must_use]
    pub fn decide(
        &self,
        world: &WorldId,
        point: Vec3,
        actor: Option<&ActorId>,
        flags: FlagSet,
    ) -> bool {
        let handlers = self.handlers_at(world, point);
        let vote = evaluate_chain(&handlers, actor, flags);
        if vote == Tristate::Deny {
            debug!(world = %world, %point, %flags, "action denied");
            false
        } else {
            true
        }
    }

    /// Full host surface: exemption probe, main probe, and the lethal
    /// mitigation pass.
    #[must_use]
    pub fn review(&self, event: &ActionEvent) -> Verdict {
        let handlers = self.handlers_at(&event.world, event.point);
        let verdict = review_chain(&handlers, event);
        if !verdict.permitted || verdict.mitigate {
            debug!(
                world = %event.world,
                point = %event.point,
                flags = %event.flags,
                permitted = verdict.permitted,
                mitigate = verdict.mitigate,
                "action restricted"
            );
        }
        verdict
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn reject_reserved_region(name: &ObjectName) -> Result<(), EngineError> {
    if name.key() == GLOBAL_REGION_NAME {
        return Err(EngineError::Reserved(name.as_str().to_string()));
    }
    Ok(())
}

fn link_pair(region: &Arc<Region>, handler: &Arc<dyn Handler>) -> Result<(), EngineError> {
    if !region.link(Arc::clone(handler)) {
        return Err(EngineError::AlreadyLinked {
            region: region.name().as_str().to_string(),
            handler: handler.name().as_str().to_string(),
        });
    }
    debug!(region = %region.name(), handler = %handler.name(), "linked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_policy::testing::StaticHandler;
    use warden_policy::{Flag, RuleEntry};

    use crate::region::{Cuboid, Everywhere};

    fn overworld() -> WorldId {
        WorldId::named("overworld")
    }

    fn spawn_box() -> Cuboid {
        Cuboid::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(32.0, 32.0, 32.0))
    }

    fn inside() -> Vec3 {
        Vec3::new(16.0, 16.0, 16.0)
    }

    fn damage() -> FlagSet {
        FlagSet::lineage_of(&[Flag::Damage, Flag::Entity])
    }

    // ── Registry invariants ──────────────────────────────────

    #[test]
    fn region_names_are_unique_case_insensitive() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("create");
        assert!(matches!(
            engine.create_region("SPAWN", spawn_box()),
            Err(EngineError::NameTaken(_))
        ));
    }

    #[test]
    fn world_region_names_are_per_world() {
        let engine = Engine::new();
        let a = WorldId::named("a");
        let b = WorldId::named("b");
        engine.load_world(a.clone());
        engine.load_world(b.clone());

        engine
            .create_world_region(&a, "arena", spawn_box())
            .expect("create in a");
        engine
            .create_world_region(&b, "arena", spawn_box())
            .expect("same name in b");
        assert!(matches!(
            engine.create_world_region(&a, "Arena", spawn_box()),
            Err(EngineError::NameTaken(_))
        ));
    }

    #[test]
    fn handler_names_are_global() {
        let engine = Engine::new();
        engine.create_handler("shield", 10).expect("create");
        assert!(matches!(
            engine.create_controller("Shield", 5),
            Err(EngineError::NameTaken(_))
        ));
    }

    #[test]
    fn global_objects_are_reserved() {
        let engine = Engine::new();
        assert!(matches!(
            engine.create_region("_global_", Everywhere),
            Err(EngineError::Reserved(_))
        ));
        assert!(matches!(
            engine.remove_region("_global_"),
            Err(EngineError::Reserved(_))
        ));
        assert!(matches!(
            engine.create_handler("_global_", 1),
            Err(EngineError::Reserved(_))
        ));
        assert!(matches!(
            engine.remove_handler("_global_"),
            Err(EngineError::Reserved(_))
        ));
    }

    #[test]
    fn unknown_world_is_rejected() {
        let engine = Engine::new();
        let ghost = WorldId::named("ghost");
        assert!(matches!(
            engine.create_world_region(&ghost, "arena", spawn_box()),
            Err(EngineError::UnknownWorld(_))
        ));
    }

    #[test]
    fn load_world_is_idempotent() {
        let engine = Engine::new();
        engine.load_world(overworld());
        engine.load_world(overworld());
        engine
            .create_world_region(&overworld(), "arena", spawn_box())
            .expect("world is loaded once");
    }

    #[test]
    fn remove_handler_unlinks_everywhere() {
        let engine = Engine::new();
        engine.load_world(overworld());
        engine.create_region("spawn", spawn_box()).expect("region");
        engine
            .create_world_region(&overworld(), "arena", spawn_box())
            .expect("region");
        engine.create_handler("shield", 10).expect("handler");
        engine.link("spawn", "shield").expect("link");
        engine
            .link_world(&overworld(), "arena", "shield")
            .expect("link");

        engine.remove_handler("shield").expect("remove");
        assert!(engine.region("spawn").expect("region").handlers().is_empty());
        assert!(engine
            .world_region(&overworld(), "arena")
            .expect("region")
            .handlers()
            .is_empty());
    }

    #[test]
    fn duplicate_link_is_rejected() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");
        engine.create_handler("shield", 10).expect("handler");
        engine.link("spawn", "shield").expect("link");
        assert!(matches!(
            engine.link("spawn", "shield"),
            Err(EngineError::AlreadyLinked { .. })
        ));
    }

    // ── Lookup ───────────────────────────────────────────────

    #[test]
    fn global_region_always_matches() {
        let engine = Engine::new();
        let regions = engine.regions_containing(&overworld(), Vec3::new(1e6, 0.0, 0.0));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name().as_str(), GLOBAL_REGION_NAME);
    }

    #[test]
    fn world_global_region_matches_after_load() {
        let engine = Engine::new();
        engine.load_world(overworld());
        let regions = engine.regions_containing(&overworld(), Vec3::new(1e6, 0.0, 0.0));
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn bounded_region_matches_inside_only() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");

        let at = |p: Vec3| -> Vec<String> {
            let mut names: Vec<_> = engine
                .regions_containing(&overworld(), p)
                .iter()
                .map(|r| r.name().as_str().to_string())
                .collect();
            names.sort();
            names
        };

        assert_eq!(at(inside()), vec!["_global_", "spawn"]);
        assert_eq!(at(Vec3::new(100.0, 16.0, 16.0)), vec!["_global_"]);
    }

    #[test]
    fn disabled_region_is_skipped() {
        let engine = Engine::new();
        let region = engine.create_region("spawn", spawn_box()).expect("region");
        region.set_enabled(false);
        let regions = engine.regions_containing(&overworld(), inside());
        assert_eq!(regions.len(), 1, "only the global region remains");
    }

    #[test]
    fn world_regions_do_not_leak_across_worlds() {
        let engine = Engine::new();
        let nether = WorldId::named("nether");
        engine.load_world(overworld());
        engine.load_world(nether.clone());
        engine
            .create_world_region(&overworld(), "arena", spawn_box())
            .expect("region");

        let names: Vec<_> = engine
            .regions_containing(&nether, inside())
            .iter()
            .map(|r| r.name().as_str().to_string())
            .collect();
        assert!(!names.contains(&"arena".to_string()));
    }

    // ── Handler collection ───────────────────────────────────

    #[test]
    fn handlers_are_deduped_across_regions() {
        let engine = Engine::new();
        engine.create_region("a", spawn_box()).expect("region");
        engine.create_region("b", spawn_box()).expect("region");
        engine.create_handler("shield", 10).expect("handler");
        engine.link("a", "shield").expect("link");
        engine.link("b", "shield").expect("link");

        let handlers = engine.handlers_at(&overworld(), inside());
        let shields = handlers
            .iter()
            .filter(|h| h.name().as_str() == "shield")
            .count();
        assert_eq!(shields, 1);
    }

    #[test]
    fn handlers_sorted_by_priority_then_name() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");
        for (name, priority) in [("zeta", 10), ("alpha", 10), ("mid", 5)] {
            engine
                .register_handler(StaticHandler::arc(name, priority, Tristate::Allow))
                .expect("register");
            engine.link("spawn", name).expect("link");
        }

        let order: Vec<_> = engine
            .handlers_at(&overworld(), inside())
            .iter()
            .map(|h| h.name().as_str().to_string())
            .collect();
        assert_eq!(order, vec!["alpha", "zeta", "mid", "_global_"]);
    }

    #[test]
    fn disabled_handler_is_skipped() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");
        let handler = engine.create_handler("shield", 10).expect("handler");
        engine.link("spawn", "shield").expect("link");

        handler.set_enabled(false);
        let handlers = engine.handlers_at(&overworld(), inside());
        assert!(handlers.iter().all(|h| h.name().as_str() != "shield"));
    }

    // ── Decisions ────────────────────────────────────────────

    #[test]
    fn unregulated_space_fails_open() {
        let engine = Engine::new();
        assert!(engine.decide(&overworld(), Vec3::new(0.0, 0.0, 0.0), None, damage()));
    }

    #[test]
    fn deny_rule_denies_inside_region_only() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");
        let shield = engine.create_handler("shield", 10).expect("handler");
        shield.push_default_rule(RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny));
        engine.link("spawn", "shield").expect("link");

        assert!(!engine.decide(&overworld(), inside(), None, damage()));
        assert!(engine.decide(&overworld(), Vec3::new(100.0, 0.0, 0.0), None, damage()));
    }

    #[test]
    fn global_handler_applies_everywhere() {
        let engine = Engine::new();
        engine
            .global_handler()
            .push_rule(RuleEntry::new(FlagSet::of(&[Flag::Explosion]), Tristate::Deny));

        let explosion = FlagSet::lineage_of(&[Flag::Explosion]);
        assert!(!engine.decide(&overworld(), Vec3::new(1e5, 0.0, -1e5), None, explosion));
        assert!(engine.decide(&overworld(), Vec3::new(1e5, 0.0, -1e5), None, damage()));
    }

    #[test]
    fn higher_tier_overrides_global_handler() {
        let engine = Engine::new();
        engine
            .global_handler()
            .push_rule(RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny));
        engine.create_region("spawn", spawn_box()).expect("region");
        let allow = engine.create_handler("arena", 10).expect("handler");
        allow.push_default_rule(RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Allow));
        engine.link("spawn", "arena").expect("link");

        assert!(engine.decide(&overworld(), inside(), None, damage()));
        assert!(!engine.decide(&overworld(), Vec3::new(100.0, 0.0, 0.0), None, damage()));
    }

    #[test]
    fn decide_is_idempotent() {
        let engine = Engine::new();
        engine.create_region("spawn", spawn_box()).expect("region");
        let shield = engine.create_handler("shield", 10).expect("handler");
        shield.push_default_rule(RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny));
        engine.link("spawn", "shield").expect("link");

        let first = engine.decide(&overworld(), inside(), None, damage());
        for _ in 0..20 {
            assert_eq!(engine.decide(&overworld(), inside(), None, damage()), first);
        }
    }

    // ── Restore ──────────────────────────────────────────────

    #[test]
    fn restore_region_relinks_known_handlers() {
        let engine = Engine::new();
        engine.create_handler("shield", 10).expect("handler");

        let snapshot = RegionSnapshot {
            name: ObjectName::new("spawn").expect("valid"),
            world: None,
            enabled: true,
            volume: crate::persist::VolumeSnapshot::Cuboid {
                min: Vec3::new(0.0, 0.0, 0.0),
                max: Vec3::new(32.0, 32.0, 32.0),
            },
            links: vec![
                ObjectName::new("shield").expect("valid"),
                ObjectName::new("missing").expect("valid"),
            ],
        };
        let region = engine.restore_region(&snapshot).expect("restore");
        let links: Vec<_> = region
            .handlers()
            .iter()
            .map(|h| h.name().as_str().to_string())
            .collect();
        assert_eq!(links, vec!["shield"], "unknown link skipped");
    }

    #[test]
    fn restore_handler_registers_it() {
        let engine = Engine::new();
        let mut snapshot = {
            let h = RuleHandler::new(ObjectName::new("shield").expect("valid"), 10);
            h.push_default_rule(RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny));
            h.snapshot()
        };
        snapshot.enabled = true;

        engine.restore_handler(&snapshot).expect("restore");
        assert!(engine.handler("shield").is_some());
        assert!(matches!(
            engine.restore_handler(&snapshot),
            Err(EngineError::NameTaken(_))
        ));
    }
}
