//! Composite handler.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use warden_policy::{FlagSet, Handler, Tristate};
use warden_types::{ActorId, ObjectName};

/// A handler that aggregates other handlers.
///
/// A controller is one voter in the chain: its children are consulted in
/// declared order and their votes conjoined ([`Tristate::and`]), so to
/// the tier algorithm the whole aggregate looks like a single handler at
/// the controller's priority. Children's own priorities and enabled
/// flags still apply — a disabled child abstains.
///
/// Children keep their own caches; the controller adds none.
pub struct ControllerHandler {
    name: ObjectName,
    priority: AtomicI32,
    enabled: AtomicBool,
    children: RwLock<Vec<Arc<dyn Handler>>>,
}

impl ControllerHandler {
    /// Creates an empty controller.
    #[must_use]
    pub fn new(name: ObjectName, priority: i32) -> Self {
        Self {
            name,
            priority: AtomicI32::new(priority),
            enabled: AtomicBool::new(true),
            children: RwLock::new(Vec::new()),
        }
    }

    /// Appends a child. Returns `false` if a child with the same name is
    /// already present.
    pub fn add_child(&self, child: Arc<dyn Handler>) -> bool {
        let mut children = self.children.write();
        if children.iter().any(|c| c.name() == child.name()) {
            return false;
        }
        children.push(child);
        true
    }

    /// Removes a child by name. Returns `false` if it was not present.
    pub fn remove_child(&self, name: &ObjectName) -> bool {
        let mut children = self.children.write();
        let before = children.len();
        children.retain(|c| c.name() != name);
        children.len() < before
    }

    /// Child names, in consultation order.
    #[must_use]
    pub fn children(&self) -> Vec<ObjectName> {
        self.children
            .read()
            .iter()
            .map(|c| c.name().clone())
            .collect()
    }

    /// Changes the evaluation priority.
    pub fn set_priority(&self, priority: i32) {
        self.priority.store(priority, Ordering::SeqCst);
    }
}

impl Handler for ControllerHandler {
    fn name(&self) -> &ObjectName {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority.load(Ordering::SeqCst)
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn evaluate(&self, actor: Option<&ActorId>, flags: FlagSet) -> Tristate {
        let children = self.children.read();
        let mut result = Tristate::Undefined;
        let mut first = true;
        for child in children.iter().filter(|c| c.is_enabled()) {
            let vote = child.evaluate(actor, flags);
            result = if first { vote } else { result.and(vote) };
            first = false;
        }
        result
    }
}

impl std::fmt::Debug for ControllerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandler")
            .field("name", &self.name.as_str())
            .field("priority", &self.priority())
            .field("enabled", &self.is_enabled())
            .field("children", &self.children.read().len())
            .finish()
    }
}
