//! Coarse cell index over regions.
//!
//! Testing every region's exact predicate against every event would make
//! lookup cost grow with the total region count. The index maps each
//! region's bounding box onto a grid of `cell_size` cells at
//! registration, so a point lookup only surfaces the regions whose boxes
//! overlap that point's cell. Unbounded regions are candidates for every
//! lookup. The exact predicate stays the source of truth and is invoked
//! on each candidate.

use std::collections::HashMap;

use warden_types::{Aabb, CellKey, ObjectName};

/// Bucketed candidate index for one region namespace.
#[derive(Debug)]
pub(crate) struct CellIndex {
    cell_size: i32,
    buckets: HashMap<CellKey, Vec<ObjectName>>,
    unbounded: Vec<ObjectName>,
}

impl CellIndex {
    pub(crate) fn new(cell_size: i32) -> Self {
        debug_assert!(cell_size > 0, "cell size must be positive");
        Self {
            cell_size,
            buckets: HashMap::new(),
            unbounded: Vec::new(),
        }
    }

    /// Registers a region under every cell its bounds overlap, or as an
    /// always-candidate when unbounded.
    pub(crate) fn insert(&mut self, name: ObjectName, bounds: Option<Aabb>) {
        match bounds {
            Some(aabb) => {
                for cell in aabb.cells(self.cell_size) {
                    self.buckets.entry(cell).or_default().push(name.clone());
                }
            }
            None => self.unbounded.push(name),
        }
    }

    /// Drops a region from every bucket it appears in.
    pub(crate) fn remove(&mut self, name: &ObjectName) {
        self.buckets.retain(|_, names| {
            names.retain(|n| n != name);
            !names.is_empty()
        });
        self.unbounded.retain(|n| n != name);
    }

    /// Candidate regions for a point in the given cell: bucket members
    /// plus every unbounded region. May contain false positives; never
    /// misses a region whose bounds cover the point.
    pub(crate) fn candidates(&self, cell: CellKey) -> impl Iterator<Item = &ObjectName> {
        self.buckets
            .get(&cell)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .chain(self.unbounded.iter())
    }

    pub(crate) fn cell_size(&self) -> i32 {
        self.cell_size
    }
}
