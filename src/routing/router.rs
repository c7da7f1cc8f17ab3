//! Entry point registration and lookup.
//!
//! # Responsibilities
//! - Own the flat list of registered entry points and the segment tree built from it
//! - Register, replace and remove entry points while keeping both consistent
//! - Match script name / path pairs against the tree
//! - Enforce the limit on removable entry points
//!
//! # Design Decisions
//! - The tree always equals a from-scratch build of the flat list, in list order
//! - Removal prunes incrementally and restores a shadowed entry point if one exists
//! - No locking here: callers serialize writers (see `routing::table`)
//! - Removing something that is not registered is a no-op

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::routing::entry_point::EntryPoint;
use crate::routing::handler::{same_resource, Resource};
use crate::routing::matcher::{match_path, EntryPointMatch};
use crate::routing::segment::SegmentTree;

/// How many removable entry points may be registered at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovableLimit {
    /// Removable entry points are ignored.
    #[default]
    Disabled,
    /// At most this many; the oldest is evicted to make room.
    Bounded(usize),
    /// No limit and no tracking.
    Unbounded,
}

impl From<i64> for RemovableLimit {
    fn from(value: i64) -> Self {
        match value {
            0 => RemovableLimit::Disabled,
            n if n > 0 => RemovableLimit::Bounded(n as usize),
            _ => RemovableLimit::Unbounded,
        }
    }
}

/// The entry point router.
#[derive(Debug, Clone, Default)]
pub struct Router {
    tree: SegmentTree,
    entry_points: Vec<Arc<EntryPoint>>,
    removable: VecDeque<Arc<EntryPoint>>,
    removable_limit: RemovableLimit,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_removable_limit(&mut self, limit: RemovableLimit) {
        self.removable_limit = limit;
    }

    pub fn removable_limit(&self) -> RemovableLimit {
        self.removable_limit
    }

    /// Registered entry points, oldest first.
    pub fn entry_points(&self) -> &[Arc<EntryPoint>] {
        &self.entry_points
    }

    pub fn len(&self) -> usize {
        self.entry_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_points.is_empty()
    }

    pub fn tree(&self) -> &SegmentTree {
        &self.tree
    }

    /// Number of removable entry points currently tracked.
    pub fn removable_count(&self) -> usize {
        self.removable.len()
    }

    /// Register an entry point.
    ///
    /// An entry point on an already registered path shadows the older one.
    pub fn add_entry_point(&mut self, ep: impl Into<Arc<EntryPoint>>) {
        let ep = ep.into();

        if !ep.is_removable() {
            self.register(ep);
            return;
        }

        match self.removable_limit {
            RemovableLimit::Disabled | RemovableLimit::Bounded(0) => {
                tracing::debug!(path = %ep.path(), "Removable entry points disabled, ignoring");
            }
            RemovableLimit::Bounded(max) => {
                while self.removable.len() >= max {
                    let Some(oldest) = self.removable.front().cloned() else {
                        break;
                    };
                    tracing::debug!(
                        path = %oldest.path(),
                        max,
                        "Maximum number of removable entry points reached, removing oldest"
                    );
                    self.remove_where(|candidate| Arc::ptr_eq(candidate, &oldest));
                }
                self.register(ep.clone());
                self.removable.push_back(ep);
            }
            RemovableLimit::Unbounded => self.register(ep),
        }
    }

    fn register(&mut self, ep: Arc<EntryPoint>) {
        if let Some(previous) = self.tree.insert(ep.clone()) {
            tracing::debug!(
                path = %ep.path(),
                shadowed = %previous.path(),
                "Entry point shadows an earlier registration"
            );
        }
        self.entry_points.push(ep);
    }

    /// Register a resource unless an entry point already uses its exact path.
    ///
    /// Returns false, leaving the router untouched, on a duplicate.
    pub fn try_add_resource(&mut self, ep: impl Into<Arc<EntryPoint>>) -> bool {
        let ep = ep.into();
        if self.entry_points.iter().any(|existing| existing.path() == ep.path()) {
            tracing::warn!(path = %ep.path(), "Entry point already deployed on path");
            return false;
        }
        self.add_entry_point(ep);
        true
    }

    /// Remove the earliest entry point registered on exactly this path.
    ///
    /// With duplicates, the newest registration therefore stays live.
    pub fn remove_entry_point(&mut self, path: &str) {
        if let Some(index) = self.entry_points.iter().position(|ep| ep.path() == path) {
            self.remove_at(index);
        }
    }

    /// Remove every entry point bound to this very resource.
    pub fn remove_resource(&mut self, resource: &Arc<dyn Resource>) {
        self.remove_where(|ep| {
            ep.handler()
                .resource()
                .is_some_and(|bound| same_resource(bound, resource))
        });
    }

    fn remove_where<F>(&mut self, predicate: F)
    where
        F: Fn(&Arc<EntryPoint>) -> bool,
    {
        while let Some(index) = self.entry_points.iter().position(&predicate) {
            self.remove_at(index);
        }
    }

    fn remove_at(&mut self, index: usize) {
        let ep = self.entry_points.remove(index);
        self.removable.retain(|tracked| !Arc::ptr_eq(tracked, &ep));

        let Some(node) = self.tree.find(ep.path()) else {
            return;
        };
        let live = self
            .tree
            .entry_point(node)
            .is_some_and(|current| Arc::ptr_eq(current, &ep));
        if !live {
            tracing::debug!(path = %ep.path(), "Removed shadowed entry point");
            return;
        }

        // Another pattern ending on the same node takes over, as a rebuild would do.
        let restored = self
            .entry_points
            .iter()
            .rev()
            .find(|other| self.tree.find(other.path()) == Some(node))
            .cloned();
        tracing::debug!(
            path = %ep.path(),
            restored = ?restored.as_ref().map(|other| other.path()),
            "Removed entry point"
        );
        self.tree.set_entry_point(node, restored);
    }

    /// Rebuild the tree from the flat list.
    pub fn rebuild(&mut self) {
        self.tree = SegmentTree::from_entry_points(&self.entry_points);
    }

    /// Match a request.
    ///
    /// With a script name, both `script_name + path` and `path` alone are
    /// matched and the better ranked result is returned; on a tie the path-only
    /// match wins. `extra_start_index` is always relative to `path`.
    pub fn match_entry_point(
        &self,
        script_name: &str,
        path: &str,
        match_after_slash: bool,
    ) -> EntryPointMatch {
        if script_name.is_empty() {
            return match_path(&self.tree, path, match_after_slash);
        }

        tracing::debug!(script_name = %script_name, path = %path, "Matching entry point");

        let full = format!("{script_name}{path}");
        let mut script_match = match_path(&self.tree, &full, match_after_slash);
        if script_match.extra_start_index < script_name.len() {
            // Matched inside the script name only.
            script_match = EntryPointMatch::none();
        }

        let path_match = match_path(&self.tree, path, match_after_slash);
        if script_match.compare(&path_match) == Ordering::Greater {
            script_match.extra_start_index -= script_name.len();
            script_match
        } else {
            path_match
        }
    }
}
