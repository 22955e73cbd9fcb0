//! Collaborators handed to layout operations
//!
//! Layout operations borrow the tab manager and the eviction scheduler for
//! the duration of one call instead of holding references to them.

use std::time::Instant;

use crate::eviction::IdleEvictionScheduler;
use crate::tabs::TabCollection;
use crate::types::TabId;

/// Borrowed collaborators for one layout operation.
pub struct LayoutContext<'a> {
    /// The tab manager.
    pub tabs: &'a mut dyn TabCollection,
    /// The eviction scheduler.
    pub scheduler: &'a mut IdleEvictionScheduler,
    /// Time of the operation.
    pub now: Instant,
}

impl<'a> LayoutContext<'a> {
    /// Bundles the collaborators.
    pub fn new(
        tabs: &'a mut dyn TabCollection,
        scheduler: &'a mut IdleEvictionScheduler,
        now: Instant,
    ) -> Self {
        Self {
            tabs,
            scheduler,
            now,
        }
    }

    /// Loads a tab through the scheduler (marks it accessed, ensures the surface).
    pub fn load(&mut self, id: TabId) -> bool {
        self.scheduler.load(id, self.now, self.tabs)
    }
}
