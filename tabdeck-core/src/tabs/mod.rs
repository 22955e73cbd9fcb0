//! Tabs and the tab-manager collaborator
//!
//! The tab manager owns the ordered tab collection and the current-tab
//! pointer. The surface subsystem reaches it only through the
//! [`TabCollection`] trait, which keeps the ownership graph directed: the
//! window owns the tab manager, the compositor and scheduler only look tabs
//! up by id.
//!
//! [`TabStore`] is an in-memory tab manager with spaces, global pins and
//! per-space pins.

mod store;
mod tab;

pub use store::{Space, TabStore};
pub use tab::{MediaActivity, Tab, TabKind};

use crate::types::TabId;

/// Operations the surface subsystem consumes from the tab manager.
pub trait TabCollection {
    /// Looks up a tab by id.
    fn tab(&self, id: TabId) -> Option<&Tab>;

    /// Looks up a tab by id for mutation.
    fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab>;

    /// Returns true if the tab is alive.
    fn contains(&self, id: TabId) -> bool {
        self.tab(id).is_some()
    }

    /// The tab the user is looking at.
    fn current_tab(&self) -> Option<TabId>;

    /// Moves the current-tab pointer. Unknown ids are ignored.
    fn set_current_tab(&mut self, id: Option<TabId>);

    /// Tabs that may be hosted by the compositor, in display order:
    /// global pinned, then pinned tabs of the active space, then its regular tabs.
    fn candidate_tabs(&self) -> Vec<TabId>;

    /// Copies a pinned or grouped tab into an ordinary tab for split use.
    ///
    /// Returns the id of the new tab, or `None` if `id` is unknown.
    fn duplicate_for_split(&mut self, id: TabId) -> Option<TabId>;

    /// Instantiates the tab's surface if needed.
    ///
    /// Returns `true` if a new surface was created.
    fn ensure_surface(&mut self, id: TabId) -> bool;

    /// Releases the tab's surface. Returns `true` if one was released.
    fn release_surface(&mut self, id: TabId) -> bool {
        self.tab_mut(id).is_some_and(Tab::release_surface)
    }

    /// Returns true if the tab has an instantiated surface.
    fn is_loaded(&self, id: TabId) -> bool {
        self.tab(id).is_some_and(|tab| !tab.is_unloaded())
    }
}
