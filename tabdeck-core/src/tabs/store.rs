//! In-memory tab manager
//!
//! `TabStore` keeps tabs in an id-keyed arena and the sidebar order in
//! separate lists: global pins, and per space its pins and regular tabs.

use std::collections::HashMap;

use super::tab::{Tab, TabKind};
use super::TabCollection;
use crate::surface::SurfaceFactory;
use crate::types::{SpaceId, TabId};

/// A named set of tabs.
#[derive(Debug, Clone)]
pub struct Space {
    /// Stable identifier.
    pub id: SpaceId,
    /// Display name.
    pub name: String,
    /// Tabs pinned to this space, in order.
    pub pinned: Vec<TabId>,
    /// Regular tabs, in order.
    pub regular: Vec<TabId>,
}

impl Space {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: SpaceId::new(),
            name: name.into(),
            pinned: Vec::new(),
            regular: Vec::new(),
        }
    }

    fn remove(&mut self, id: TabId) -> bool {
        let before = self.pinned.len() + self.regular.len();
        self.pinned.retain(|t| *t != id);
        self.regular.retain(|t| *t != id);
        before != self.pinned.len() + self.regular.len()
    }
}

/// Tab manager backed by an arena of tabs.
pub struct TabStore {
    tabs: HashMap<TabId, Tab>,
    pinned: Vec<TabId>,
    spaces: Vec<Space>,
    active_space: SpaceId,
    current: Option<TabId>,
    factory: Box<dyn SurfaceFactory>,
}

impl TabStore {
    /// Creates a store with a single space named "Default".
    #[must_use]
    pub fn new(factory: Box<dyn SurfaceFactory>) -> Self {
        let space = Space::new("Default");
        let active_space = space.id;
        Self {
            tabs: HashMap::new(),
            pinned: Vec::new(),
            spaces: vec![space],
            active_space,
            current: None,
            factory,
        }
    }

    /// Adds a space and returns its id.
    pub fn add_space(&mut self, name: impl Into<String>) -> SpaceId {
        let space = Space::new(name);
        let id = space.id;
        self.spaces.push(space);
        id
    }

    /// Returns all spaces.
    #[must_use]
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// The space whose tabs are candidates for display.
    #[must_use]
    pub const fn active_space(&self) -> SpaceId {
        self.active_space
    }

    /// Switches the active space. Returns `false` for an unknown space.
    pub fn set_active_space(&mut self, id: SpaceId) -> bool {
        if self.spaces.iter().any(|s| s.id == id) {
            self.active_space = id;
            true
        } else {
            false
        }
    }

    /// Opens a regular tab at the end of the active space.
    pub fn open_tab(&mut self, url: impl Into<String>) -> TabId {
        self.insert_tab(Tab::new(url))
    }

    /// Inserts an existing tab according to its kind.
    ///
    /// Global pins go to the shared pin row, everything else to the active space.
    pub fn insert_tab(&mut self, tab: Tab) -> TabId {
        let id = tab.id;
        match tab.kind {
            TabKind::Pinned => self.pinned.push(id),
            TabKind::SpacePinned => self.active_space_mut().pinned.push(id),
            TabKind::Regular => self.active_space_mut().regular.push(id),
        }
        self.tabs.insert(id, tab);
        tracing::debug!(tab_id = %id, "Tab opened");
        id
    }

    /// Changes the kind of a tab and moves it to the matching list.
    ///
    /// Returns `false` for an unknown tab.
    pub fn set_kind(&mut self, id: TabId, kind: TabKind) -> bool {
        let Some(tab) = self.tabs.get_mut(&id) else {
            return false;
        };
        tab.kind = kind;
        self.detach_from_lists(id);
        match kind {
            TabKind::Pinned => self.pinned.push(id),
            TabKind::SpacePinned => self.active_space_mut().pinned.push(id),
            TabKind::Regular => self.active_space_mut().regular.push(id),
        }
        true
    }

    /// Sets or clears a tab's group. Returns `false` for an unknown tab.
    pub fn set_group(&mut self, id: TabId, group: Option<String>) -> bool {
        match self.tabs.get_mut(&id) {
            Some(tab) => {
                tab.group = group;
                true
            }
            None => false,
        }
    }

    /// Moves a non-global tab to the regular list of another space.
    pub fn move_to_space(&mut self, id: TabId, space: SpaceId) -> bool {
        if !self.tabs.contains_key(&id) || !self.spaces.iter().any(|s| s.id == space) {
            return false;
        }
        self.detach_from_lists(id);
        if let Some(tab) = self.tabs.get_mut(&id) {
            tab.kind = TabKind::Regular;
        }
        if let Some(target) = self.spaces.iter_mut().find(|s| s.id == space) {
            target.regular.push(id);
        }
        true
    }

    /// Removes a tab and returns it.
    ///
    /// If the closed tab was current, the next candidate (or the previous one
    /// when closing the last) becomes current.
    pub fn close_tab(&mut self, id: TabId) -> Option<Tab> {
        let order = self.candidate_tabs();
        let tab = self.tabs.remove(&id)?;
        self.detach_from_lists(id);

        if self.current == Some(id) {
            let position = order.iter().position(|t| *t == id);
            self.current = position.and_then(|pos| {
                order
                    .get(pos + 1)
                    .or_else(|| pos.checked_sub(1).and_then(|p| order.get(p)))
                    .copied()
            });
        }
        tracing::debug!(tab_id = %id, "Tab closed");
        Some(tab)
    }

    /// Number of live tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Returns true if there are no tabs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Number of tabs with an instantiated surface.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.tabs.values().filter(|t| !t.is_unloaded()).count()
    }

    fn active_space_mut(&mut self) -> &mut Space {
        let active = self.active_space;
        let index = self
            .spaces
            .iter()
            .position(|s| s.id == active)
            .unwrap_or_default();
        &mut self.spaces[index]
    }

    fn detach_from_lists(&mut self, id: TabId) {
        self.pinned.retain(|t| *t != id);
        for space in &mut self.spaces {
            if space.remove(id) {
                break;
            }
        }
    }
}

impl TabCollection for TabStore {
    fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(&id)
    }

    fn current_tab(&self) -> Option<TabId> {
        self.current
    }

    fn set_current_tab(&mut self, id: Option<TabId>) {
        match id {
            Some(id) if !self.tabs.contains_key(&id) => {
                tracing::warn!(tab_id = %id, "Ignoring unknown current tab");
            }
            _ => self.current = id,
        }
    }

    fn candidate_tabs(&self) -> Vec<TabId> {
        let mut order = self.pinned.clone();
        if let Some(space) = self.spaces.iter().find(|s| s.id == self.active_space) {
            order.extend(space.pinned.iter().copied());
            order.extend(space.regular.iter().copied());
        }
        order
    }

    fn duplicate_for_split(&mut self, id: TabId) -> Option<TabId> {
        let source = self.tabs.get(&id)?;
        let mut copy = Tab::new(source.url.clone());
        copy.title.clone_from(&source.title);
        let copy_id = self.insert_tab(copy);
        tracing::debug!(source = %id, tab_id = %copy_id, "Duplicated tab for split view");
        Some(copy_id)
    }

    fn ensure_surface(&mut self, id: TabId) -> bool {
        match self.tabs.get_mut(&id) {
            Some(tab) => tab.ensure_surface(self.factory.as_mut()),
            None => false,
        }
    }
}
