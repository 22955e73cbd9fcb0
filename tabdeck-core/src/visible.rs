//! The set of tabs that must be shown right now
//!
//! `VisibleSet` is derived, never stored: it is a pure function of the
//! current tab and the split state. It holds at most two ids and never the
//! same id twice.

use crate::split::SplitState;
use crate::types::TabId;

/// Tabs whose surfaces must be live and shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleSet {
    slots: [Option<TabId>; 2],
}

impl VisibleSet {
    /// An empty set.
    pub const EMPTY: Self = Self { slots: [None, None] };

    /// Computes the visible set.
    ///
    /// In split mode the pane tabs are visible (one or two during a
    /// preview); otherwise only the current tab.
    #[must_use]
    pub fn compute(current: Option<TabId>, split: &SplitState) -> Self {
        if split.is_split() {
            Self::from_pair(split.left_tab_id(), split.right_tab_id())
        } else {
            Self::from_pair(current, None)
        }
    }

    /// Builds a set from two optional ids, dropping a duplicate second id.
    #[must_use]
    pub fn from_pair(first: Option<TabId>, second: Option<TabId>) -> Self {
        let second = if second == first { None } else { second };
        match (first, second) {
            (None, Some(only)) => Self {
                slots: [Some(only), None],
            },
            _ => Self {
                slots: [first, second],
            },
        }
    }

    /// Returns true if `id` is in the set.
    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.slots.contains(&Some(id))
    }

    /// Number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Iterates over the ids in slot order.
    pub fn iter(&self) -> impl Iterator<Item = TabId> + '_ {
        self.slots.iter().flatten().copied()
    }
}
