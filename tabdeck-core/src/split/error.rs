//! Error and outcome types for split view operations
//!
//! Layout operations never fail at runtime: stale references heal and
//! self-pairing is ignored. The outcome enums report which of those paths
//! was taken. [`SplitError`] only covers invalid configuration.

use crate::types::{PaneSide, TabId};

/// Errors raised while configuring the split layout.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// Divider bounds are not ordered or not inside `[0.0, 1.0]`.
    #[error("invalid divider bounds: min {min}, max {max} (need 0.0 <= min < max <= 1.0)")]
    InvalidBounds {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },
}

/// Result of [`enter_split`](super::SplitLayoutController::enter_split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterSplitOutcome {
    /// A new split was created from the current tab and the given tab.
    Entered {
        /// Tab placed on the requested side (a duplicate for pinned tabs).
        placed: TabId,
    },
    /// The requested side of an existing split now shows another tab.
    Replaced {
        /// Tab placed on the requested side.
        placed: TabId,
        /// Tab that occupied the side before, if any.
        previous: Option<TabId>,
    },
    /// The tab was already on the opposite side; the panes were swapped.
    Swapped,
    /// The tab already occupies the requested side.
    AlreadyPlaced,
    /// The tab would be paired with itself; nothing changed.
    SelfPairing,
    /// There is no current tab to pair with; nothing changed.
    NoCurrentTab,
    /// The tab does not exist; nothing changed.
    UnknownTab,
}

impl EnterSplitOutcome {
    /// Returns true if the layout changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(
            self,
            Self::Entered { .. } | Self::Replaced { .. } | Self::Swapped
        )
    }

    /// The tab that ended up on the requested side, if the layout changed.
    #[must_use]
    pub const fn placed(&self) -> Option<TabId> {
        match self {
            Self::Entered { placed } | Self::Replaced { placed, .. } => Some(*placed),
            _ => None,
        }
    }
}

/// Result of checking the split panes against the live tab collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealOutcome {
    /// Not split, or both panes resolve.
    Healthy,
    /// A preview is running; checks are suspended.
    Suspended,
    /// Only one pane resolved; the split was exited keeping that side.
    KeptSide(PaneSide),
    /// Neither pane resolved; the layout collapsed to a single tab.
    Collapsed,
}

impl HealOutcome {
    /// Returns true if the layout was changed by healing.
    #[must_use]
    pub const fn healed(&self) -> bool {
        matches!(self, Self::KeptSide(_) | Self::Collapsed)
    }
}
