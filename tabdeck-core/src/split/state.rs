//! Split layout state and divider bounds

use super::error::SplitError;
use crate::types::{PaneSide, TabId};

/// Default divider position (50% of the container width).
pub const DEFAULT_DIVIDER_FRACTION: f64 = 0.5;

/// Default lower divider bound.
pub const DEFAULT_MIN_FRACTION: f64 = 0.2;

/// Default upper divider bound.
pub const DEFAULT_MAX_FRACTION: f64 = 0.8;

/// Divider changes smaller than this are ignored.
pub const DIVIDER_EPSILON: f64 = 0.001;

/// Inclusive range the divider fraction is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionBounds {
    min: f64,
    max: f64,
}

impl FractionBounds {
    /// Creates bounds.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::InvalidBounds` unless `0.0 <= min < max <= 1.0`.
    pub fn new(min: f64, max: f64) -> Result<Self, SplitError> {
        let valid = min.is_finite() && max.is_finite() && 0.0 <= min && min < max && max <= 1.0;
        if valid {
            Ok(Self { min, max })
        } else {
            Err(SplitError::InvalidBounds { min, max })
        }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Clamps `value` into the bounds. NaN maps to the midpoint.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::midpoint(self.min, self.max);
        }
        value.clamp(self.min, self.max)
    }
}

impl Default for FractionBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_FRACTION,
            max: DEFAULT_MAX_FRACTION,
        }
    }
}

/// The split view state of a window.
///
/// Mutated only by [`SplitLayoutController`](super::SplitLayoutController).
/// When `is_split` is false both pane ids are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitState {
    pub(super) is_split: bool,
    pub(super) left: Option<TabId>,
    pub(super) right: Option<TabId>,
    pub(super) divider_fraction: f64,
    pub(super) preview_active: bool,
    pub(super) preview_side: Option<PaneSide>,
    pub(super) active_side: PaneSide,
}

impl SplitState {
    /// Returns true if two panes are (or are about to be) shown.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.is_split
    }

    /// Tab in the left pane.
    #[must_use]
    pub const fn left_tab_id(&self) -> Option<TabId> {
        self.left
    }

    /// Tab in the right pane.
    #[must_use]
    pub const fn right_tab_id(&self) -> Option<TabId> {
        self.right
    }

    /// Share of the container width given to the left pane.
    #[must_use]
    pub const fn divider_fraction(&self) -> f64 {
        self.divider_fraction
    }

    /// Returns true while a drag-and-drop preview is shown.
    #[must_use]
    pub const fn is_preview_active(&self) -> bool {
        self.preview_active
    }

    /// Side the dragged tab would land on.
    #[must_use]
    pub const fn preview_side(&self) -> Option<PaneSide> {
        self.preview_side
    }

    /// Pane holding keyboard focus.
    #[must_use]
    pub const fn active_side(&self) -> PaneSide {
        self.active_side
    }

    /// Tab shown on `side`.
    #[must_use]
    pub const fn tab_on(&self, side: PaneSide) -> Option<TabId> {
        match side {
            PaneSide::Left => self.left,
            PaneSide::Right => self.right,
        }
    }

    /// Side showing `tab`, if any.
    #[must_use]
    pub fn side_of(&self, tab: TabId) -> Option<PaneSide> {
        if self.left == Some(tab) {
            Some(PaneSide::Left)
        } else if self.right == Some(tab) {
            Some(PaneSide::Right)
        } else {
            None
        }
    }

    pub(super) fn slot_mut(&mut self, side: PaneSide) -> &mut Option<TabId> {
        match side {
            PaneSide::Left => &mut self.left,
            PaneSide::Right => &mut self.right,
        }
    }

    pub(super) fn clear_panes(&mut self) {
        self.is_split = false;
        self.left = None;
        self.right = None;
        self.preview_active = false;
        self.preview_side = None;
        self.active_side = PaneSide::Left;
    }
}

impl Default for SplitState {
    fn default() -> Self {
        Self {
            is_split: false,
            left: None,
            right: None,
            divider_fraction: DEFAULT_DIVIDER_FRACTION,
            preview_active: false,
            preview_side: None,
            active_side: PaneSide::Left,
        }
    }
}
