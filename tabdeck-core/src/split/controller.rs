//! Split layout state machine
//!
//! States: single (no panes), split (left and right panes) and preview, an
//! overlay shown while a tab is dragged over the content area. A preview
//! started from the single state turns into a transient split with one empty
//! slot until the drop commits through [`SplitLayoutController::enter_split`]
//! or the drag is cancelled.

use std::time::{Duration, Instant};

use super::animation::{DEFAULT_ANIMATION_DURATION, DividerAnimation};
use super::error::{EnterSplitOutcome, HealOutcome};
use super::state::{DEFAULT_DIVIDER_FRACTION, DIVIDER_EPSILON, FractionBounds, SplitState};
use crate::context::LayoutContext;
use crate::tabs::TabCollection;
use crate::types::{PaneSide, TabId};

/// Owns the [`SplitState`] of one window and implements its transitions.
#[derive(Debug, Clone)]
pub struct SplitLayoutController {
    state: SplitState,
    bounds: FractionBounds,
    animation: Option<DividerAnimation>,
    animation_duration: Duration,
}

impl SplitLayoutController {
    /// Creates a controller in the single state.
    #[must_use]
    pub fn new(bounds: FractionBounds, animation_duration: Duration) -> Self {
        let mut state = SplitState::default();
        state.divider_fraction = bounds.clamp(DEFAULT_DIVIDER_FRACTION);
        Self {
            state,
            bounds,
            animation: None,
            animation_duration,
        }
    }

    /// Creates a controller with bounds 0.2..=0.8 and a 250 ms animation.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FractionBounds::default(), DEFAULT_ANIMATION_DURATION)
    }

    /// Read-only view of the state.
    #[must_use]
    pub const fn state(&self) -> &SplitState {
        &self.state
    }

    /// Divider bounds.
    #[must_use]
    pub const fn bounds(&self) -> FractionBounds {
        self.bounds
    }

    /// Returns true while the divider is animating.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Places `tab` on `side`.
    ///
    /// When already split, the named side is replaced; pinned and grouped
    /// tabs are first duplicated so the original keeps its sidebar slot. When
    /// not split, `tab` is paired against the current tab on the opposite
    /// side. Both panes are loaded and the new pane takes focus.
    pub fn enter_split(
        &mut self,
        tab: TabId,
        side: PaneSide,
        animate: bool,
        ctx: &mut LayoutContext<'_>,
    ) -> EnterSplitOutcome {
        let Some(source) = ctx.tabs.tab(tab) else {
            tracing::debug!(tab_id = %tab, "Ignoring split request for unknown tab");
            return EnterSplitOutcome::UnknownTab;
        };
        let needs_duplicate = source.needs_split_duplicate();

        let outcome = if self.state.is_split {
            if self.state.tab_on(side) == Some(tab) {
                return EnterSplitOutcome::AlreadyPlaced;
            }
            if self.state.tab_on(side.opposite()) == Some(tab) {
                if self.state.tab_on(side).is_none() {
                    return EnterSplitOutcome::SelfPairing;
                }
                self.swap_sides();
                return EnterSplitOutcome::Swapped;
            }

            let placed = Self::split_copy(tab, needs_duplicate, ctx);
            let previous = self.state.slot_mut(side).replace(placed);
            EnterSplitOutcome::Replaced { placed, previous }
        } else {
            let Some(current) = ctx.tabs.current_tab() else {
                return EnterSplitOutcome::NoCurrentTab;
            };
            if current == tab {
                tracing::debug!(tab_id = %tab, "Ignoring split of a tab with itself");
                return EnterSplitOutcome::SelfPairing;
            }

            let placed = Self::split_copy(tab, needs_duplicate, ctx);
            *self.state.slot_mut(side) = Some(placed);
            *self.state.slot_mut(side.opposite()) = Some(current);
            self.state.is_split = true;
            if !animate {
                self.state.divider_fraction = self.bounds.clamp(DEFAULT_DIVIDER_FRACTION);
            }
            EnterSplitOutcome::Entered { placed }
        };

        let Some(placed) = outcome.placed() else {
            return outcome;
        };
        for pane in [self.state.left, self.state.right].into_iter().flatten() {
            ctx.load(pane);
        }
        self.state.active_side = side;
        ctx.tabs.set_current_tab(Some(placed));

        if animate {
            self.animate_divider_to(DEFAULT_DIVIDER_FRACTION, ctx);
        }

        tracing::info!(
            tab_id = %placed,
            %side,
            left = ?self.state.left,
            right = ?self.state.right,
            "Split view updated"
        );
        outcome
    }

    /// Leaves split view, making the tab on `keep` current.
    ///
    /// The dropped pane is not unloaded; the eviction policy decides.
    pub fn exit_split(&mut self, keep: PaneSide, tabs: &mut dyn TabCollection) {
        let kept = self.state.tab_on(keep).filter(|id| tabs.contains(*id));
        if let Some(kept) = kept {
            tabs.set_current_tab(Some(kept));
        }
        self.state.clear_panes();
        self.animation = None;
        tracing::info!(keep = %keep, tab_id = ?kept, "Exited split view");
    }

    /// Closes the pane on `side`, keeping the opposite pane.
    pub fn close_pane(&mut self, side: PaneSide, tabs: &mut dyn TabCollection) {
        self.exit_split(side.opposite(), tabs);
    }

    /// Exchanges the left and right panes. Does nothing when not split.
    pub fn swap_sides(&mut self) -> bool {
        if !self.state.is_split {
            return false;
        }
        std::mem::swap(&mut self.state.left, &mut self.state.right);
        self.state.active_side = self.state.active_side.opposite();
        tracing::debug!("Swapped split panes");
        true
    }

    /// Starts a drag preview for a drop on `side`.
    ///
    /// From the single state the current tab moves to the opposite slot and a
    /// transient split is shown with `side` still empty.
    pub fn begin_preview(&mut self, side: PaneSide, tabs: &dyn TabCollection) {
        if !self.state.is_split {
            self.state.left = None;
            self.state.right = None;
            *self.state.slot_mut(side.opposite()) = tabs.current_tab();
            self.state.is_split = true;
            self.state.active_side = side.opposite();
        }
        self.state.preview_active = true;
        self.state.preview_side = Some(side);
        tracing::debug!(%side, "Split preview started");
    }

    /// Moves the preview to another side while the drag continues.
    pub fn update_preview_side(&mut self, side: PaneSide) {
        if !self.state.preview_active || self.state.preview_side == Some(side) {
            return;
        }
        // Only a transient split (exactly one slot filled) follows the drag.
        if let (Some(only), None) | (None, Some(only)) = (self.state.left, self.state.right) {
            self.state.left = None;
            self.state.right = None;
            *self.state.slot_mut(side.opposite()) = Some(only);
            self.state.active_side = side.opposite();
        }
        self.state.preview_side = Some(side);
    }

    /// Ends the drag preview.
    ///
    /// With `cancel` the transient split is reverted if a slot is still
    /// empty. Without it, whatever a completed drop committed is kept.
    pub fn end_preview(&mut self, cancel: bool) {
        if !self.state.preview_active {
            return;
        }
        let incomplete = self.state.left.is_none() || self.state.right.is_none();
        if cancel && incomplete {
            self.state.clear_panes();
        }
        self.state.preview_active = false;
        self.state.preview_side = None;
        tracing::debug!(cancel, split = self.state.is_split, "Split preview ended");
    }

    /// Moves the divider, clamped to the bounds.
    ///
    /// Changes smaller than [`DIVIDER_EPSILON`] are ignored. Returns `true`
    /// if the divider moved.
    pub fn set_divider_fraction(&mut self, value: f64) -> bool {
        let clamped = self.bounds.clamp(value);
        if (clamped - self.state.divider_fraction).abs() < DIVIDER_EPSILON {
            return false;
        }
        self.state.divider_fraction = clamped;
        self.animation = None;
        true
    }

    /// Focuses the pane on `side` and makes its tab current.
    pub fn focus_side(&mut self, side: PaneSide, tabs: &mut dyn TabCollection) -> bool {
        if !self.state.is_split {
            return false;
        }
        let Some(tab) = self.state.tab_on(side) else {
            return false;
        };
        self.state.active_side = side;
        tabs.set_current_tab(Some(tab));
        true
    }

    /// Drops back to the single state without touching the current tab.
    pub fn collapse(&mut self) {
        if self.state.is_split || self.state.preview_active {
            tracing::debug!("Split view collapsed");
        }
        self.state.clear_panes();
        self.animation = None;
    }

    /// Repairs panes whose tabs no longer exist.
    ///
    /// Suspended while a preview runs. If exactly one pane resolves the
    /// split is exited keeping it; if none resolves the layout collapses.
    pub fn heal(&mut self, tabs: &mut dyn TabCollection) -> HealOutcome {
        if self.state.preview_active {
            return HealOutcome::Suspended;
        }
        if !self.state.is_split {
            return HealOutcome::Healthy;
        }
        let left_live = self.state.left.is_some_and(|id| tabs.contains(id));
        let right_live = self.state.right.is_some_and(|id| tabs.contains(id));
        match (left_live, right_live) {
            (true, true) => HealOutcome::Healthy,
            (true, false) => {
                tracing::warn!(right = ?self.state.right, "Right pane is stale, leaving split view");
                self.exit_split(PaneSide::Left, tabs);
                HealOutcome::KeptSide(PaneSide::Left)
            }
            (false, true) => {
                tracing::warn!(left = ?self.state.left, "Left pane is stale, leaving split view");
                self.exit_split(PaneSide::Right, tabs);
                HealOutcome::KeptSide(PaneSide::Right)
            }
            (false, false) => {
                tracing::warn!("Both panes are stale, collapsing split view");
                self.collapse();
                HealOutcome::Collapsed
            }
        }
    }

    /// Reacts to a tab being closed elsewhere.
    pub fn handle_tab_closed(&mut self, id: TabId, tabs: &mut dyn TabCollection) -> HealOutcome {
        let Some(side) = self.state.side_of(id) else {
            return HealOutcome::Healthy;
        };
        if self.state.preview_active {
            *self.state.slot_mut(side) = None;
            return HealOutcome::Suspended;
        }
        self.heal(tabs)
    }

    /// Advances the divider animation. Returns `true` while it is running.
    pub fn step_animation(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        self.state.divider_fraction = self.bounds.clamp(animation.value_at(now));
        if animation.is_finished(now) {
            self.animation = None;
            false
        } else {
            true
        }
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    fn split_copy(tab: TabId, needs_duplicate: bool, ctx: &mut LayoutContext<'_>) -> TabId {
        if needs_duplicate {
            ctx.tabs.duplicate_for_split(tab).unwrap_or(tab)
        } else {
            tab
        }
    }

    fn animate_divider_to(&mut self, target: f64, ctx: &LayoutContext<'_>) {
        let target = self.bounds.clamp(target);
        if (target - self.state.divider_fraction).abs() < DIVIDER_EPSILON {
            self.animation = None;
            return;
        }
        self.animation = Some(DividerAnimation::new(
            self.state.divider_fraction,
            target,
            ctx.now,
            self.animation_duration,
        ));
    }
}

impl Default for SplitLayoutController {
    fn default() -> Self {
        Self::with_defaults()
    }
}
