//! Compositor surface host
//!
//! The host owns the single native container of a window and decides which
//! surfaces are parented into it, where, and whether they are shown. Every
//! reconciliation pass runs to completion: detach everything, recompute,
//! attach everything. Hidden surfaces stay attached so switching back is
//! cheap; releasing them is the eviction scheduler's job alone.

use std::collections::HashSet;

use crate::context::LayoutContext;
use crate::split::{HealOutcome, SplitLayoutController};
use crate::tracing::{field_names, span_names};
use crate::types::{Rect, TabId};
use crate::visible::VisibleSet;

/// A surface parented into the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    /// Tab owning the surface.
    pub tab: TabId,
    /// Frame inside the container.
    pub frame: Rect,
    /// Whether the surface is shown.
    pub visible: bool,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Tabs that must be shown.
    pub visible: VisibleSet,
    /// Number of surfaces attached (shown or hidden).
    pub attached: usize,
    /// Visible tabs skipped because their surface is not loaded yet.
    pub skipped: Vec<TabId>,
    /// What the split healing check did.
    pub heal: HealOutcome,
}

/// Reconciles the window container against the current tab and split state.
#[derive(Debug, Default)]
pub struct CompositorSurfaceHost {
    bounds: Rect,
    attachments: Vec<Attachment>,
    passes: u64,
}

impl CompositorSurfaceHost {
    /// Creates a host for a container of the given bounds.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            attachments: Vec::new(),
            passes: 0,
        }
    }

    /// Container bounds.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Updates the container bounds. The caller reconciles afterwards.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Surfaces attached by the last pass, in candidate order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Tabs shown by the last pass.
    #[must_use]
    pub fn shown_tabs(&self) -> Vec<TabId> {
        self.attachments
            .iter()
            .filter(|a| a.visible)
            .map(|a| a.tab)
            .collect()
    }

    /// Attachment of `tab`, if attached.
    #[must_use]
    pub fn attachment(&self, tab: TabId) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.tab == tab)
    }

    /// Number of reconciliation passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Drops the attachment of a tab whose surface was released elsewhere.
    pub fn forget(&mut self, tab: TabId) {
        self.attachments.retain(|a| a.tab != tab);
    }

    /// Detaches every parented surface. Idempotent.
    pub fn detach_all(&mut self, ctx: &mut LayoutContext<'_>) {
        for attachment in self.attachments.drain(..) {
            if let Some(surface) = ctx
                .tabs
                .tab_mut(attachment.tab)
                .and_then(|tab| tab.surface_mut().get_mut())
            {
                surface.detach();
            }
        }
    }

    /// Runs one reconciliation pass.
    pub fn reconcile(
        &mut self,
        split: &mut SplitLayoutController,
        ctx: &mut LayoutContext<'_>,
    ) -> ReconcileReport {
        let span = tracing::debug_span!(span_names::RECONCILE, shown = tracing::field::Empty);
        let _guard = span.enter();
        self.passes += 1;

        self.detach_all(ctx);
        let heal = split.heal(ctx.tabs);

        let state = split.state();
        let current = ctx.tabs.current_tab();
        let visible = VisibleSet::compute(current, state);

        let mut seen = HashSet::new();
        let mut candidates: Vec<TabId> = ctx
            .tabs
            .candidate_tabs()
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if state.is_split() {
            // Panes from another space still have to render.
            for pane in visible.iter() {
                if seen.insert(pane) {
                    candidates.push(pane);
                }
            }
        }

        let (left_frame, right_frame) = self.bounds.split_horizontally(state.divider_fraction());
        let mut skipped = Vec::new();
        let mut shown = Vec::with_capacity(2);

        for id in candidates {
            let (frame, show) = if state.is_split() {
                if state.left_tab_id() == Some(id) {
                    (left_frame, true)
                } else if state.right_tab_id() == Some(id) {
                    (right_frame, true)
                } else {
                    (self.bounds, false)
                }
            } else {
                (self.bounds, current == Some(id))
            };

            let Some(surface) = ctx
                .tabs
                .tab_mut(id)
                .and_then(|tab| tab.surface_mut().get_mut())
            else {
                if show {
                    skipped.push(id);
                }
                continue;
            };
            surface.place(frame, show);
            self.attachments.push(Attachment {
                tab: id,
                frame,
                visible: show,
            });
            if show {
                shown.push(id);
            }
        }

        for id in &shown {
            ctx.scheduler.mark_accessed(*id, ctx.now);
        }
        span.record(field_names::SHOWN, shown.len());

        tracing::debug!(
            pass = self.passes,
            attached = self.attachments.len(),
            skipped = skipped.len(),
            split = state.is_split(),
            "Reconciled compositor"
        );

        ReconcileReport {
            visible,
            attached: self.attachments.len(),
            skipped,
            heal,
        }
    }
}
