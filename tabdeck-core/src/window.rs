//! Browser window context
//!
//! [`BrowserWindow`] owns everything one window needs: the tab collection,
//! the eviction scheduler, the split controller, the compositor host and a
//! clock. It is constructed once and handed to whoever drives the window;
//! nothing here is reachable through globals.
//!
//! Every mutator finishes with a reconciliation pass, so after any call the
//! container reflects the current tab and split state.

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::config::AppSettings;
use crate::context::LayoutContext;
use crate::error::ConfigResult;
use crate::eviction::IdleEvictionScheduler;
use crate::host::{CompositorSurfaceHost, ReconcileReport};
use crate::split::{EnterSplitOutcome, SplitLayoutController, SplitState};
use crate::tabs::{MediaActivity, Tab, TabCollection, TabStore};
use crate::tracing::{field_names, span_names};
use crate::types::{PaneSide, Rect, TabId};
use crate::visible::VisibleSet;

/// Interval between divider animation frames.
pub const ANIMATION_FRAME: Duration = Duration::from_millis(16);

/// Result of one [`BrowserWindow::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tabs whose surfaces were released.
    pub evicted: Vec<TabId>,
    /// Timeouts deferred because the tab was visible or playing media.
    pub rescheduled: usize,
    /// Superseded callbacks discarded.
    pub stale: usize,
    /// Whether the divider is still animating.
    pub animating: bool,
}

/// One browser window.
pub struct BrowserWindow<T: TabCollection = TabStore> {
    tabs: T,
    scheduler: IdleEvictionScheduler,
    split: SplitLayoutController,
    host: CompositorSurfaceHost,
    clock: Box<dyn Clock>,
}

impl<T: TabCollection> BrowserWindow<T> {
    /// Creates a window with default timeout and divider bounds.
    pub fn new(tabs: T, clock: Box<dyn Clock>, bounds: Rect) -> Self {
        Self::with_parts(
            tabs,
            clock,
            IdleEvictionScheduler::with_defaults(),
            SplitLayoutController::with_defaults(),
            bounds,
        )
    }

    /// Creates a window configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the settings are out of range.
    pub fn from_settings(
        tabs: T,
        clock: Box<dyn Clock>,
        bounds: Rect,
        settings: &AppSettings,
    ) -> ConfigResult<Self> {
        settings.validate()?;
        Ok(Self::with_parts(
            tabs,
            clock,
            IdleEvictionScheduler::new(settings.unload_timeout()),
            SplitLayoutController::new(settings.fraction_bounds()?, settings.animation_duration()),
            bounds,
        ))
    }

    /// Assembles a window from preconfigured parts.
    pub fn with_parts(
        tabs: T,
        clock: Box<dyn Clock>,
        scheduler: IdleEvictionScheduler,
        split: SplitLayoutController,
        bounds: Rect,
    ) -> Self {
        Self {
            tabs,
            scheduler,
            split,
            host: CompositorSurfaceHost::new(bounds),
            clock,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// The tab collection.
    pub const fn tabs(&self) -> &T {
        &self.tabs
    }

    /// Mutable access to the tab collection.
    ///
    /// Call [`reconcile`](Self::reconcile) after changes that affect what is
    /// shown.
    pub fn tabs_mut(&mut self) -> &mut T {
        &mut self.tabs
    }

    /// The eviction scheduler.
    pub const fn scheduler(&self) -> &IdleEvictionScheduler {
        &self.scheduler
    }

    /// The split controller.
    pub const fn split(&self) -> &SplitLayoutController {
        &self.split
    }

    /// The split state.
    pub const fn split_state(&self) -> &SplitState {
        self.split.state()
    }

    /// The compositor host.
    pub const fn host(&self) -> &CompositorSurfaceHost {
        &self.host
    }

    /// Current time according to the window clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Tabs that must be shown right now.
    pub fn visible_set(&self) -> VisibleSet {
        VisibleSet::compute(self.tabs.current_tab(), self.split.state())
    }

    // ========================================================================
    // Surface lifecycle
    // ========================================================================

    /// Runs one reconciliation pass.
    ///
    /// Visible tabs without a surface are loaded and the pass is repeated,
    /// so the window never stays blank after healing or a cancelled preview.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let now = self.clock.now();
        let mut ctx = LayoutContext::new(&mut self.tabs, &mut self.scheduler, now);
        let report = self.host.reconcile(&mut self.split, &mut ctx);
        if report.skipped.is_empty() {
            return report;
        }

        let mut loaded = false;
        for id in &report.skipped {
            loaded |= ctx.load(*id);
        }
        if !loaded {
            return report;
        }
        tracing::debug!(count = report.skipped.len(), "Loaded visible tabs without a surface");
        let retry = self.host.reconcile(&mut self.split, &mut ctx);
        ReconcileReport {
            heal: report.heal,
            ..retry
        }
    }

    /// Restarts the idle timeout of a loaded tab.
    ///
    /// Unloaded tabs are left untracked. Returns `true` if a timeout was
    /// scheduled.
    pub fn mark_tab_accessed(&mut self, id: TabId) -> bool {
        if !self.tabs.is_loaded(id) {
            return false;
        }
        let now = self.clock.now();
        self.scheduler.mark_accessed(id, now);
        true
    }

    /// Instantiates the surface of `id` and restarts its idle timeout.
    pub fn load_tab(&mut self, id: TabId) -> bool {
        let now = self.clock.now();
        let loaded = self.scheduler.load(id, now, &mut self.tabs);
        self.reconcile();
        loaded
    }

    /// Releases the surface of `id` immediately.
    ///
    /// A tab that is still visible is loaded again by the reconciliation
    /// pass that follows.
    pub fn unload_tab(&mut self, id: TabId) -> bool {
        let released = self.scheduler.unload(id, &mut self.tabs);
        self.host.forget(id);
        self.reconcile();
        released
    }

    /// Changes the idle timeout and restarts every pending timeout with it.
    pub fn set_unload_timeout(&mut self, timeout: Duration) {
        let now = self.clock.now();
        self.scheduler.set_timeout(timeout, now);
    }

    /// Reacts to the tab manager changing the current tab.
    ///
    /// A committed split survives only if `current` is one of its panes;
    /// otherwise it collapses and `current` is shown alone.
    pub fn update_tab_visibility(&mut self, current: Option<TabId>) -> ReconcileReport {
        let state = self.split.state();
        let outside_split = state.is_split()
            && !state.is_preview_active()
            && current.is_some_and(|id| state.side_of(id).is_none());
        if outside_split {
            self.split.collapse();
        }
        if let Some(side) = current.and_then(|id| self.split.state().side_of(id)) {
            self.split.focus_side(side, &mut self.tabs);
        }

        self.tabs.set_current_tab(current);
        if let Some(id) = self.tabs.current_tab() {
            let now = self.clock.now();
            self.scheduler.load(id, now, &mut self.tabs);
        }
        self.reconcile()
    }

    /// Makes `id` the current tab. Returns `false` for unknown tabs.
    pub fn select_tab(&mut self, id: TabId) -> bool {
        if !self.tabs.contains(id) {
            return false;
        }
        self.update_tab_visibility(Some(id));
        true
    }

    /// Cleans up after the tab manager removed `id`.
    pub fn tab_closed(&mut self, id: TabId) -> ReconcileReport {
        self.scheduler.cancel(id);
        self.host.forget(id);
        self.split.handle_tab_closed(id, &mut self.tabs);
        if let Some(current) = self.tabs.current_tab() {
            let now = self.clock.now();
            self.scheduler.load(current, now, &mut self.tabs);
        }
        self.reconcile()
    }

    /// Updates the media flags of `id`.
    pub fn set_media_activity(&mut self, id: TabId, media: MediaActivity) -> bool {
        let Some(tab) = self.tabs.tab_mut(id) else {
            return false;
        };
        tab.media = media;
        tracing::debug!(tab_id = %id, active = media.is_active(), "Media activity changed");
        true
    }

    /// Resizes the container.
    pub fn resize(&mut self, bounds: Rect) -> ReconcileReport {
        self.host.set_bounds(bounds);
        self.reconcile()
    }

    // ========================================================================
    // Split view
    // ========================================================================

    /// Places `tab` on `side`; see [`SplitLayoutController::enter_split`].
    pub fn enter_split(&mut self, tab: TabId, side: PaneSide, animate: bool) -> EnterSplitOutcome {
        let now = self.clock.now();
        let outcome = {
            let mut ctx = LayoutContext::new(&mut self.tabs, &mut self.scheduler, now);
            self.split.enter_split(tab, side, animate, &mut ctx)
        };
        self.reconcile();
        outcome
    }

    /// Leaves split view keeping the pane on `keep`.
    pub fn exit_split(&mut self, keep: PaneSide) {
        self.split.exit_split(keep, &mut self.tabs);
        self.reconcile();
    }

    /// Closes the pane on `side`.
    pub fn close_pane(&mut self, side: PaneSide) {
        self.split.close_pane(side, &mut self.tabs);
        self.reconcile();
    }

    /// Exchanges the panes.
    pub fn swap_sides(&mut self) -> bool {
        let swapped = self.split.swap_sides();
        self.reconcile();
        swapped
    }

    /// Starts a drag preview for `side`.
    pub fn begin_preview(&mut self, side: PaneSide) {
        self.split.begin_preview(side, &self.tabs);
        self.reconcile();
    }

    /// Moves the drag preview to `side`.
    pub fn update_preview_side(&mut self, side: PaneSide) {
        self.split.update_preview_side(side);
        self.reconcile();
    }

    /// Ends the drag preview.
    pub fn end_preview(&mut self, cancel: bool) {
        self.split.end_preview(cancel);
        self.reconcile();
    }

    /// Moves the divider.
    pub fn set_divider_fraction(&mut self, value: f64) -> bool {
        let moved = self.split.set_divider_fraction(value);
        if moved {
            self.reconcile();
        }
        moved
    }

    /// Focuses the pane on `side`.
    pub fn focus_side(&mut self, side: PaneSide) -> bool {
        let focused = self.split.focus_side(side, &mut self.tabs);
        self.reconcile();
        focused
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Fires due eviction timeouts and advances the divider animation.
    pub fn tick(&mut self) -> TickReport {
        let span = tracing::trace_span!(span_names::EVICTION_TICK, evicted = tracing::field::Empty);
        let _guard = span.enter();
        let now = self.clock.now();
        let visible = self.visible_set();

        let fired = self.scheduler.fire_due(now, &mut self.tabs, &visible);
        span.record(field_names::EVICTED, fired.evicted.len());
        for id in &fired.evicted {
            self.host.forget(*id);
        }

        let was_animating = self.split.is_animating();
        let animating = self.split.step_animation(now);
        if was_animating {
            self.reconcile();
        }

        TickReport {
            evicted: fired.evicted,
            rescheduled: fired.rescheduled,
            stale: fired.stale,
            animating,
        }
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        let eviction = self.scheduler.next_deadline();
        if self.split.is_animating() {
            let frame = self.clock.now() + ANIMATION_FRAME;
            return Some(eviction.map_or(frame, |deadline| deadline.min(frame)));
        }
        eviction
    }

    /// Releases every hidden surface without media activity now.
    pub fn unload_all_inactive(&mut self) -> Vec<TabId> {
        let visible = self.visible_set();
        let unloaded = self.scheduler.unload_all_inactive(&mut self.tabs, &visible);
        for id in &unloaded {
            self.host.forget(*id);
        }
        unloaded
    }
}

impl BrowserWindow<TabStore> {
    /// Opens a tab in the active space without showing it.
    pub fn open_tab(&mut self, url: impl Into<String>) -> TabId {
        self.tabs.open_tab(url)
    }

    /// Closes a tab and repairs everything that referenced it.
    pub fn close_tab(&mut self, id: TabId) -> Option<Tab> {
        let tab = self.tabs.close_tab(id)?;
        self.tab_closed(id);
        Some(tab)
    }
}
