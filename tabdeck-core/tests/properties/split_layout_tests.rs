//! Property-based tests for the split view state machine
//!
//! Random sequences of window operations are applied to a headless window and
//! the layout invariants are checked after every step.

use std::collections::HashSet;

use proptest::prelude::*;
use tabdeck_core::clock::ManualClock;
use tabdeck_core::split::{DEFAULT_MAX_FRACTION, DEFAULT_MIN_FRACTION};
use tabdeck_core::surface::{HeadlessFactory, SurfaceLedger};
use tabdeck_core::tabs::{MediaActivity, TabCollection, TabKind, TabStore};
use tabdeck_core::types::{PaneSide, Rect, TabId};
use tabdeck_core::window::BrowserWindow;

// ============================================================================
// Test Strategies
// ============================================================================

/// An operation a user or the tab manager can perform on a window
#[derive(Debug, Clone)]
enum WindowOp {
    Open,
    Select(usize),
    Close(usize),
    Pin(usize),
    EnterSplit {
        tab: usize,
        side: PaneSide,
        animate: bool,
    },
    ExitSplit(PaneSide),
    ClosePane(PaneSide),
    Swap,
    BeginPreview(PaneSide),
    UpdatePreview(PaneSide),
    EndPreview(bool),
    Divider(f64),
    Media(usize, bool),
    Unload(usize),
    UnloadInactive,
    Advance(u64),
}

fn side_strategy() -> impl Strategy<Value = PaneSide> {
    prop_oneof![Just(PaneSide::Left), Just(PaneSide::Right)]
}

fn window_op_strategy() -> impl Strategy<Value = WindowOp> {
    prop_oneof![
        3 => Just(WindowOp::Open),
        3 => (0usize..16).prop_map(WindowOp::Select),
        1 => (0usize..16).prop_map(WindowOp::Close),
        1 => (0usize..16).prop_map(WindowOp::Pin),
        3 => (0usize..16, side_strategy(), any::<bool>())
            .prop_map(|(tab, side, animate)| WindowOp::EnterSplit { tab, side, animate }),
        1 => side_strategy().prop_map(WindowOp::ExitSplit),
        1 => side_strategy().prop_map(WindowOp::ClosePane),
        1 => Just(WindowOp::Swap),
        2 => side_strategy().prop_map(WindowOp::BeginPreview),
        1 => side_strategy().prop_map(WindowOp::UpdatePreview),
        2 => any::<bool>().prop_map(WindowOp::EndPreview),
        2 => (-1.0f64..2.0).prop_map(WindowOp::Divider),
        1 => (0usize..16, any::<bool>()).prop_map(|(tab, on)| WindowOp::Media(tab, on)),
        1 => (0usize..16).prop_map(WindowOp::Unload),
        1 => Just(WindowOp::UnloadInactive),
        2 => (0u64..700).prop_map(WindowOp::Advance),
    ]
}

fn window_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<WindowOp>> {
    proptest::collection::vec(window_op_strategy(), 1..=max_ops)
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    window: BrowserWindow,
    clock: ManualClock,
    ledger: SurfaceLedger,
    opened: Vec<TabId>,
}

impl Harness {
    fn new() -> Self {
        let factory = HeadlessFactory::new();
        let ledger = factory.ledger();
        let clock = ManualClock::new();
        let window = BrowserWindow::new(
            TabStore::new(Box::new(factory)),
            Box::new(clock.clone()),
            Rect::from_size(1280.0, 720.0),
        );
        Self {
            window,
            clock,
            ledger,
            opened: Vec::new(),
        }
    }

    fn pick(&self, index: usize) -> Option<TabId> {
        if self.opened.is_empty() {
            None
        } else {
            Some(self.opened[index % self.opened.len()])
        }
    }

    fn apply(&mut self, op: &WindowOp) {
        match *op {
            WindowOp::Open => {
                let id = self.window.open_tab(format!("https://{}.example", self.opened.len()));
                self.opened.push(id);
            }
            WindowOp::Select(i) => {
                if let Some(id) = self.pick(i) {
                    self.window.select_tab(id);
                }
            }
            WindowOp::Close(i) => {
                if let Some(id) = self.pick(i) {
                    self.window.close_tab(id);
                }
            }
            WindowOp::Pin(i) => {
                if let Some(id) = self.pick(i) {
                    self.window.tabs_mut().set_kind(id, TabKind::Pinned);
                    self.window.reconcile();
                }
            }
            WindowOp::EnterSplit { tab, side, animate } => {
                if let Some(id) = self.pick(tab)
                    && let Some(placed) = self.window.enter_split(id, side, animate).placed()
                    && !self.opened.contains(&placed)
                {
                    self.opened.push(placed);
                }
            }
            WindowOp::ExitSplit(side) => self.window.exit_split(side),
            WindowOp::ClosePane(side) => self.window.close_pane(side),
            WindowOp::Swap => {
                self.window.swap_sides();
            }
            WindowOp::BeginPreview(side) => self.window.begin_preview(side),
            WindowOp::UpdatePreview(side) => self.window.update_preview_side(side),
            WindowOp::EndPreview(cancel) => self.window.end_preview(cancel),
            WindowOp::Divider(value) => {
                self.window.set_divider_fraction(value);
            }
            WindowOp::Media(i, on) => {
                if let Some(id) = self.pick(i) {
                    let media = MediaActivity {
                        playing_audio: on,
                        ..MediaActivity::IDLE
                    };
                    self.window.set_media_activity(id, media);
                }
            }
            WindowOp::Unload(i) => {
                if let Some(id) = self.pick(i) {
                    self.window.unload_tab(id);
                }
            }
            WindowOp::UnloadInactive => {
                self.window.unload_all_inactive();
            }
            WindowOp::Advance(secs) => {
                self.clock.advance_secs(secs);
                self.window.tick();
            }
        }
    }

    /// Checks every layout invariant, returning a description of the first
    /// violation.
    fn check(&self) -> Result<(), String> {
        let state = self.window.split_state();
        let tabs = self.window.tabs();

        if !state.is_split() && (state.left_tab_id().is_some() || state.right_tab_id().is_some()) {
            return Err("single mode with pane ids".to_string());
        }
        let fraction = state.divider_fraction();
        if !(DEFAULT_MIN_FRACTION..=DEFAULT_MAX_FRACTION).contains(&fraction) {
            return Err(format!("divider {fraction} out of bounds"));
        }
        if state.is_split() && !state.is_preview_active() {
            let live = [state.left_tab_id(), state.right_tab_id()]
                .into_iter()
                .flatten()
                .filter(|id| tabs.contains(*id))
                .count();
            if live == 0 {
                return Err("committed split without a live pane".to_string());
            }
        }

        let shown = self.window.host().shown_tabs();
        if shown.len() > 2 {
            return Err(format!("{} surfaces shown", shown.len()));
        }
        let unique: HashSet<TabId> = shown.iter().copied().collect();
        if unique.len() != shown.len() {
            return Err("tab shown twice".to_string());
        }
        let visible = self.window.visible_set();
        for id in &shown {
            if !visible.contains(*id) {
                return Err(format!("{id} shown but not visible"));
            }
            if !tabs.is_loaded(*id) {
                return Err(format!("{id} shown without a surface"));
            }
        }
        if self.ledger.visible_tabs().len() != shown.len() {
            return Err("backend and host disagree on shown surfaces".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of operations keeps the layout consistent after every step
    #[test]
    fn prop_layout_invariants_hold(ops in window_ops_strategy(40)) {
        let mut harness = Harness::new();
        for op in &ops {
            harness.apply(op);
            if let Err(violation) = harness.check() {
                return Err(TestCaseError::fail(format!("after {op:?}: {violation}")));
            }
        }
    }

    /// The divider always stays inside its bounds
    #[test]
    fn prop_divider_clamped(values in proptest::collection::vec(any::<f64>(), 1..20)) {
        let mut harness = Harness::new();
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Select(0));
        harness.apply(&WindowOp::EnterSplit { tab: 1, side: PaneSide::Right, animate: false });
        for value in values {
            harness.window.set_divider_fraction(value);
            let fraction = harness.window.split_state().divider_fraction();
            prop_assert!((DEFAULT_MIN_FRACTION..=DEFAULT_MAX_FRACTION).contains(&fraction));
        }
    }

    /// Swapping twice restores the original panes
    #[test]
    fn prop_double_swap_is_identity(side in side_strategy()) {
        let mut harness = Harness::new();
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Select(0));
        harness.apply(&WindowOp::EnterSplit { tab: 1, side, animate: false });
        let before = harness.window.split_state().clone();

        harness.window.swap_sides();
        prop_assert_eq!(
            harness.window.split_state().left_tab_id(),
            before.right_tab_id()
        );
        harness.window.swap_sides();
        prop_assert_eq!(harness.window.split_state(), &before);
    }

    /// Splitting the current tab with itself never enters split view
    #[test]
    fn prop_self_pairing_is_noop(side in side_strategy(), animate in any::<bool>()) {
        let mut harness = Harness::new();
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Select(0));
        let current = harness.opened[0];

        harness.window.enter_split(current, side, animate);
        prop_assert!(!harness.window.split_state().is_split());
        prop_assert_eq!(harness.window.tabs().current_tab(), Some(current));
    }

    /// A cancelled preview without a drop restores single mode
    #[test]
    fn prop_cancelled_preview_reverts(
        first in side_strategy(),
        moves in proptest::collection::vec(side_strategy(), 0..5),
    ) {
        let mut harness = Harness::new();
        harness.apply(&WindowOp::Open);
        harness.apply(&WindowOp::Select(0));

        harness.window.begin_preview(first);
        prop_assert!(harness.window.split_state().is_preview_active());
        prop_assert!(harness.window.split_state().is_split());
        for side in moves {
            harness.window.update_preview_side(side);
        }
        harness.window.end_preview(true);

        let state = harness.window.split_state();
        prop_assert!(!state.is_split());
        prop_assert!(!state.is_preview_active());
        prop_assert_eq!(harness.window.host().shown_tabs(), vec![harness.opened[0]]);
    }
}
