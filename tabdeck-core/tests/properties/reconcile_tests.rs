//! Property-based tests for compositor reconciliation

use std::collections::HashSet;
use std::time::Instant;

use proptest::prelude::*;
use tabdeck_core::context::LayoutContext;
use tabdeck_core::eviction::IdleEvictionScheduler;
use tabdeck_core::host::CompositorSurfaceHost;
use tabdeck_core::split::SplitLayoutController;
use tabdeck_core::surface::HeadlessFactory;
use tabdeck_core::tabs::{TabCollection, TabStore};
use tabdeck_core::types::{PaneSide, Rect, TabId};

/// Window contents to reconcile
#[derive(Debug, Clone)]
struct Scenario {
    loaded: Vec<bool>,
    current: usize,
    split_with: Option<(usize, PaneSide)>,
    width: f64,
    divider: f64,
}

fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    (
        proptest::collection::vec(any::<bool>(), 1..10),
        any::<usize>(),
        proptest::option::of((
            any::<usize>(),
            prop_oneof![Just(PaneSide::Left), Just(PaneSide::Right)],
        )),
        100.0f64..4000.0,
        0.0f64..1.0,
    )
        .prop_map(|(loaded, current, split_with, width, divider)| Scenario {
            loaded,
            current,
            split_with,
            width,
            divider,
        })
}

struct Built {
    store: TabStore,
    scheduler: IdleEvictionScheduler,
    split: SplitLayoutController,
    host: CompositorSurfaceHost,
    ids: Vec<TabId>,
}

fn build(scenario: &Scenario) -> Built {
    let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
    let ids: Vec<TabId> = scenario
        .loaded
        .iter()
        .map(|load| {
            let id = store.open_tab("https://tab.example");
            if *load {
                store.ensure_surface(id);
            }
            id
        })
        .collect();
    store.set_current_tab(Some(ids[scenario.current % ids.len()]));

    let mut scheduler = IdleEvictionScheduler::with_defaults();
    let mut split = SplitLayoutController::with_defaults();
    if let Some((other, side)) = scenario.split_with {
        let mut ctx = LayoutContext::new(&mut store, &mut scheduler, Instant::now());
        split.enter_split(ids[other % ids.len()], side, false, &mut ctx);
        split.set_divider_fraction(scenario.divider);
    }

    Built {
        store,
        scheduler,
        split,
        host: CompositorSurfaceHost::new(Rect::from_size(scenario.width, 900.0)),
        ids,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// At most two distinct tabs are shown, all of them visible and loaded
    #[test]
    fn prop_reconcile_shows_at_most_two(scenario in scenario_strategy()) {
        let mut built = build(&scenario);
        let now = Instant::now();
        let report = {
            let mut ctx = LayoutContext::new(&mut built.store, &mut built.scheduler, now);
            built.host.reconcile(&mut built.split, &mut ctx)
        };

        let shown = built.host.shown_tabs();
        prop_assert!(shown.len() <= 2);
        let unique: HashSet<TabId> = shown.iter().copied().collect();
        prop_assert_eq!(unique.len(), shown.len());
        for id in &shown {
            prop_assert!(report.visible.contains(*id));
            prop_assert!(built.store.is_loaded(*id));
            prop_assert!(built.scheduler.is_tracked(*id));
        }
        prop_assert_eq!(shown.len() + report.skipped.len(), report.visible.len());
    }

    /// Every loaded tab is attached; hidden ones at full bounds
    #[test]
    fn prop_loaded_tabs_stay_attached(scenario in scenario_strategy()) {
        let mut built = build(&scenario);
        {
            let mut ctx = LayoutContext::new(&mut built.store, &mut built.scheduler, Instant::now());
            built.host.reconcile(&mut built.split, &mut ctx);
        }

        let bounds = built.host.bounds();
        for id in &built.ids {
            let attachment = built.host.attachment(*id);
            prop_assert_eq!(attachment.is_some(), built.store.is_loaded(*id));
            if let Some(attachment) = attachment
                && !attachment.visible
            {
                prop_assert_eq!(attachment.frame, bounds);
            }
        }
    }

    /// Split panes tile the container without overlap
    #[test]
    fn prop_split_frames_tile_container(scenario in scenario_strategy()) {
        let mut built = build(&scenario);
        {
            let mut ctx = LayoutContext::new(&mut built.store, &mut built.scheduler, Instant::now());
            built.host.reconcile(&mut built.split, &mut ctx);
        }
        let state = built.split.state();
        prop_assume!(state.is_split());
        let (Some(left), Some(right)) = (state.left_tab_id(), state.right_tab_id()) else {
            return Err(TestCaseError::reject("incomplete split"));
        };
        let (Some(left), Some(right)) = (built.host.attachment(left), built.host.attachment(right)) else {
            return Err(TestCaseError::reject("pane not loaded"));
        };

        let width = built.host.bounds().width;
        prop_assert!((left.frame.x).abs() < 1e-9);
        prop_assert!((left.frame.width + right.frame.width - width).abs() < 1e-9);
        prop_assert!((right.frame.x - left.frame.width).abs() < 1e-9);
    }

    /// Reconciling twice in a row changes nothing
    #[test]
    fn prop_reconcile_is_idempotent(scenario in scenario_strategy()) {
        let mut built = build(&scenario);
        let now = Instant::now();
        let first = {
            let mut ctx = LayoutContext::new(&mut built.store, &mut built.scheduler, now);
            built.host.reconcile(&mut built.split, &mut ctx)
        };
        let attachments = built.host.attachments().to_vec();
        let second = {
            let mut ctx = LayoutContext::new(&mut built.store, &mut built.scheduler, now);
            built.host.reconcile(&mut built.split, &mut ctx)
        };

        prop_assert_eq!(first.visible, second.visible);
        prop_assert_eq!(built.host.attachments(), attachments.as_slice());
    }
}
