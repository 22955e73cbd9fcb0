//! End-to-end scenarios on a headless window with a manual clock

use std::time::Duration;

use tabdeck_core::clock::ManualClock;
use tabdeck_core::config::{AppSettings, ConfigManager};
use tabdeck_core::split::{EnterSplitOutcome, HealOutcome};
use tabdeck_core::surface::{HeadlessFactory, SurfaceLedger};
use tabdeck_core::tabs::{MediaActivity, TabCollection, TabKind, TabStore};
use tabdeck_core::types::{PaneSide, Rect, TabId};
use tabdeck_core::window::BrowserWindow;
use tempfile::TempDir;

struct Scene {
    window: BrowserWindow,
    clock: ManualClock,
    ledger: SurfaceLedger,
}

impl Scene {
    fn new() -> Self {
        Self::with_settings(&AppSettings::default())
    }

    fn with_settings(settings: &AppSettings) -> Self {
        let factory = HeadlessFactory::new();
        let ledger = factory.ledger();
        let clock = ManualClock::new();
        let window = BrowserWindow::from_settings(
            TabStore::new(Box::new(factory)),
            Box::new(clock.clone()),
            Rect::from_size(1000.0, 700.0),
            settings,
        )
        .expect("valid settings");
        Self {
            window,
            clock,
            ledger,
        }
    }

    fn open_all(&mut self, urls: &[&str]) -> Vec<TabId> {
        urls.iter().map(|url| self.window.open_tab(*url)).collect()
    }

    fn state(&self) -> (bool, Option<TabId>, Option<TabId>) {
        let state = self.window.split_state();
        (state.is_split(), state.left_tab_id(), state.right_tab_id())
    }
}

// ========== Eviction ==========

#[test]
fn hidden_tab_released_at_301_seconds() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["x", "current"]);
    let (x, current) = (ids[0], ids[1]);
    scene.window.select_tab(x);
    scene.window.select_tab(current);

    scene.clock.advance_secs(301);
    let report = scene.window.tick();

    assert_eq!(report.evicted, vec![x]);
    assert!(!scene.ledger.is_live(x));
    assert!(scene.window.scheduler().record(x).is_none());
    assert!(scene.window.tabs().tab(x).unwrap().is_unloaded());
    // The tab itself survives eviction.
    assert!(scene.window.tabs().contains(x));
}

#[test]
fn evicted_tab_reloads_when_selected() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["x", "y"]);
    scene.window.select_tab(ids[0]);
    scene.window.select_tab(ids[1]);
    scene.clock.advance_secs(301);
    scene.window.tick();
    assert!(!scene.ledger.is_live(ids[0]));

    scene.window.select_tab(ids[0]);
    assert!(scene.ledger.is_live(ids[0]));
    assert_eq!(scene.ledger.visible_tabs(), vec![ids[0]]);
    assert_eq!(scene.ledger.created_count(), 3);
}

#[test]
fn shortened_timeout_restarts_from_zero() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["y", "current"]);
    let y = ids[0];
    scene.window.select_tab(y);
    scene.window.select_tab(ids[1]);

    scene.clock.advance_secs(250);
    scene.window.set_unload_timeout(Duration::from_secs(60));

    scene.clock.advance_secs(59);
    assert!(scene.window.tick().evicted.is_empty());
    assert!(scene.ledger.is_live(y));

    scene.clock.advance_secs(2);
    assert_eq!(scene.window.tick().evicted, vec![y]);
}

#[test]
fn media_tab_waits_for_silence() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["radio", "reader"]);
    let radio = ids[0];
    scene.window.select_tab(radio);
    scene.window.set_media_activity(
        radio,
        MediaActivity {
            has_audio_content: true,
            ..MediaActivity::IDLE
        },
    );
    scene.window.select_tab(ids[1]);

    for _ in 0..5 {
        scene.clock.advance_secs(600);
        assert!(scene.window.tick().evicted.is_empty());
    }
    scene.window.set_media_activity(radio, MediaActivity::IDLE);
    scene.clock.advance_secs(300);
    assert_eq!(scene.window.tick().evicted, vec![radio]);
}

#[test]
fn closed_tab_timer_never_fires() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["gone", "stay"]);
    scene.window.select_tab(ids[0]);
    scene.window.select_tab(ids[1]);
    scene.window.close_tab(ids[0]);

    scene.clock.advance_secs(400);
    let report = scene.window.tick();
    assert!(report.evicted.is_empty());
    assert!(report.stale >= 1);
    assert!(!scene.window.scheduler().is_tracked(ids[0]));
    assert_eq!(scene.window.scheduler().stats().tracked, 1);
}

// ========== Split view ==========

#[test]
fn enter_split_then_replace_right() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b", "c"]);
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    scene.window.select_tab(a);

    assert_eq!(
        scene.window.enter_split(b, PaneSide::Right, false),
        EnterSplitOutcome::Entered { placed: b }
    );
    assert_eq!(scene.state(), (true, Some(a), Some(b)));

    assert_eq!(
        scene.window.enter_split(c, PaneSide::Right, false),
        EnterSplitOutcome::Replaced {
            placed: c,
            previous: Some(b)
        }
    );
    assert_eq!(scene.state(), (true, Some(a), Some(c)));
    assert_eq!(scene.ledger.visible_tabs().len(), 2);
    // The replaced pane stays resident until its timeout.
    assert!(scene.ledger.is_live(b));
}

#[test]
fn splitting_current_with_itself_is_noop() {
    let mut scene = Scene::new();
    let a = scene.window.open_tab("a");
    scene.window.select_tab(a);

    assert_eq!(
        scene.window.enter_split(a, PaneSide::Right, true),
        EnterSplitOutcome::SelfPairing
    );
    assert_eq!(scene.state(), (false, None, None));
}

#[test]
fn close_left_pane_promotes_right() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b"]);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);
    scene.window.focus_side(PaneSide::Left);

    scene.window.close_pane(PaneSide::Left);
    assert_eq!(scene.state(), (false, None, None));
    assert_eq!(scene.window.tabs().current_tab(), Some(ids[1]));
    assert_eq!(scene.ledger.visible_tabs(), vec![ids[1]]);
    assert!(scene.ledger.is_live(ids[0]));
}

#[test]
fn cancelled_drag_restores_single() {
    let mut scene = Scene::new();
    let a = scene.window.open_tab("a");
    scene.window.select_tab(a);

    scene.window.begin_preview(PaneSide::Right);
    let state = scene.window.split_state();
    assert!(state.is_preview_active());
    assert_eq!(state.preview_side(), Some(PaneSide::Right));
    assert_eq!(scene.state(), (true, Some(a), None));

    scene.window.end_preview(true);
    assert_eq!(scene.state(), (false, None, None));
    assert!(!scene.window.split_state().is_preview_active());
}

#[test]
fn completed_drop_commits_split() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "dragged"]);
    scene.window.select_tab(ids[0]);

    scene.window.begin_preview(PaneSide::Left);
    scene.window.update_preview_side(PaneSide::Right);
    assert_eq!(scene.state(), (true, Some(ids[0]), None));
    scene.window.enter_split(ids[1], PaneSide::Right, false);
    scene.window.end_preview(false);

    assert_eq!(scene.state(), (true, Some(ids[0]), Some(ids[1])));
    assert!(!scene.window.split_state().is_preview_active());
}

#[test]
fn divider_inputs_are_clamped() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b"]);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);

    for (input, expected) in [(-1.0, 0.2), (0.0, 0.2), (0.5, 0.5), (1.0, 0.8), (2.0, 0.8)] {
        scene.window.set_divider_fraction(input);
        let fraction = scene.window.split_state().divider_fraction();
        assert!((fraction - expected).abs() < 1e-9, "{input} -> {fraction}");
    }
    let left = scene.window.host().attachment(ids[0]).unwrap();
    assert!((left.frame.width - 800.0).abs() < f64::EPSILON);
}

#[test]
fn pinned_tabs_duplicate_in_call_order() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b", "pin-left", "pin-right"]);
    let (pin_left, pin_right) = (ids[2], ids[3]);
    scene.window.tabs_mut().set_kind(pin_left, TabKind::Pinned);
    scene.window.tabs_mut().set_kind(pin_right, TabKind::SpacePinned);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);

    let left = scene
        .window
        .enter_split(pin_left, PaneSide::Left, false)
        .placed()
        .unwrap();
    let right = scene
        .window
        .enter_split(pin_right, PaneSide::Right, false)
        .placed()
        .unwrap();

    assert_eq!(scene.state(), (true, Some(left), Some(right)));
    let candidates = scene.window.tabs().candidate_tabs();
    let tail = &candidates[candidates.len() - 2..];
    assert_eq!(tail, &[left, right]);
    assert!(scene.window.tabs().tab(pin_left).unwrap().is_pinned());
    assert_eq!(
        scene.window.tabs().tab(left).unwrap().kind,
        TabKind::Regular
    );
}

#[test]
fn pane_closed_elsewhere_heals_on_next_pass() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b"]);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);

    // The tab manager removes the tab without telling the window.
    scene.window.tabs_mut().close_tab(ids[0]);
    let report = scene.window.reconcile();

    assert_eq!(report.heal, HealOutcome::KeptSide(PaneSide::Right));
    assert_eq!(scene.state(), (false, None, None));
    assert_eq!(scene.window.tabs().current_tab(), Some(ids[1]));
}

#[test]
fn resize_repositions_panes() {
    let mut scene = Scene::new();
    let ids = scene.open_all(&["a", "b"]);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);

    scene.window.resize(Rect::from_size(600.0, 400.0));
    let right = scene.window.host().attachment(ids[1]).unwrap();
    assert!((right.frame.x - 300.0).abs() < f64::EPSILON);
    assert!((right.frame.height - 400.0).abs() < f64::EPSILON);
}

// ========== Settings ==========

#[test]
fn window_built_from_saved_settings() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::new(dir.path().join("settings.toml"));
    let mut settings = AppSettings::default();
    settings.surfaces.unload_timeout_secs = 30;
    settings.split.min_fraction = 0.3;
    manager.save(&settings).unwrap();

    let loaded = manager.load().unwrap();
    let mut scene = Scene::with_settings(&loaded);
    assert_eq!(scene.window.scheduler().timeout(), Duration::from_secs(30));

    let ids = scene.open_all(&["a", "b"]);
    scene.window.select_tab(ids[0]);
    scene.window.enter_split(ids[1], PaneSide::Right, false);
    scene.window.set_divider_fraction(0.0);
    assert!((scene.window.split_state().divider_fraction() - 0.3).abs() < 1e-9);
}
