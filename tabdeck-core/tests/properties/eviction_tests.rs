//! Property-based tests for idle eviction timing

use std::time::{Duration, Instant};

use proptest::prelude::*;
use tabdeck_core::eviction::{IdleEvictionScheduler, TimeoutOutcome};
use tabdeck_core::surface::HeadlessFactory;
use tabdeck_core::tabs::{MediaActivity, TabCollection, TabStore};
use tabdeck_core::types::TabId;
use tabdeck_core::visible::VisibleSet;

fn loaded_tab(store: &mut TabStore) -> TabId {
    let id = store.open_tab("https://idle.example");
    store.ensure_surface(id);
    id
}

fn media_strategy() -> impl Strategy<Value = MediaActivity> {
    (any::<bool>(), any::<bool>(), any::<bool>())
        .prop_filter("at least one flag", |(a, v, c)| *a || *v || *c)
        .prop_map(|(playing_audio, playing_video, has_audio_content)| MediaActivity {
            playing_audio,
            playing_video,
            has_audio_content,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A hidden idle tab survives `T - 1s` and is evicted by `T + 1s`
    #[test]
    fn prop_evicted_exactly_after_timeout(timeout_secs in 2u64..3600) {
        let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
        let id = loaded_tab(&mut store);
        let timeout = Duration::from_secs(timeout_secs);
        let mut scheduler = IdleEvictionScheduler::new(timeout);
        let t0 = Instant::now();
        scheduler.mark_accessed(id, t0);

        let early = scheduler.fire_due(t0 + timeout - Duration::from_secs(1), &mut store, &VisibleSet::EMPTY);
        prop_assert!(early.is_empty());
        prop_assert!(store.is_loaded(id));

        let late = scheduler.fire_due(t0 + timeout + Duration::from_secs(1), &mut store, &VisibleSet::EMPTY);
        prop_assert_eq!(late.evicted, vec![id]);
        prop_assert!(!store.is_loaded(id));
        prop_assert!(scheduler.record(id).is_none());
    }

    /// Media activity exempts a tab for any idle time
    #[test]
    fn prop_media_never_evicted(media in media_strategy(), rounds in 1u32..20) {
        let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
        let id = loaded_tab(&mut store);
        store.tab_mut(id).unwrap().media = media;
        let mut scheduler = IdleEvictionScheduler::with_defaults();
        let t0 = Instant::now();
        scheduler.mark_accessed(id, t0);

        let mut now = t0;
        for _ in 0..rounds {
            now += Duration::from_secs(301);
            let report = scheduler.fire_due(now, &mut store, &VisibleSet::EMPTY);
            prop_assert!(report.evicted.is_empty());
        }
        prop_assert!(store.is_loaded(id));

        // Clearing the flags allows eviction within one more window.
        store.tab_mut(id).unwrap().media = MediaActivity::IDLE;
        let report = scheduler.fire_due(now + Duration::from_secs(301), &mut store, &VisibleSet::EMPTY);
        prop_assert_eq!(report.evicted, vec![id]);
    }

    /// Changing the timeout restarts every pending timeout at zero elapsed
    #[test]
    fn prop_set_timeout_restarts_clock(
        elapsed_secs in 0u64..300,
        new_timeout_secs in 1u64..1000,
    ) {
        let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
        let id = loaded_tab(&mut store);
        let mut scheduler = IdleEvictionScheduler::with_defaults();
        let t0 = Instant::now();
        scheduler.mark_accessed(id, t0);

        let changed_at = t0 + Duration::from_secs(elapsed_secs);
        let new_timeout = Duration::from_secs(new_timeout_secs);
        scheduler.set_timeout(new_timeout, changed_at);

        prop_assert_eq!(scheduler.deadline(id), Some(changed_at + new_timeout));
        prop_assert_eq!(scheduler.last_access(id), Some(t0));
        prop_assert_eq!(scheduler.next_deadline(), Some(changed_at + new_timeout));
    }

    /// Only the latest token of a tab can act
    #[test]
    fn prop_superseded_tokens_are_stale(accesses in 2usize..10) {
        let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
        let id = loaded_tab(&mut store);
        let mut scheduler = IdleEvictionScheduler::with_defaults();
        let t0 = Instant::now();

        let tokens: Vec<_> = (0..accesses)
            .map(|i| scheduler.mark_accessed(id, t0 + Duration::from_secs(i as u64)))
            .collect();
        let late = t0 + Duration::from_secs(10_000);

        for token in &tokens[..tokens.len() - 1] {
            let outcome = scheduler.on_timeout(id, *token, late, &mut store, &VisibleSet::EMPTY);
            prop_assert_eq!(outcome, TimeoutOutcome::Stale);
            prop_assert!(store.is_loaded(id));
        }
        let last = tokens[tokens.len() - 1];
        prop_assert_eq!(
            scheduler.on_timeout(id, last, late, &mut store, &VisibleSet::EMPTY),
            TimeoutOutcome::Evicted
        );
    }

    /// A pending timer exists exactly for tabs with a surface
    #[test]
    fn prop_records_follow_surfaces(
        loaded in proptest::collection::vec(any::<bool>(), 1..12),
        advance_secs in 0u64..900,
    ) {
        let mut store = TabStore::new(Box::new(HeadlessFactory::new()));
        let mut scheduler = IdleEvictionScheduler::with_defaults();
        let t0 = Instant::now();
        let ids: Vec<TabId> = loaded
            .iter()
            .map(|load| {
                let id = store.open_tab("https://tab.example");
                if *load {
                    scheduler.load(id, t0, &mut store);
                }
                id
            })
            .collect();

        scheduler.fire_due(t0 + Duration::from_secs(advance_secs), &mut store, &VisibleSet::EMPTY);
        for id in ids {
            prop_assert_eq!(scheduler.is_tracked(id), store.is_loaded(id));
        }
    }
}
