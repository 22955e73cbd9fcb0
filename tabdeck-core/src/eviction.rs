//! Idle eviction of rendering surfaces
//!
//! The [`IdleEvictionScheduler`] tracks when each tab was last shown and
//! keeps one pending single-shot timeout per tab. When a timeout fires the
//! surface is released unless the tab is current, visible or playing media,
//! in which case the timeout is simply rescheduled.
//!
//! # Cancellation
//!
//! Every (re)scheduling issues a fresh [`EvictionToken`]. Scheduled callbacks
//! carry the token they were issued with and are discarded when it no longer
//! matches the live record, so replacing or cancelling a timeout never
//! depends on removing an already queued callback. Superseded callbacks
//! are compacted away once they outnumber live records.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use crate::tabs::TabCollection;
use crate::types::TabId;
use crate::visible::VisibleSet;

/// Default idle time before a hidden surface is released (5 minutes).
pub const DEFAULT_UNLOAD_TIMEOUT_SECS: u64 = 300;

/// Shortest accepted idle timeout.
pub const MIN_UNLOAD_TIMEOUT: Duration = Duration::from_secs(1);

/// Queued callbacks tolerated beyond twice the live records before compaction.
const QUEUE_SLACK: usize = 64;

/// Identity of one scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvictionToken(u64);

impl fmt::Display for EvictionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Access bookkeeping for a resident tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    /// When the tab was last marked as accessed.
    pub last_access: Instant,
    /// Token of the live timeout.
    pub token: EvictionToken,
    /// When the live timeout fires.
    pub deadline: Instant,
}

/// A queued timeout callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ScheduledEviction {
    deadline: Instant,
    token: EvictionToken,
    tab: TabId,
}

/// What a fired timeout did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// The surface was released and the record removed.
    Evicted,
    /// The tab had no surface; the record was removed.
    AlreadyUnloaded,
    /// The tab is current or visible; the timeout was rescheduled.
    KeptVisible,
    /// The tab has media activity; the timeout was rescheduled.
    KeptMedia,
    /// The tab no longer exists; the record was removed.
    TabGone,
    /// The callback was superseded or cancelled and did nothing.
    Stale,
}

/// Summary of one [`IdleEvictionScheduler::fire_due`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Tabs whose surfaces were released.
    pub evicted: Vec<TabId>,
    /// Timeouts that were pushed back.
    pub rescheduled: usize,
    /// Callbacks discarded by token mismatch.
    pub stale: usize,
}

impl EvictionReport {
    /// Returns true if nothing fired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.rescheduled == 0 && self.stale == 0
    }
}

/// Scheduler statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tabs with a live record.
    pub tracked: usize,
    /// Queued callbacks, including stale ones not yet discarded.
    pub queued: usize,
    /// Current idle timeout.
    pub timeout: Duration,
}

/// Releases surfaces of tabs that stayed hidden for too long.
#[derive(Debug)]
pub struct IdleEvictionScheduler {
    timeout: Duration,
    records: HashMap<TabId, AccessRecord>,
    queue: BinaryHeap<Reverse<ScheduledEviction>>,
    next_token: u64,
}

impl IdleEvictionScheduler {
    /// Creates a scheduler with the given idle timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: timeout.max(MIN_UNLOAD_TIMEOUT),
            records: HashMap::new(),
            queue: BinaryHeap::new(),
            next_token: 0,
        }
    }

    /// Creates a scheduler with the default 300 second timeout.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(DEFAULT_UNLOAD_TIMEOUT_SECS))
    }

    /// The idle timeout used for new schedules.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Records `now` as the last access of `id` and restarts its timeout.
    pub fn mark_accessed(&mut self, id: TabId, now: Instant) -> EvictionToken {
        self.schedule(id, now, now)
    }

    /// Changes the idle timeout.
    ///
    /// Every pending timeout restarts at zero elapsed with the new duration;
    /// progress made under the old duration is discarded.
    pub fn set_timeout(&mut self, timeout: Duration, now: Instant) {
        self.timeout = timeout.max(MIN_UNLOAD_TIMEOUT);
        let pending: Vec<(TabId, Instant)> = self
            .records
            .iter()
            .map(|(id, record)| (*id, record.last_access))
            .collect();
        for (id, last_access) in pending {
            self.schedule(id, now, last_access);
        }
        tracing::info!(
            timeout_secs = self.timeout.as_secs(),
            restarted = self.records.len(),
            "Unload timeout changed"
        );
    }

    /// Drops the record of `id`; any queued callback becomes stale.
    ///
    /// Must be called when a tab is removed. Returns `true` if a record existed.
    pub fn cancel(&mut self, id: TabId) -> bool {
        let removed = self.records.remove(&id).is_some();
        if removed {
            tracing::trace!(tab_id = %id, "Eviction timeout cancelled");
        }
        removed
    }

    /// Marks the tab accessed and makes sure its surface exists.
    ///
    /// Returns `false` if the tab is unknown.
    pub fn load(&mut self, id: TabId, now: Instant, tabs: &mut dyn TabCollection) -> bool {
        if !tabs.contains(id) {
            return false;
        }
        self.mark_accessed(id, now);
        tabs.ensure_surface(id);
        true
    }

    /// Cancels the timeout and releases the surface immediately.
    ///
    /// Returns `true` if a surface was released.
    pub fn unload(&mut self, id: TabId, tabs: &mut dyn TabCollection) -> bool {
        self.cancel(id);
        let released = tabs.release_surface(id);
        if released {
            tracing::debug!(tab_id = %id, reason = "explicit", "Tab unloaded");
        }
        released
    }

    /// Handles a fired timeout.
    ///
    /// Does nothing unless `token` is still the live token for `id`.
    pub fn on_timeout(
        &mut self,
        id: TabId,
        token: EvictionToken,
        now: Instant,
        tabs: &mut dyn TabCollection,
        visible: &VisibleSet,
    ) -> TimeoutOutcome {
        let Some(record) = self.records.get(&id).copied() else {
            return TimeoutOutcome::Stale;
        };
        if record.token != token {
            return TimeoutOutcome::Stale;
        }

        let Some(tab) = tabs.tab(id) else {
            self.records.remove(&id);
            tracing::debug!(tab_id = %id, "Dropping eviction record of closed tab");
            return TimeoutOutcome::TabGone;
        };

        if tabs.current_tab() == Some(id) {
            self.schedule(id, now, record.last_access);
            tracing::trace!(tab_id = %id, reason = "current", "Eviction deferred");
            return TimeoutOutcome::KeptVisible;
        }
        if visible.contains(id) {
            self.schedule(id, now, record.last_access);
            tracing::trace!(tab_id = %id, reason = "visible", "Eviction deferred");
            return TimeoutOutcome::KeptVisible;
        }
        if tab.media.is_active() {
            self.schedule(id, now, record.last_access);
            tracing::debug!(tab_id = %id, reason = "media", "Eviction deferred");
            return TimeoutOutcome::KeptMedia;
        }

        self.records.remove(&id);
        if tabs.release_surface(id) {
            tracing::info!(
                tab_id = %id,
                idle_secs = now.saturating_duration_since(record.last_access).as_secs(),
                reason = "idle",
                "Tab unloaded"
            );
            TimeoutOutcome::Evicted
        } else {
            TimeoutOutcome::AlreadyUnloaded
        }
    }

    /// Fires every queued callback whose deadline is at or before `now`.
    pub fn fire_due(
        &mut self,
        now: Instant,
        tabs: &mut dyn TabCollection,
        visible: &VisibleSet,
    ) -> EvictionReport {
        let mut report = EvictionReport::default();
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.deadline > now {
                break;
            }
            self.queue.pop();
            match self.on_timeout(next.tab, next.token, now, tabs, visible) {
                TimeoutOutcome::Evicted => report.evicted.push(next.tab),
                TimeoutOutcome::KeptVisible | TimeoutOutcome::KeptMedia => {
                    report.rescheduled += 1;
                }
                TimeoutOutcome::Stale => report.stale += 1,
                TimeoutOutcome::AlreadyUnloaded | TimeoutOutcome::TabGone => {}
            }
        }
        report
    }

    /// Deadline of the earliest live timeout.
    ///
    /// Discards stale callbacks sitting at the head of the queue.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if self.is_live(&next) {
                return Some(next.deadline);
            }
            self.queue.pop();
        }
        None
    }

    /// Releases every tracked surface that is not current, outside `visible`
    /// and without media activity.
    ///
    /// Returns the tabs that were unloaded.
    pub fn unload_all_inactive(
        &mut self,
        tabs: &mut dyn TabCollection,
        visible: &VisibleSet,
    ) -> Vec<TabId> {
        let current = tabs.current_tab();
        let mut candidates: Vec<TabId> = self
            .records
            .keys()
            .copied()
            .filter(|id| !visible.contains(*id) && current != Some(*id))
            .collect();
        candidates.sort();

        let mut unloaded = Vec::new();
        for id in candidates {
            let media_active = tabs.tab(id).is_some_and(|tab| tab.media.is_active());
            if media_active {
                continue;
            }
            if self.unload(id, tabs) {
                unloaded.push(id);
            }
        }
        tracing::info!(count = unloaded.len(), "Unloaded inactive tabs");
        unloaded
    }

    /// The access record of `id`, if tracked.
    #[must_use]
    pub fn record(&self, id: TabId) -> Option<&AccessRecord> {
        self.records.get(&id)
    }

    /// When `id` was last accessed.
    #[must_use]
    pub fn last_access(&self, id: TabId) -> Option<Instant> {
        self.records.get(&id).map(|r| r.last_access)
    }

    /// When the live timeout of `id` fires.
    #[must_use]
    pub fn deadline(&self, id: TabId) -> Option<Instant> {
        self.records.get(&id).map(|r| r.deadline)
    }

    /// Returns true if `id` has a pending timeout.
    #[must_use]
    pub fn is_tracked(&self, id: TabId) -> bool {
        self.records.contains_key(&id)
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            tracked: self.records.len(),
            queued: self.queue.len(),
            timeout: self.timeout,
        }
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    fn schedule(&mut self, id: TabId, now: Instant, last_access: Instant) -> EvictionToken {
        self.next_token += 1;
        let token = EvictionToken(self.next_token);
        let deadline = now + self.timeout;
        self.records.insert(
            id,
            AccessRecord {
                last_access,
                token,
                deadline,
            },
        );
        self.queue.push(Reverse(ScheduledEviction {
            deadline,
            token,
            tab: id,
        }));
        tracing::trace!(tab_id = %id, %token, "Eviction timeout scheduled");
        if self.queue.len() > 2 * self.records.len() + QUEUE_SLACK {
            self.compact();
        }
        token
    }

    /// Drops every queued callback whose token is no longer live.
    fn compact(&mut self) {
        let before = self.queue.len();
        let queue = std::mem::take(&mut self.queue);
        self.queue = queue
            .into_iter()
            .filter(|Reverse(scheduled)| self.is_live(scheduled))
            .collect();
        tracing::trace!(
            dropped = before - self.queue.len(),
            queued = self.queue.len(),
            "Eviction queue compacted"
        );
    }

    fn is_live(&self, scheduled: &ScheduledEviction) -> bool {
        self.records
            .get(&scheduled.tab)
            .is_some_and(|r| r.token == scheduled.token)
    }
}

impl Default for IdleEvictionScheduler {
    fn default() -> Self {
        Self::with_defaults()
    }
}
