//! Working-copy status synchronization.
//!
//! The synchronizer owns the current [`WorkingCopySnapshot`] and keeps it in
//! step with the external tool. Refreshes come from three triggers: an
//! explicit initial call, a fixed-interval timer, and debounced filesystem
//! events. At most one refresh runs at a time; triggers arriving mid-flight
//! coalesce into a single follow-up. A refresh that fails leaves the
//! published snapshot untouched and never propagates past this module, so
//! the poll loop survives transient tool failures.

use crate::notify::{ChangeNotifier, Subscription};
use crate::provider::VcsClient;
use crate::types::WorkingCopySnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Lifecycle of the synchronizer: `Idle` and `Refreshing` alternate until
/// disposal, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Refreshing,
    Disposed,
}

pub struct StatusSynchronizer {
    client: Arc<dyn VcsClient>,
    snapshot: RwLock<Arc<WorkingCopySnapshot>>,
    notifier: ChangeNotifier,
    state: Mutex<SyncState>,
    pending_trigger: AtomicBool,
    debounce_deadline: Mutex<Option<Instant>>,
    poll_interval: Duration,
    debounce_window: Duration,
}

impl StatusSynchronizer {
    pub fn new(
        client: Arc<dyn VcsClient>,
        poll_interval: Duration,
        debounce_window: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            snapshot: RwLock::new(Arc::new(WorkingCopySnapshot::empty())),
            notifier: ChangeNotifier::new(),
            state: Mutex::new(SyncState::Idle),
            pending_trigger: AtomicBool::new(false),
            debounce_deadline: Mutex::new(None),
            poll_interval,
            debounce_window,
        })
    }

    /// The last successfully computed snapshot. Empty before the first
    /// successful refresh. Published atomically: readers never observe a
    /// half-updated snapshot.
    pub fn current_snapshot(&self) -> Arc<WorkingCopySnapshot> {
        Arc::clone(&self.snapshot.read().unwrap())
    }

    /// Subscribe to "snapshot changed" notifications. Fired only when a
    /// refresh produced a snapshot whose entry set differs from the stored
    /// one, after the new snapshot is visible to readers.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap()
    }

    /// Stop refreshing. Terminal: subsequent triggers are ignored and the
    /// poll loop winds down on its next tick.
    pub fn dispose(&self) {
        *self.state.lock().unwrap() = SyncState::Disposed;
        debug!("synchronizer disposed");
    }

    /// Run one refresh cycle, throttled: if a refresh is already in flight
    /// this call records a pending trigger and returns immediately; the
    /// in-flight cycle runs exactly one follow-up refresh afterwards.
    pub async fn refresh(&self) {
        if !self.begin_refresh() {
            return;
        }

        loop {
            self.refresh_once().await;
            if !self.end_refresh() {
                break;
            }
        }
    }

    /// Report a filesystem change. Bursts within the quiet window collapse
    /// into a single refresh scheduled once the window elapses.
    pub fn notify_fs_event(self: &Arc<Self>) {
        if self.state() == SyncState::Disposed {
            return;
        }

        let fire_at = Instant::now() + self.debounce_window;
        let waiter_needed = {
            let mut deadline = self.debounce_deadline.lock().unwrap();
            let idle = deadline.is_none();
            *deadline = Some(fire_at);
            idle
        };
        if !waiter_needed {
            // An existing waiter will observe the pushed-back deadline.
            return;
        }

        let synchronizer = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let target = match *synchronizer.debounce_deadline.lock().unwrap() {
                    Some(target) => target,
                    None => return,
                };
                if Instant::now() < target {
                    tokio::time::sleep_until(target).await;
                    continue;
                }
                // Expire under the lock, re-checking the deadline: an event
                // racing this expiry has pushed the deadline back and keeps
                // its full quiet window instead of being absorbed here.
                let mut deadline = synchronizer.debounce_deadline.lock().unwrap();
                match *deadline {
                    Some(current) if Instant::now() >= current => {
                        *deadline = None;
                    }
                    Some(_) => continue,
                    None => return,
                }
                break;
            }
            synchronizer.refresh().await;
        });
    }

    /// Drive the timer-based cadence: one refresh immediately, then one per
    /// poll interval until disposal.
    pub fn spawn_poll_loop(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let synchronizer = Arc::clone(self);
        tokio::spawn(async move {
            synchronizer.refresh().await;

            let mut ticker = tokio::time::interval(synchronizer.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so the loop
            // waits a full interval after the initial refresh.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if synchronizer.state() == SyncState::Disposed {
                    break;
                }
                synchronizer.refresh().await;
            }
            debug!("poll loop stopped");
        })
    }

    fn begin_refresh(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match *state {
            SyncState::Disposed => false,
            SyncState::Refreshing => {
                self.pending_trigger.store(true, Ordering::SeqCst);
                false
            }
            SyncState::Idle => {
                *state = SyncState::Refreshing;
                true
            }
        }
    }

    /// Leave the `Refreshing` state, or keep it when a trigger arrived
    /// mid-flight; returns whether a coalesced follow-up refresh is owed.
    ///
    /// The pending flag is consumed under the state lock. A trigger racing
    /// the end of a cycle therefore either finds the state still
    /// `Refreshing` (its flag is consumed here and the cycle continues) or
    /// finds `Idle` and starts its own cycle; it can never strand a pending
    /// flag behind an exiting cycle.
    fn end_refresh(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == SyncState::Disposed {
            self.pending_trigger.store(false, Ordering::SeqCst);
            return false;
        }
        if self.pending_trigger.swap(false, Ordering::SeqCst) {
            true
        } else {
            *state = SyncState::Idle;
            false
        }
    }

    async fn refresh_once(&self) {
        let entries = match self.client.status().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "status refresh failed; keeping previous snapshot");
                return;
            }
        };

        // Only tracked local changes reach the published snapshot.
        let tracked = entries
            .into_iter()
            .filter(|entry| entry.status.is_tracked_change())
            .collect();
        let next = WorkingCopySnapshot::new(tracked);

        let changed = {
            let current = self.snapshot.read().unwrap();
            !current.same_entries(&next)
        };
        if !changed {
            debug!("status refresh produced identical snapshot");
            return;
        }

        {
            let mut slot = self.snapshot.write().unwrap();
            *slot = Arc::new(next);
        }
        info!(
            entries = self.snapshot.read().unwrap().len(),
            "working copy snapshot updated"
        );
        self.notifier.fire();
    }
}
