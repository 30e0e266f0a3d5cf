// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scheduler implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{CycleKind, CycleOutcome, CycleToken, PollJob, RefreshDecision, SchedulerState};

/// Scheduling slots guarded by one lock: the coalescing critical section.
struct Slots {
    state: SchedulerState,
    periodic: Option<JoinHandle<()>>,
    /// Single-slot pending immediate job. Cleared when the job starts
    /// executing, so "pending" means scheduled-but-not-yet-started.
    immediate: Option<JoinHandle<()>>,
    next_periodic_due: Option<Instant>,
}

struct Inner<J> {
    job: J,
    period: Duration,
    disposed: Arc<AtomicBool>,
    /// Serializes cycle execution for this session.
    cycle_lock: tokio::sync::Mutex<()>,
    slots: Mutex<Slots>,
}

/// Drives poll cycles for one session.
///
/// # Examples
///
/// ```no_run
/// use homewatch_lib::scheduler::{CycleKind, CycleOutcome, CycleToken, PollJob, PollScheduler};
/// use std::time::Duration;
///
/// struct NoopJob;
///
/// impl PollJob for NoopJob {
///     async fn poll_cycle(&self, _kind: CycleKind, _token: CycleToken) -> CycleOutcome {
///         CycleOutcome::Completed { records: 0, changed: 0 }
///     }
/// }
///
/// let scheduler = PollScheduler::new(NoopJob, Duration::from_secs(300));
/// scheduler.activate();
/// scheduler.request_refresh(Duration::from_secs(2));
/// scheduler.dispose();
/// ```
pub struct PollScheduler<J: PollJob> {
    inner: Arc<Inner<J>>,
}

impl<J: PollJob> PollScheduler<J> {
    /// Creates an idle scheduler for `job` at the given period.
    #[must_use]
    pub fn new(job: J, period: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                job,
                period,
                disposed: Arc::new(AtomicBool::new(false)),
                cycle_lock: tokio::sync::Mutex::new(()),
                slots: Mutex::new(Slots {
                    state: SchedulerState::Idle,
                    periodic: None,
                    immediate: None,
                    next_periodic_due: None,
                }),
            }),
        }
    }

    /// Starts the periodic schedule: first run immediately, then every
    /// period. Idempotent; ignored after disposal.
    pub fn activate(&self) {
        let mut slots = self.inner.slots.lock();
        if slots.state == SchedulerState::Disposed || slots.periodic.is_some() {
            return;
        }
        slots.state = SchedulerState::PeriodicScheduled;
        slots.next_periodic_due = Some(Instant::now());

        let inner = Arc::clone(&self.inner);
        slots.periodic = Some(tokio::spawn(async move {
            loop {
                if inner.disposed.load(Ordering::SeqCst) {
                    break;
                }
                // Anchor the next run before this one starts: refresh
                // requests arriving mid-cycle coalesce against the NEXT
                // periodic run, not the one already delivering fresh data.
                let next = Instant::now() + inner.period;
                inner.slots.lock().next_periodic_due = Some(next);

                inner.run_cycle(CycleKind::Periodic).await;
                tokio::time::sleep_until(next).await;
            }
        }));
    }

    /// Requests an out-of-band poll cycle after `delay`.
    ///
    /// The whole check-and-schedule sequence holds the slots lock: the
    /// request is dropped when the periodic run is due no later than
    /// `now + delay`, and no second immediate job is scheduled while one is
    /// pending.
    pub fn request_refresh(&self, delay: Duration) -> RefreshDecision {
        let mut slots = self.inner.slots.lock();
        if slots.state == SchedulerState::Disposed {
            return RefreshDecision::Disposed;
        }
        if slots
            .immediate
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            return RefreshDecision::AlreadyPending;
        }

        let due = Instant::now() + delay;
        if slots
            .next_periodic_due
            .is_some_and(|periodic_due| periodic_due <= due)
        {
            tracing::debug!(?delay, "refresh coalesced into periodic run");
            return RefreshDecision::Coalesced;
        }

        let inner = Arc::clone(&self.inner);
        slots.immediate = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.disposed.load(Ordering::SeqCst) {
                return;
            }
            // No longer "pending" once execution starts.
            inner.slots.lock().immediate = None;
            inner.run_cycle(CycleKind::Immediate).await;
        }));
        if slots.state != SchedulerState::Running {
            slots.state = SchedulerState::ImmediateScheduled;
        }
        tracing::debug!(?delay, "immediate refresh scheduled");
        RefreshDecision::Scheduled
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.slots.lock().state
    }

    /// Cancels the periodic job and any pending immediate job.
    ///
    /// Terminal: after this, `request_refresh` answers
    /// [`RefreshDecision::Disposed`] and `activate` is a no-op. A cycle
    /// already executing runs on but its token is dead, so its results are
    /// discarded.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);

        let mut slots = self.inner.slots.lock();
        if let Some(handle) = slots.periodic.take() {
            handle.abort();
        }
        if let Some(handle) = slots.immediate.take() {
            handle.abort();
        }
        slots.state = SchedulerState::Disposed;
        slots.next_periodic_due = None;
    }
}

impl<J: PollJob> Inner<J> {
    async fn run_cycle(&self, kind: CycleKind) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        let _serialized = self.cycle_lock.lock().await;
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        {
            let mut slots = self.slots.lock();
            if slots.state == SchedulerState::Disposed {
                return;
            }
            slots.state = SchedulerState::Running;
        }

        let token = CycleToken::new(Arc::clone(&self.disposed));
        let outcome = self.job.poll_cycle(kind, token).await;
        match &outcome {
            CycleOutcome::Completed { records, changed } => {
                tracing::debug!(?kind, records, changed, "poll cycle completed");
            }
            CycleOutcome::Offline(reason) => {
                tracing::warn!(?kind, ?reason, "poll cycle failed");
            }
            CycleOutcome::Discarded => {
                tracing::debug!(?kind, "poll cycle discarded");
            }
        }

        let mut slots = self.slots.lock();
        if slots.state == SchedulerState::Disposed {
            return;
        }
        slots.state = if slots
            .immediate
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            SchedulerState::ImmediateScheduled
        } else if slots.periodic.is_some() {
            SchedulerState::PeriodicScheduled
        } else {
            SchedulerState::Idle
        };
    }
}

impl<J: PollJob> std::fmt::Debug for PollScheduler<J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("period", &self.inner.period)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Job that counts runs and tracks concurrent entries.
    struct CountingJob {
        runs: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl CountingJob {
        fn new(delay: Duration) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let runs = Arc::new(AtomicUsize::new(0));
            let max_active = Arc::new(AtomicUsize::new(0));
            let job = Self {
                runs: Arc::clone(&runs),
                active: Arc::new(AtomicUsize::new(0)),
                max_active: Arc::clone(&max_active),
                delay,
            };
            (job, runs, max_active)
        }
    }

    impl PollJob for CountingJob {
        async fn poll_cycle(&self, _kind: CycleKind, _token: CycleToken) -> CycleOutcome {
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.runs.fetch_add(1, Ordering::SeqCst);
            CycleOutcome::Completed {
                records: 0,
                changed: 0,
            }
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn activate_runs_immediately_then_periodically() {
        let (job, runs, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(60));

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.activate();
        assert_eq!(scheduler.state(), SchedulerState::PeriodicScheduled);

        tokio::time::sleep(ms(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_coalesces_when_periodic_is_due_sooner() {
        let (job, runs, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(5));

        scheduler.activate();
        tokio::time::sleep(ms(1)).await;

        // Periodic run due in ~5 s; a refresh asked for in 30 s is covered.
        let decision = scheduler.request_refresh(Duration::from_secs(30));
        assert_eq!(decision, RefreshDecision::Coalesced);

        tokio::time::sleep(Duration::from_secs(6)).await;
        // Initial run plus the one periodic run, no extra job.
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_schedules_when_periodic_is_far_away() {
        let (job, runs, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(60));

        scheduler.activate();
        tokio::time::sleep(ms(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Periodic due in ~60 s; a 5 s refresh runs on its own.
        let decision = scheduler.request_refresh(Duration::from_secs(5));
        assert_eq!(decision, RefreshDecision::Scheduled);
        assert_eq!(scheduler.state(), SchedulerState::ImmediateScheduled);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.state(), SchedulerState::PeriodicScheduled);

        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn second_immediate_request_is_rejected_while_pending() {
        let (job, _, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(600));

        scheduler.activate();
        tokio::time::sleep(ms(1)).await;

        assert_eq!(
            scheduler.request_refresh(Duration::from_secs(50)),
            RefreshDecision::Scheduled
        );
        assert_eq!(
            scheduler.request_refresh(Duration::from_secs(5)),
            RefreshDecision::AlreadyPending
        );

        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_cycles_never_overlap() {
        let (job, runs, max_active) = CountingJob::new(Duration::from_secs(10));
        let scheduler = PollScheduler::new(job, Duration::from_secs(600));

        scheduler.activate();
        tokio::time::sleep(ms(1)).await;

        // The periodic cycle is still running (takes 10 s); request an
        // immediate refresh racing it.
        let decision = scheduler.request_refresh(Duration::ZERO);
        assert_eq!(decision, RefreshDecision::Scheduled);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(max_active.load(Ordering::SeqCst), 1);

        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_cancels_periodic_and_pending_immediate() {
        let (job, runs, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(600));

        scheduler.activate();
        tokio::time::sleep(ms(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert_eq!(
            scheduler.request_refresh(Duration::from_secs(5)),
            RefreshDecision::Scheduled
        );
        scheduler.dispose();
        assert_eq!(scheduler.state(), SchedulerState::Disposed);

        // Neither the pending immediate nor any periodic run fires.
        tokio::time::sleep(Duration::from_secs(700)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert_eq!(
            scheduler.request_refresh(Duration::from_secs(1)),
            RefreshDecision::Disposed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn activate_after_dispose_is_a_no_op() {
        let (job, runs, _) = CountingJob::new(Duration::ZERO);
        let scheduler = PollScheduler::new(job, Duration::from_secs(60));

        scheduler.dispose();
        scheduler.activate();
        assert_eq!(scheduler.state(), SchedulerState::Disposed);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn started_immediate_cycle_runs_to_completion_past_dispose() {
        let (job, runs, _) = CountingJob::new(Duration::from_secs(1));
        let scheduler = PollScheduler::new(job, Duration::from_secs(600));

        scheduler.activate();
        // First periodic cycle runs 0..1 s.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Immediate starts at ~3 s and runs until ~4 s.
        scheduler.request_refresh(Duration::from_secs(1));
        tokio::time::sleep(ms(1500)).await;
        scheduler.dispose();

        tokio::time::sleep(Duration::from_secs(2)).await;
        // The already-started cycle completed; the schedule itself is dead.
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.state(), SchedulerState::Disposed);
    }
}
