// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll scheduling.
//!
//! The [`PollScheduler`] drives the authenticate → fetch → diff → notify
//! pipeline: a periodic job at a fixed interval (first run immediate), plus
//! out-of-band refresh requests that are coalesced against the periodic
//! schedule. Two rules hold at all times:
//!
//! - **Coalescing**: an immediate refresh is dropped when the periodic run is
//!   already due no later than the requested time, and at most one immediate
//!   job is pending. The check-and-schedule sequence is a single critical
//!   section, so two immediate jobs can never be scheduled concurrently.
//! - **No overlap**: every cycle, periodic or immediate, runs under one
//!   per-session execution lock, so fetch/diff/notify sequences for the same
//!   session never interleave, and `apply` + `notify` for a device id
//!   happen-before the next cycle's `apply` for that id.
//!
//! Disposal is terminal: pending jobs are cancelled, and a cycle already
//! executing sees its [`CycleToken`] go dead and discards its results.

mod poll_scheduler;

pub use poll_scheduler::PollScheduler;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle state of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet activated.
    Idle,
    /// Periodic job scheduled, nothing running.
    PeriodicScheduled,
    /// An immediate refresh is pending in addition to the periodic job.
    ImmediateScheduled,
    /// A poll cycle is executing.
    Running,
    /// Disposed. Terminal; no further scheduling is accepted.
    Disposed,
}

/// What triggered a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// The fixed-interval schedule.
    Periodic,
    /// An out-of-band refresh request.
    Immediate,
}

/// Why a binding reports offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineReason {
    /// Login attempts exhausted.
    AuthenticationFailed,
    /// The backend was unreachable or rejected the session mid-cycle.
    CommunicationError,
}

/// Result of one poll cycle. Jobs never propagate errors past this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion.
    Completed {
        /// Records fetched across all resource kinds.
        records: usize,
        /// Records that changed and were notified.
        changed: usize,
    },
    /// The cycle failed in a way that degrades the whole binding.
    Offline(OfflineReason),
    /// The session was disposed mid-cycle; results were thrown away.
    Discarded,
}

/// Outcome of an immediate-refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// An immediate job was scheduled.
    Scheduled,
    /// The periodic job is due sooner; the request was dropped.
    Coalesced,
    /// An immediate job is already pending; no second one is scheduled.
    AlreadyPending,
    /// The scheduler is disposed.
    Disposed,
}

/// Liveness flag handed to each poll cycle.
///
/// A job checks the token after every blocking call and discards its results
/// once the token is dead, so a cycle outliving `dispose()` cannot mutate the
/// state store.
#[derive(Debug, Clone)]
pub struct CycleToken {
    disposed: Arc<AtomicBool>,
}

impl CycleToken {
    pub(crate) fn new(disposed: Arc<AtomicBool>) -> Self {
        Self { disposed }
    }

    /// Returns `true` while the owning session is alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.disposed.load(Ordering::SeqCst)
    }
}

/// A unit of work the scheduler drives: one full poll cycle.
///
/// The returned future is `Send` so cycles can run on the scheduler's worker
/// tasks. Implementations catch their own failures and report them through
/// [`CycleOutcome`]; an error escaping a job would break the periodic
/// schedule.
pub trait PollJob: Send + Sync + 'static {
    /// Executes one poll cycle.
    fn poll_cycle(
        &self,
        kind: CycleKind,
        token: CycleToken,
    ) -> impl Future<Output = CycleOutcome> + Send;
}
