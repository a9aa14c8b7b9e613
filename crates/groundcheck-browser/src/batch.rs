//! Sequential batch loop with cooperative cancellation.

use groundcheck_core::{Outcome, OutcomeStatus, Record, RunCounts};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::processor::ProcessRecord;

/// Per-run state handed to the job task.
///
/// The run is active until `cancel` fires. Counts are published after every
/// record.
#[derive(Debug)]
pub struct RunContext {
    pub cancel: CancellationToken,
    progress: watch::Sender<RunCounts>,
}

/// The observer side of a [`RunContext`].
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub cancel: CancellationToken,
    pub progress: watch::Receiver<RunCounts>,
}

impl RunContext {
    /// A fresh context and the handle that observes it.
    #[must_use]
    pub fn pair() -> (Self, RunHandle) {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(RunCounts::default());
        (
            Self {
                cancel: cancel.clone(),
                progress: tx,
            },
            RunHandle {
                cancel,
                progress: rx,
            },
        )
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn publish(&self, counts: RunCounts) {
        self.progress.send_replace(counts);
    }
}

impl RunHandle {
    #[must_use]
    pub fn counts(&self) -> RunCounts {
        *self.progress.borrow()
    }
}

/// Processes `records` in order until done or cancelled.
///
/// Cancellation is checked before each record; the record in flight always
/// finishes.
pub async fn run_batch<P: ProcessRecord + ?Sized>(
    processor: &P,
    records: &[Record],
    ctx: &RunContext,
) -> RunCounts {
    let mut counts = RunCounts::default();
    tracing::info!(records = records.len(), "batch started");

    for record in records {
        if ctx.is_cancelled() {
            tracing::info!(row = record.row, "batch cancelled before record");
            break;
        }

        let outcome = processor.process(record).await;
        log_outcome(&outcome);
        counts.record(outcome.status);
        ctx.publish(counts);
    }

    tracing::info!(
        success = counts.success,
        skipped = counts.skipped,
        failed = counts.failed,
        total = counts.total(),
        cancelled = ctx.is_cancelled(),
        "batch finished"
    );
    counts
}

fn log_outcome(outcome: &Outcome) {
    match outcome.status {
        OutcomeStatus::Success | OutcomeStatus::Skipped => tracing::info!(
            row = outcome.row,
            record_id = %outcome.record_id,
            status = %outcome.status,
            detail = %outcome.detail,
            "record processed"
        ),
        OutcomeStatus::Failed => tracing::warn!(
            row = outcome.row,
            record_id = %outcome.record_id,
            status = %outcome.status,
            stage = ?outcome.stage,
            detail = %outcome.detail,
            "record failed"
        ),
    }
}
