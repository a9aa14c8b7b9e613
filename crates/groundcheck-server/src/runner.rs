//! Owns at most one active batch run and remembers how the last one ended.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use groundcheck_browser::{JobError, RunContext, RunHandle};
use groundcheck_core::{RunCounts, SheetRange};
use serde::Serialize;
use tokio::sync::Mutex;

pub type JobFuture = BoxFuture<'static, Result<RunCounts, JobError>>;

/// Starts the job for one run. The returned future runs on its own task.
pub type Launcher = Arc<dyn Fn(SheetRange, RunContext) -> JobFuture + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct RunDescription {
    pub sheet_name: String,
    pub start_row: usize,
    pub max_rows: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunEnd {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sheet_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunEnd,
    pub counts: RunCounts,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub active: bool,
    pub cancelling: bool,
    pub sheet_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub counts: RunCounts,
    pub last_result: Option<RunSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("a run on sheet '{sheet_name}' is already active")]
    AlreadyRunning { sheet_name: String },
}

struct ActiveRun {
    description: RunDescription,
    handle: RunHandle,
}

#[derive(Default)]
struct RunnerState {
    active: Option<ActiveRun>,
    last_result: Option<RunSummary>,
}

#[derive(Clone)]
pub struct RunController {
    launcher: Launcher,
    state: Arc<Mutex<RunnerState>>,
}

impl RunController {
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            state: Arc::new(Mutex::new(RunnerState::default())),
        }
    }

    /// Spawns a run over `range`. The slot stays taken until the job task
    /// returns, including after a stop request.
    pub async fn start(&self, range: SheetRange) -> Result<RunDescription, StartError> {
        let mut state = self.state.lock().await;
        if let Some(active) = &state.active {
            return Err(StartError::AlreadyRunning {
                sheet_name: active.description.sheet_name.clone(),
            });
        }

        let (ctx, handle) = RunContext::pair();
        let description = RunDescription {
            sheet_name: range.sheet_name.clone(),
            start_row: range.start_row,
            max_rows: range.max_rows,
            started_at: Utc::now(),
        };
        state.active = Some(ActiveRun {
            description: description.clone(),
            handle: handle.clone(),
        });

        tracing::info!(
            sheet = %description.sheet_name,
            start_row = description.start_row,
            max_rows = description.max_rows,
            "run started"
        );

        let job = (self.launcher)(range, ctx);
        let shared = Arc::clone(&self.state);
        let started = description.clone();
        tokio::spawn(async move {
            let result = job.await;
            let summary = summarize(started, &handle, result);
            tracing::info!(
                status = ?summary.status,
                success = summary.counts.success,
                skipped = summary.counts.skipped,
                failed = summary.counts.failed,
                "run finished"
            );

            let mut state = shared.lock().await;
            state.active = None;
            state.last_result = Some(summary);
        });

        Ok(description)
    }

    /// Requests cancellation of the active run. Returns `false` when idle.
    pub async fn stop(&self) -> bool {
        let state = self.state.lock().await;
        match &state.active {
            Some(active) => {
                active.handle.cancel.cancel();
                tracing::info!(sheet = %active.description.sheet_name, "run stop requested");
                true
            }
            None => false,
        }
    }

    pub async fn status(&self) -> RunStatus {
        let state = self.state.lock().await;
        let last_result = state.last_result.clone();
        match &state.active {
            Some(active) => RunStatus {
                active: true,
                cancelling: active.handle.cancel.is_cancelled(),
                sheet_name: Some(active.description.sheet_name.clone()),
                started_at: Some(active.description.started_at),
                counts: active.handle.counts(),
                last_result,
            },
            None => RunStatus {
                active: false,
                cancelling: false,
                sheet_name: None,
                started_at: None,
                counts: last_result.as_ref().map(|r| r.counts).unwrap_or_default(),
                last_result,
            },
        }
    }
}

fn summarize(
    started: RunDescription,
    handle: &RunHandle,
    result: Result<RunCounts, JobError>,
) -> RunSummary {
    let cancelled = handle.cancel.is_cancelled();
    let (status, counts, error) = match result {
        Ok(counts) if cancelled => (RunEnd::Cancelled, counts, None),
        Ok(counts) => (RunEnd::Completed, counts, None),
        Err(JobError::Cancelled) => (RunEnd::Cancelled, handle.counts(), None),
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            (RunEnd::Failed, handle.counts(), Some(e.to_string()))
        }
    };
    RunSummary {
        sheet_name: started.sheet_name,
        started_at: started.started_at,
        finished_at: Utc::now(),
        status,
        counts,
        error,
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_launchers::{login_timeout, until_cancelled};
    use super::*;

    fn range(sheet: &str) -> SheetRange {
        SheetRange {
            sheet_name: sheet.to_string(),
            start_row: 1,
            max_rows: 10,
        }
    }

    async fn wait_idle(controller: &RunController) -> RunStatus {
        for _ in 0..100 {
            let status = controller.status().await;
            if !status.active {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("run did not finish");
    }

    #[tokio::test]
    async fn second_start_conflicts_while_active() {
        let controller = RunController::new(until_cancelled());

        controller.start(range("A")).await.expect("first start");
        let err = controller.start(range("B")).await.expect_err("conflict");

        assert!(matches!(err, StartError::AlreadyRunning { ref sheet_name } if sheet_name == "A"));
        assert!(controller.stop().await);
        wait_idle(&controller).await;
    }

    #[tokio::test]
    async fn stop_cancels_and_records_the_result() {
        let controller = RunController::new(until_cancelled());
        controller.start(range("A")).await.expect("start");

        let status = controller.status().await;
        assert!(status.active);
        assert!(!status.cancelling);
        assert_eq!(status.sheet_name.as_deref(), Some("A"));

        assert!(controller.stop().await);
        let status = wait_idle(&controller).await;

        let last = status.last_result.expect("last result");
        assert_eq!(last.status, RunEnd::Cancelled);
        assert_eq!(last.counts.success, 1);
        assert_eq!(status.counts.success, 1);
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_no_op() {
        let controller = RunController::new(until_cancelled());
        assert!(!controller.stop().await);
        assert!(controller.status().await.last_result.is_none());
    }

    #[tokio::test]
    async fn job_errors_are_recorded_as_failed() {
        let controller = RunController::new(login_timeout());
        controller.start(range("A")).await.expect("start");

        let status = wait_idle(&controller).await;

        let last = status.last_result.expect("last result");
        assert_eq!(last.status, RunEnd::Failed);
        assert_eq!(last.error.as_deref(), Some("login not detected after 3 checks"));
    }

    #[tokio::test]
    async fn slot_frees_after_a_run_ends() {
        let controller = RunController::new(login_timeout());
        controller.start(range("A")).await.expect("start");
        wait_idle(&controller).await;

        controller.start(range("B")).await.expect("restart after finish");
    }
}
