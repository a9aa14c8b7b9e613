//! One run end to end: attach, wait for login, read records, process them.

use groundcheck_core::{RecordSource, RunCounts, SheetRange};
use thiserror::Error;

use crate::batch::{run_batch, RunContext};
use crate::diagnostics::Diagnostics;
use crate::error::SessionError;
use crate::login::wait_for_login;
use crate::processor::RecordProcessor;
use crate::session::{Session, SessionProvider};
use crate::settings::AutomationSettings;

/// Faults that abort a run before any record is processed.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("login not detected after {ticks} checks")]
    LoginTimeout { ticks: u32 },

    #[error("run cancelled before processing started")]
    Cancelled,

    #[error("failed to read records: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Runs one batch over the records selected by `range`.
///
/// The session is always released at the end, leaving the browser open.
pub async fn run_job<P, R>(
    provider: &P,
    source: &R,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
    range: &SheetRange,
    ctx: &RunContext,
) -> Result<RunCounts, JobError>
where
    P: SessionProvider + ?Sized,
    R: RecordSource + ?Sized,
{
    let session = provider.acquire().await?;
    tracing::info!(sheet = %range.sheet_name, start_row = range.start_row, max_rows = range.max_rows, "browser session attached");

    let result = run_attached(&session, source, settings, diagnostics, range, ctx).await;
    release(&session).await;
    result
}

async fn run_attached<S, R>(
    session: &S,
    source: &R,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
    range: &SheetRange,
    ctx: &RunContext,
) -> Result<RunCounts, JobError>
where
    S: Session + ?Sized,
    R: RecordSource + ?Sized,
{
    let ticks = settings.login_timeout_ticks;
    let logged_in = tokio::select! {
        biased;
        () = ctx.cancel.cancelled() => return Err(JobError::Cancelled),
        detected = wait_for_login(session, settings, diagnostics, ticks) => detected,
    };
    if !logged_in {
        return Err(JobError::LoginTimeout { ticks });
    }

    let records = source
        .read_records(range)
        .await
        .map_err(|e| JobError::Source(Box::new(e)))?;
    tracing::info!(records = records.len(), sheet = %range.sheet_name, "records loaded");

    let processor = RecordProcessor::new(session, settings, diagnostics);
    Ok(run_batch(&processor, &records, ctx).await)
}

/// Attaches and waits for login only. Returns whether login was detected.
pub async fn check_login<P: SessionProvider + ?Sized>(
    provider: &P,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
) -> Result<bool, SessionError> {
    let session = provider.acquire().await?;
    let detected = wait_for_login(&session, settings, diagnostics, settings.login_timeout_ticks).await;
    release(&session).await;
    Ok(detected)
}

async fn release<S: Session + ?Sized>(session: &S) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to release browser session");
    }
}

#[cfg(test)]
#[path = "job_test.rs"]
mod tests;
