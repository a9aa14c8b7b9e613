//! Foreground runs against the operator's browser.

use groundcheck_browser::{
    check_login, run_job, AutomationSettings, CdpSessionProvider, Diagnostics, RunContext,
};
use groundcheck_core::{AppConfig, RunCounts, SheetRange};
use groundcheck_sheets::SheetsClient;

/// Runs one batch in the foreground. The first ctrl-c stops the batch after
/// the record in flight.
///
/// # Errors
///
/// Returns an error if the browser cannot be attached, login is not detected
/// in time, or the sheet cannot be read.
pub(crate) async fn run_batch(config: &AppConfig, range: SheetRange) -> anyhow::Result<()> {
    let provider = CdpSessionProvider::from_app_config(config)?;
    let source = SheetsClient::from_app_config(config)?;
    let settings = AutomationSettings::from_app_config(config);
    let diagnostics = Diagnostics::new(config.diagnostics_dir.clone());

    let (ctx, handle) = RunContext::pair();
    let cancel = handle.cancel.clone();
    let stopper = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("stopping after the current record...");
            cancel.cancel();
        }
    });

    let result = run_job(&provider, &source, &settings, &diagnostics, &range, &ctx).await;
    stopper.abort();

    let counts = result?;
    println!("{}", summary_line(&counts, ctx.is_cancelled()));
    Ok(())
}

/// Attaches, waits for the operator to log in, then detaches.
///
/// # Errors
///
/// Returns an error if the browser cannot be attached or login is not
/// detected within the configured number of checks.
pub(crate) async fn run_check_login(config: &AppConfig) -> anyhow::Result<()> {
    let provider = CdpSessionProvider::from_app_config(config)?;
    let settings = AutomationSettings::from_app_config(config);
    let diagnostics = Diagnostics::new(config.diagnostics_dir.clone());

    if check_login(&provider, &settings, &diagnostics).await? {
        println!("login detected on {}", settings.target_url);
        Ok(())
    } else {
        anyhow::bail!(
            "login not detected after {} checks",
            settings.login_timeout_ticks
        )
    }
}

pub(crate) fn summary_line(counts: &RunCounts, cancelled: bool) -> String {
    let prefix = if cancelled { "stopped" } else { "done" };
    format!(
        "{prefix}: {} processed, {} success, {} skipped, {} failed",
        counts.total(),
        counts.success,
        counts.skipped,
        counts.failed
    )
}
