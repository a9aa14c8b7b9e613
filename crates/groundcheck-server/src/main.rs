mod api;
mod middleware;
mod runner;

use std::sync::Arc;

use futures::FutureExt;
use groundcheck_browser::{
    run_job, AutomationSettings, CdpSessionProvider, Diagnostics, RunContext,
};
use groundcheck_core::{AppConfig, SheetRange};
use groundcheck_sheets::SheetsClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::build_app,
    runner::{JobFuture, Launcher, RunController},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(groundcheck_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let controller = RunController::new(job_launcher(&config)?);
    let app = build_app(controller);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "control surface listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wires the live browser, the sheet reader and the automation settings into
/// a launcher for [`RunController`].
fn job_launcher(config: &AppConfig) -> anyhow::Result<Launcher> {
    let provider = Arc::new(CdpSessionProvider::from_app_config(config)?);
    let source = Arc::new(SheetsClient::from_app_config(config)?);
    let settings = Arc::new(AutomationSettings::from_app_config(config));
    let diagnostics = Arc::new(Diagnostics::new(config.diagnostics_dir.clone()));

    Ok(Arc::new(move |range: SheetRange, ctx: RunContext| -> JobFuture {
        let provider = Arc::clone(&provider);
        let source = Arc::clone(&source);
        let settings = Arc::clone(&settings);
        let diagnostics = Arc::clone(&diagnostics);
        async move {
            run_job(
                provider.as_ref(),
                source.as_ref(),
                &settings,
                &diagnostics,
                &range,
                &ctx,
            )
            .await
        }
        .boxed()
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
