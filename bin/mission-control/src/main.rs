//! Entrypoint.

use clap::Parser;
use config::Opts;
use dotenvy::dotenv;
use eyre::WrapErr;
use runtime::shutdown::{ShutdownSignal, run_until_shutdown};
use targets::{CheckContext, Scheduler, Targets};
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Validator mission control starting...");

    let targets = Targets::from_opts(&opts).wrap_err("invalid target configuration")?;
    let ctx = CheckContext::from_opts(opts)?;
    info!(
        windows = ?ctx.windows.times().map(|t| t.to_string()),
        policy = ?ctx.policy(),
        "alert windows configured"
    );
    if targets.is_empty() {
        warn!("no targets selected, nothing to do");
        return Ok(());
    }

    let mut scheduler = Scheduler::new(ctx);
    scheduler.spawn_all(&targets);

    let shutdown = ShutdownSignal::new().wrap_err("failed to install signal handlers")?;
    let finished = run_until_shutdown(scheduler.run(), shutdown, || {
        info!("Shutdown signal received, stopping targets");
    })
    .await;
    if finished.is_some() {
        warn!("all target tasks ended");
    }
    scheduler.shutdown().await;

    info!("Validator mission control stopped");
    Ok(())
}
