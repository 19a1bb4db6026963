use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging() -> Result<WorkerGuard> {
    // stdout carries the outcome token, so diagnostics go to stderr.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let file_appender = tracing_appender::rolling::Builder::new()
        .filename_prefix("confirm-dialog")
        .filename_suffix("log")
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .build(log_directory().context("failed to get log directory")?)
        .context("failed to build the rolling log file appender")?;
    let (non_blocking, appender_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true);

    tracing_subscriber::registry()
        .with(tracing_subscriber::filter::EnvFilter::from_env("CONFIRM_LOG"))
        .with(fmt_layer)
        .with(file_layer)
        .init();
    Ok(appender_guard)
}

fn log_directory() -> Result<std::path::PathBuf> {
    dirs::state_dir().context("failed to get the state dir, please set $XDG_STATE_HOME or $HOME")
}
