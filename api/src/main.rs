use anyhow::Context;
use api::{
    routes::app,
    state::{AppState, poll_interval},
};
use std::{net::SocketAddr, path::Path};
use tracing::info;
use tracing_appender::rolling;
use util::{config, paths};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = paths::ensure_log_dir().context("failed to create log directory")?;
    let _log_guard = init_logging(&log_dir, &config::log_file(), &config::log_level());

    let app_state = AppState::init().context("failed to load collector configuration")?;
    info!(
        hosts = app_state.hosts().len(),
        config = %paths::servers_config_path().display(),
        data_dir = %paths::data_dir().display(),
        "collector configured"
    );

    // Sweep once now, then every POLL_INTERVAL_MINUTES
    let every = poll_interval(config::poll_interval_minutes());
    app_state.poller(every).spawn();

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .context("invalid HOST/PORT")?;

    info!(
        "Starting {} ({}) on http://{}:{}",
        config::project_name(),
        config::env(),
        config::host(),
        config::port()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server crashed")?;

    Ok(())
}

fn init_logging(
    log_dir: &Path,
    log_file: &str,
    log_level: &str,
) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let file_appender = rolling::daily(log_dir, log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(true)
    });

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
