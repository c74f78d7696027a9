use agent::{api::app, query::LocalQuery};
use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use util::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let query = LocalQuery::nvidia_smi(Duration::from_secs(config::ssh_session_timeout_secs()));

    let addr: SocketAddr = format!("{}:{}", config::agent_host(), config::agent_port())
        .parse()
        .context("invalid AGENT_HOST/AGENT_PORT")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app(query)).await?;
    Ok(())
}
