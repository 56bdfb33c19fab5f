//! docgate: HTTP gateway for get/set/del requests against a document store.
//!
//! - `docgate [flags]`: connect to the store, then serve until Ctrl-C
//! - `docgate print-config`: print a commented default `docgate.toml`

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use docgate_executor::Executor;
use docgate_server::commands::{build_cli, config_from_matches};
use docgate_server::{Gateway, GatewayConfig};
use docgate_storage::{connector_for_url, RetryPolicy, StoreConnection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    if matches.subcommand_name() == Some("print-config") {
        print!("{}", GatewayConfig::default_toml());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_from_matches(&matches).context("loading configuration")?;

    let connector = connector_for_url(&config.store_url)
        .with_context(|| format!("store url {:?}", config.store_url))?;
    let connection = Arc::new(StoreConnection::new(
        connector,
        RetryPolicy::with_backoff(config.retry_backoff()),
    ));
    if !connection.connect().await {
        warn!("Serving without a store; every operation will be refused");
    }

    let executor = Arc::new(Executor::new(connection, config.default_collection.clone()));
    let gateway = Arc::new(Gateway::new(executor, config.max_body_bytes));

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(
        listen = %listener.local_addr()?,
        store = %config.store_url,
        collection = %config.default_collection,
        "Gateway listening"
    );

    gateway
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Gateway stopped");
    Ok(())
}
