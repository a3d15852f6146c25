//! Ticket Chain HTTP server.
//!
//! Usage: `ticket-chain-server [PORT]`

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use ticket_chain_core::{TicketService, metrics::register_metrics};
use ticket_chain_postgres::{Credentials, PostgresDocumentStore};
use ticket_chain_server::{Config, shutdown_signal};
use ticket_chain_web::{AppState, build_router};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticket_chain=debug,sqlx=warn,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ticket Chain server");

    let mut config = Config::from_env().context("Invalid configuration")?;
    config
        .apply_args(std::env::args().skip(1))
        .context("Invalid command-line arguments")?;

    info!(
        bind = %config.bind_address(),
        database = %config.store.layout.database,
        qr_code_encoding = %config.service.qr_code_encoding,
        reset_enabled = config.service.admin_token.is_some(),
        "Configuration loaded"
    );

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    register_metrics();

    let credentials = Credentials::from_file(&config.store.credentials_path).with_context(|| {
        format!(
            "Failed to load credentials from {}",
            config.store.credentials_path.display()
        )
    })?;
    info!(username = %credentials.username(), "Credentials loaded");

    let store = PostgresDocumentStore::connect(&credentials.connection_url(), &config.pool_settings())
        .await
        .context("Failed to connect to the document store")?;
    store
        .migrate()
        .await
        .context("Failed to run document store migrations")?;
    info!("Document store ready");

    let service = TicketService::new(Arc::new(store.clone()), &config.store.layout)
        .with_qr_encoding(config.service.qr_code_encoding)
        .with_operation_timeout(config.operation_timeout());

    let state = AppState::new(Arc::new(service))
        .with_admin_token(config.service.admin_token.clone())
        .with_metrics(prometheus);

    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped, closing store connections");
    if tokio::time::timeout(config.shutdown_timeout(), store.pool().close())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout,
            "Timed out waiting for store connections to close"
        );
    }

    info!("Shutdown complete");
    Ok(())
}
