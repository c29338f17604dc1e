//! TrustFlow authorization gateway HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p trustflow-gateway --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p trustflow-gateway
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p trustflow-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override bind address and port
//! - `RUST_LOG` — Log level filter (default: `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tower_http::cors;
use tracing_subscriber::EnvFilter;

use trustflow::book::BookRepository;
use trustflow::policy::{PolicyRepository, SpendLedger};
use trustflow::resolver::RecipientResolver;
use trustflow_evm::engine::AuthorizationEngine;
use trustflow_evm::resolver::SignedBookResolver;
use trustflow_vault::client::VaultClient;
use trustflow_vault::resolver::VaultRecipientResolver;

use trustflow_gateway::config::{GatewayConfig, ResolverBackend};
use trustflow_gateway::handlers::{AppState, gateway_router};
use trustflow_gateway::storage::{FileBookRepository, FilePolicyStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Gateway failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        executor = %config.policy_executor,
        backend = ?config.resolver.backend,
        "Loaded configuration"
    );

    tokio::fs::create_dir_all(&config.data_dir).await?;

    let books: Arc<dyn BookRepository> = Arc::new(FileBookRepository::new(&config.data_dir));
    let policy_store = Arc::new(FilePolicyStore::new(&config.data_dir));
    let policies: Arc<dyn PolicyRepository> = policy_store.clone();
    let ledger: Arc<dyn SpendLedger> = policy_store;

    let recipients: Arc<dyn RecipientResolver> = match config.resolver.backend {
        ResolverBackend::SignedBook => Arc::new(SignedBookResolver::new(Arc::clone(&books))),
        ResolverBackend::Vault => {
            let vault = config
                .resolver
                .vault
                .clone()
                .ok_or("resolver.backend = \"vault\" requires a [resolver.vault] section")?;
            if vault.nodes.is_empty() {
                return Err("vault backend configured with no nodes".into());
            }
            tracing::info!(
                nodes = vault.nodes.len(),
                consistency = ?vault.consistency(),
                "Using secret-store recipient resolution"
            );
            let client = VaultClient::new(
                vault.nodes.clone(),
                vault.schema_id.clone(),
                vault.agent_id.clone(),
                vault.node_timeout(),
            );
            Arc::new(VaultRecipientResolver::new(client, vault.consistency()))
        }
    };

    let engine = AuthorizationEngine::new(
        recipients,
        Arc::clone(&policies),
        ledger,
        config.policy_executor,
    );
    let state = Arc::new(AppState {
        books,
        policies,
        engine,
    });

    let app = gateway_router(state).layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any),
    );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
