use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contacthub_api::background::state_purge;
use contacthub_api::config::ServerConfig;
use contacthub_api::router::build_app_router;
use contacthub_api::state::AppState;
use contacthub_core::store::{ExpiringStore, MemoryStore};
use contacthub_crm::{ConstantContactApi, OAuthClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "contacthub_api=debug,contacthub_crm=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        crm_api_url = %config.crm.api_url,
        partial_address_policy = ?config.partial_address_policy,
        "Loaded server configuration"
    );

    // --- Upstream CRM clients ---
    let http_timeout = Duration::from_secs(config.crm.http_timeout_secs);
    let crm = ConstantContactApi::new(config.crm.api_url.clone(), http_timeout)
        .expect("Failed to build CRM HTTP client");
    let oauth = OAuthClient::new(config.crm.oauth.clone(), http_timeout)
        .expect("Failed to build OAuth client");

    // --- OAuth state store ---
    let oauth_states: Arc<dyn ExpiringStore> = Arc::new(MemoryStore::new());

    let purge_cancel = tokio_util::sync::CancellationToken::new();
    let purge_handle = tokio::spawn(state_purge::run(
        Arc::clone(&oauth_states),
        state_purge::PURGE_INTERVAL,
        purge_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        crm: Arc::new(crm),
        oauth: Arc::new(oauth),
        oauth_states,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    purge_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), purge_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
