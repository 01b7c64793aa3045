use std::net::SocketAddr;
use std::sync::Arc;

use scrollstop_db::{FirestoreConfig, FirestoreHistoryStore, HistoryStore, ServiceAccountCredentials};
use scrollstop_openrouter::{CompletionClient, OpenRouterClient, OpenRouterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollstop_api::auth::firebase::FirebaseTokenVerifier;
use scrollstop_api::config::ServerConfig;
use scrollstop_api::router::build_app_router;
use scrollstop_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrollstop_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- History store ---
    let credentials = config.firebase.credentials_b64.as_deref().map(|encoded| {
        ServiceAccountCredentials::from_base64(encoded)
            .expect("FIREBASE_CREDENTIALS_B64 must hold a valid service-account key")
    });

    let history: Option<Arc<dyn HistoryStore>> = match &credentials {
        Some(credentials) => {
            let store_config = FirestoreConfig::resolve(
                config.firebase.project_id.as_deref(),
                config.firebase.firestore_database.as_deref(),
                credentials,
            )
            .expect("Failed to resolve Firestore configuration");
            tracing::info!(
                project_id = %store_config.project_id,
                database = %store_config.database_id,
                "Caption history enabled"
            );
            let store: Arc<dyn HistoryStore> = Arc::new(
                FirestoreHistoryStore::new(credentials.clone(), store_config)
                    .expect("Failed to build Firestore client"),
            );
            Some(store)
        }
        None => {
            tracing::warn!("FIREBASE_CREDENTIALS_B64 not set, caption history disabled");
            None
        }
    };

    // --- Identity ---
    let project_id = config
        .firebase
        .project_id
        .clone()
        .or_else(|| credentials.as_ref().and_then(|c| c.project_id.clone()))
        .expect("FIREBASE_PROJECT_ID or FIREBASE_CREDENTIALS_B64 must be set");
    let verifier =
        FirebaseTokenVerifier::new(project_id).expect("Failed to build token verifier");

    // --- Generation API ---
    let completions: Option<Arc<dyn CompletionClient>> = match &config.openrouter.api_key {
        Some(api_key) => {
            let client = OpenRouterClient::new(OpenRouterConfig {
                api_key: api_key.clone(),
                model: config.openrouter.model.clone(),
                base_url: config.openrouter.base_url.clone(),
                app_url: config.app_url.clone(),
            })
            .expect("Failed to build OpenRouter client");
            tracing::info!(model = %client.model(), "Caption generation enabled");
            let client: Arc<dyn CompletionClient> = Arc::new(client);
            Some(client)
        }
        None => {
            tracing::warn!("OPENROUTER_API_KEY not set, caption generation will fail");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        verifier: Arc::new(verifier),
        completions,
        history,
    };

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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
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
