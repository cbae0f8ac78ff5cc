use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use people_service::config::Config;
use people_service::db::Database;
use people_service::db_storage::PersonStorage;
use people_service::enrichment::PeopleService;
use people_service::handlers::{self, AppState};
use people_service::obs;
use people_service::services::{age_client, gender_client, nationality_client};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Configuration loading.
/// - Logging and tracing.
/// - Database connection.
/// - Enrichment service clients.
/// - HTTP routes and middleware.
///
/// It then serves until SIGINT/SIGTERM and shuts down gracefully.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    obs::init_tracing(&config.env);
    config.log_summary();

    tracing::debug!("init database");
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let http = reqwest::Client::new();
    let people = PeopleService::new(
        Arc::new(PersonStorage::new(db.pool.clone())),
        Arc::new(age_client(http.clone(), config.age_service_url.clone())),
        Arc::new(gender_client(http.clone(), config.gender_service_url.clone())),
        Arc::new(nationality_client(http, config.nationality_service_url.clone())),
    );
    tracing::info!("Enrichment clients initialized");

    let shutdown = CancellationToken::new();
    let app_state = Arc::new(AppState {
        people,
        shutdown: shutdown.clone(),
        request_timeout: config.request_timeout,
    });

    let app = handlers::app(app_state, config.http_timeout);

    let listener = tokio::net::TcpListener::bind(&config.http_address).await?;
    tracing::info!("Server listening on {}", config.http_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    db.close().await;
    tracing::info!("server stopped");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM and cancels every in-flight request.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("stopping server");
    shutdown.cancel();
}
