use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use configs::AppConfig;
use service::{
    category::repo::SeaOrmCategoryRepository,
    cleanup::CleanupQueue,
    media::{local::LocalMediaStore, MediaStore},
    product::repo::SeaOrmProductRepository,
    runtime,
};

use crate::errors::{ErrorRendering, StartupError};
use crate::routes;
use crate::state::{ServerState, UploadSettings};

/// A single configured origin gets credentialed CORS; otherwise anything goes.
pub fn build_cors(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else { return CorsLayer::very_permissive() };
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(value))
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        Err(_) => {
            warn!(%origin, "invalid CORS origin; falling back to permissive CORS");
            CorsLayer::very_permissive()
        }
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(event = "shutdown_signal", signal = "ctrl_c", "shutting down"),
        _ = terminate => info!(event = "shutdown_signal", signal = "sigterm", "shutting down"),
    }
}

/// Serve `app` until `shutdown` resolves, let in-flight requests finish, then
/// wait for the cleanup worker to drain the reclamation backlog.
///
/// `app` must hold the last clones of the cleanup queue, otherwise the worker
/// never stops.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cleanup_worker: JoinHandle<()>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(event = "http_stopped", "connections drained; flushing image cleanup");
    if let Err(e) = cleanup_worker.await {
        warn!(error = %e, "cleanup worker did not finish cleanly");
    }
    info!(event = "cleanup_flushed", "image cleanup queue drained");
    Ok(())
}

/// Public entry: build the app from `cfg` and run the HTTP server until a
/// shutdown signal arrives.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.media)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "database schema up to date");

    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::from_config(&cfg.media));
    let (cleanup, cleanup_worker) = CleanupQueue::spawn(Arc::clone(&media));

    let state = ServerState::new(
        Arc::new(SeaOrmCategoryRepository::new(db.clone())),
        Arc::new(SeaOrmProductRepository::new(db)),
        media,
        cleanup,
        UploadSettings::from_config(&cfg.media),
    )
    .with_error_rendering(ErrorRendering::for_environment(cfg.environment));

    // Build router
    let cors = build_cors(cfg.server.cors_origin.as_deref());
    let app: Router = routes::build_router(state, cors, &cfg.server.api_prefix, &cfg.media.images_dir);

    // Bind and serve
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, environment = ?cfg.environment, api_prefix = %cfg.server.api_prefix, "catalog api listening");
    serve(listener, app, cleanup_worker, shutdown_signal()).await
}
