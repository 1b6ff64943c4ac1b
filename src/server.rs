use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::database::{SharedStorage, SqliteStorage};
use crate::handlers::{students, system};

/// Build the full router with the storage handle injected into every handler.
pub fn app(storage: SharedStorage, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(student_routes())
        .fallback(system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(Extension(storage)),
        );

    if config.api.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn student_routes() -> Router {
    use axum::routing::post;

    Router::new()
        .route("/students", post(students::create).get(students::list))
        .route(
            "/students/:id",
            get(students::get)
                .patch(students::update)
                .delete(students::delete),
        )
}

/// Open storage, bind, and serve until Ctrl+C or SIGTERM. In-flight
/// requests get `shutdown_timeout_secs` to finish before the server is dropped.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let storage = SqliteStorage::connect(&config).await?;
    info!(
        env = ?config.environment,
        version = env!("CARGO_PKG_VERSION"),
        path = %config.storage_path.display(),
        "Storage initialised"
    );

    let router = app(Arc::new(storage.clone()), &config);

    let listener = TcpListener::bind(config.http_server.address.as_str()).await?;
    info!(address = %listener.local_addr()?, "Server started");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    shutdown_signal().await;
    info!("Shutting down the server");
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(config.http_server.shutdown_timeout_secs);
    if drain(server, grace).await {
        storage.close().await;
    } else {
        // stuck requests may still hold pooled connections; closing would wait on them
        warn!("Skipping database pool close after timed-out shutdown");
    }

    Ok(())
}

/// Wait up to `grace` for the server task to finish. On timeout the task is
/// aborted and `false` is returned.
async fn drain(mut server: JoinHandle<std::io::Result<()>>, grace: Duration) -> bool {
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => {
            info!("Server shutdown successfully");
            true
        }
        Ok(Ok(Err(e))) => {
            error!("Server error during shutdown: {}", e);
            true
        }
        Ok(Err(e)) => {
            error!("Server task failed: {}", e);
            true
        }
        Err(_) => {
            warn!("Failed to shutdown server within {:?}; dropping open connections", grace);
            server.abort();
            false
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
