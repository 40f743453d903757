mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use axum::Router;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::{io, process, sync::Arc};

use handlers::rest;
use repository::Repository;
use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Any panic, in a request or elsewhere, takes the process down
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Uncaught panic: {info}");
        process::exit(1);
    }));

    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {e}");
        process::exit(1);
    });

    // Repository setup
    let repo = Repository::new(cfg.data_dir.clone());
    repo.ensure_storage().await.unwrap_or_else(|e| {
        tracing::error!("Failed to prepare data directory: {e}");
        process::exit(1);
    });
    tracing::info!("Using data directory {}", repo.data_dir().display());

    // Service creation
    let service = Arc::new(NoteService::new(Arc::new(repo)));

    // Router config
    let mut router = rest::router(service).merge(
        SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
    );

    if let Some(dir) = &cfg.static_dir {
        tracing::info!("Serving client bundle from {}", dir.display());
        router = router.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        );
    } else {
        tracing::info!("No client bundle found, running in API-only mode");
    }

    let router: Router = router.layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            if e.kind() == io::ErrorKind::AddrInUse {
                tracing::error!("Port {} is already in use, application will exit", cfg.port);
            } else {
                tracing::error!("Failed to bind to {addr}: {e}");
            }
            process::exit(1);
        });

    tracing::info!("Notepad server running at http://localhost:{}", cfg.port);

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        process::exit(1);
    }
}
