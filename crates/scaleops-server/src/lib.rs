pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::open(root)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        // Analysis
        .route("/api/analysis", post(routes::analysis::analyze))
        // Workspace mirror
        .route("/api/workspace/save", post(routes::workspace::save))
        .route("/api/workspace/load/{id}", get(routes::workspace::load))
        // Items
        .route("/api/items", get(routes::items::list_items))
        .route("/api/items/{id}/history", get(routes::items::history))
        .route(
            "/api/items/{id}/export/{format}",
            get(routes::items::export),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

/// Start the workspace backend on `0.0.0.0:{port}`.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(root, listener).await
}

/// Start the backend on a pre-bound listener.
///
/// The caller can read the actual port before starting, which matters when
/// `port = 0` and the OS picks a free one.
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;

    tracing::info!("ScaleOps backend listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
