use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

use crate::handlers::upload::upload_handler;
use crate::state::AppState;

/// Build the application router.
///
/// - `POST /upload`: multipart photo upload, returns the generated article, alt text and CSS
/// - `GET /uploads/{filename}`: previously uploaded photos, served verbatim
/// - `GET /src/newsified.css`: the shared stylesheet from the most recent upload
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route_service("/src/newsified.css", ServeFile::new(&config.stylesheet_path))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let bind_address = state.config.bind_address.clone();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
