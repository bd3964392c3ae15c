use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use engine::PairsAnalyzer;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: PairsAnalyzer,
}

/// Builds the application router with CORS and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/summary",
            get(handlers::get_summary).post(handlers::post_summary),
        )
        .route("/api/excel", post(handlers::post_export))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
}

/// Binds `addr` and serves the API until the process stops.
pub async fn run_server(addr: SocketAddr, analyzer: PairsAnalyzer) -> anyhow::Result<()> {
    let app = build_router(Arc::new(AppState { analyzer }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
