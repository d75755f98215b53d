//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::logging_middleware;

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let scan = Router::new()
        .route("/transaction", post(handlers::scan_transaction))
        .route("/content", post(handlers::scan_content))
        .route("/email", post(handlers::scan_email))
        .route("/activity", post(handlers::scan_activity));

    let threat_intel = Router::new()
        .route("/check-address/:address", get(handlers::check_address))
        .route("/report-threat", post(handlers::report_threat))
        .route("/threats", get(handlers::list_threats))
        .route("/stats", get(handlers::threat_stats));

    let samples = Router::new()
        .route(
            "/email",
            post(handlers::add_email_sample)
                .get(handlers::list_email_samples)
                .delete(handlers::clear_email_samples),
        )
        .route(
            "/transaction",
            post(handlers::add_transaction_sample)
                .get(handlers::list_transaction_samples)
                .delete(handlers::clear_transaction_samples),
        )
        .route("/stats", get(handlers::sample_stats));

    let auth = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/preferences", put(handlers::update_preferences));

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .nest("/scan", scan)
        .nest("/threat-intel", threat_intel)
        .nest("/samples", samples)
        .nest("/auth", auth);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
}
