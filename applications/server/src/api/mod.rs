/// API route modules
pub mod health;
pub mod mode;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full router
pub fn create_router(app_state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/v1", get(mode::set_mode))
        .route("/v1/state", get(mode::get_state));

    Router::new()
        .nest("/api", routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
