use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outermost, so the trace span can see the request id.
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies/:id", get(handlers::get_movie))
        .route("/suggestion/:id", get(handlers::get_suggestions_for_movie))
        .route(
            "/suggestion/user/:id",
            get(handlers::get_suggestions_for_movie_and_user),
        )
}
