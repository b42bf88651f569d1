use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/movies", get(handlers::list_movies))
        // Text endpoints outside /api
        .route("/emotion", post(handlers::emotion))
        .route("/recommend", post(handlers::recommend_for_text))
        .route("/recommendy", post(handlers::recommend_for_text_and_genre))
        .nest("/api", api_routes())
        .with_state(state)
        // Outermost first: the request id must exist before the trace span is made
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/genres", get(handlers::list_genres))
        .route("/emotion", post(handlers::detect_emotion))
        .route("/recommend", get(handlers::recommend_by_genre))
}
