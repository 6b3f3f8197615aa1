use crate::handlers::{health, ingest};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use hmac_auth::require_signature;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let signed_routes = Router::new()
        .route("/ingest/snapshot", post(ingest::ingest_snapshot))
        .route_layer(middleware::from_fn_with_state(
            state.signature.clone(),
            require_signature,
        ))
        .layer(DefaultBodyLimit::max(state.signature.max_body_bytes()));

    Router::new()
        .route("/health", get(health::health))
        .merge(signed_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
