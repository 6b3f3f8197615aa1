use crate::handlers::{health, snapshots, sources, ws};
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
        .route("/snapshots", post(snapshots::ingest_snapshot))
        .route_layer(middleware::from_fn_with_state(
            state.signature.clone(),
            require_signature,
        ))
        .layer(DefaultBodyLimit::max(state.signature.max_body_bytes()));

    let api_routes = Router::new()
        .route("/sources", get(sources::list_sources))
        .route("/sources/{source_id}/latest", get(sources::get_latest))
        .route("/sources/{source_id}/history", get(sources::get_history))
        .route("/ws", get(ws::ws_handler))
        .merge(signed_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
