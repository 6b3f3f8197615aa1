use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "connector",
        "sourceId": state.settings.source_id,
        "cloudApiBaseUrl": state.settings.cloud_api_base_url,
        "timestampUtc": Utc::now(),
    }))
}
