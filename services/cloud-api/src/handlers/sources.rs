use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use types::{Snapshot, SourceSummary};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub take: Option<i64>,
}

/// `GET /v1/sources`
pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceSummary>> {
    Json(state.store.list_sources())
}

/// `GET /v1/sources/{source_id}/latest`
pub async fn get_latest(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<Snapshot>, AppError> {
    state
        .store
        .get_latest(&source_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No snapshot for source {}", source_id)))
}

/// `GET /v1/sources/{source_id}/history?take=N`
pub async fn get_history(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Snapshot>>, AppError> {
    let snapshots = state.history.query(&source_id, params.take).await?;
    Ok(Json(snapshots))
}
