use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hmac_auth::AuthenticatedSource;
use tracing::info;
use types::source::path_segment;
use types::Snapshot;

/// `POST /ingest/snapshot`
///
/// Validated with the inbound secrets, then re-signed with the outbound
/// secrets and relayed to the cloud tier.
pub async fn ingest_snapshot(
    State(state): State<AppState>,
    source: AuthenticatedSource,
    payload: Result<Json<Snapshot>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(snapshot) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    snapshot.check_source(source.source_id())?;

    let result = state.forwarder.forward(&snapshot).await;
    if !result.is_accepted() {
        return Err(AppError::from_forward(result));
    }

    info!(source_id = %snapshot.source_id, "Snapshot relayed to cloud API");
    let location = format!("/ingest/snapshot/{}", path_segment(&snapshot.source_id));
    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, location)],
        Json(snapshot.summary()),
    ))
}
