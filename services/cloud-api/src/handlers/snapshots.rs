use crate::error::AppError;
use crate::notify::SnapshotNotifier;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hmac_auth::AuthenticatedSource;
use tracing::{debug, error};
use types::source::path_segment;
use types::Snapshot;

/// `POST /v1/snapshots`
///
/// Runs behind the signature middleware. The snapshot is reported as
/// accepted only after the history append succeeded.
pub async fn ingest_snapshot(
    State(state): State<AppState>,
    source: AuthenticatedSource,
    payload: Result<Json<Snapshot>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(snapshot) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    // 1. Body must describe the authenticated source
    snapshot.check_source(source.source_id())?;

    // 2. Durable history first
    state.history.append(&snapshot).await.map_err(|e| {
        error!(source_id = %snapshot.source_id, error = %e, "Failed to persist snapshot history");
        AppError::Persistence(e)
    })?;

    // 3. Latest view, then best-effort push
    let summary = snapshot.summary();
    state.store.upsert(snapshot);
    state.notifier.notify(&summary.source_id, summary.timestamp_utc);

    debug!(
        source_id = %summary.source_id,
        timestamp_utc = %summary.timestamp_utc,
        "Snapshot accepted"
    );

    let location = format!("/v1/sources/{}/latest", path_segment(&summary.source_id));
    Ok((StatusCode::ACCEPTED, [(header::LOCATION, location)], Json(summary)))
}
