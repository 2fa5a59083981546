use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::ExportSnapshot;
use crate::storage::write_export;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Also write the snapshot to the exports directory
    #[serde(default)]
    pub save: bool,
}

/// Full snapshot of the race, in the same format `import` reads.
pub async fn export_snapshot(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Json<ExportSnapshot>, ApiError> {
    let snapshot = state.tracker.read().await.snapshot(Utc::now());

    if params.save {
        write_export(&state.storage, &snapshot)?;
    }

    Ok(Json(snapshot))
}
