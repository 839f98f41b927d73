//! Sync API endpoint.

use std::sync::atomic::Ordering;

use api_types::sync::{SyncRequest, SyncResponse};
use axum::{Json, extract::State};
use engine::SyncParams;

use crate::{ServerError, server::ServerState};

pub async fn run(
    State(state): State<ServerState>,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, ServerError> {
    if state.sync_running.swap(true, Ordering::SeqCst) {
        return Err(ServerError::SyncInProgress);
    }

    let mut params = SyncParams::new(payload.start_date, payload.end_date);
    params.company_id = payload.company_id.or(state.credential.company_id);

    let result = state
        .engine
        .run_sync(
            state.source.as_ref(),
            &state.credential.access_token,
            &params,
        )
        .await;
    state.sync_running.store(false, Ordering::SeqCst);

    let summary = result?;
    Ok(Json(SyncResponse {
        fetched: summary.fetched,
        created: summary.created,
        updated: summary.updated,
        skipped: summary.skipped,
        errors: summary.errors.iter().map(ToString::to_string).collect(),
    }))
}
