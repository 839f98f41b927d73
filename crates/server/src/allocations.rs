//! Allocation API endpoints.

use api_types::allocation::{AllocationNew, AllocationRebind, AllocationView, AllocationsResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::AllocationSplit;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(split: AllocationSplit) -> AllocationView {
    AllocationView {
        id: split.id,
        detail_id: split.detail_id,
        budget_item_id: split.budget_item_id,
        amount: split.amount,
        note: split.note,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AllocationNew>,
) -> Result<(StatusCode, Json<AllocationView>), ServerError> {
    let split = state
        .engine
        .create_allocation(
            payload.budget_item_id,
            payload.amount,
            payload.detail_id,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(split))))
}

pub async fn list_orphaned(
    State(state): State<ServerState>,
) -> Result<Json<AllocationsResponse>, ServerError> {
    let orphans = state.engine.list_orphaned_allocations().await?;
    Ok(Json(AllocationsResponse {
        allocations: orphans.into_iter().map(view).collect(),
    }))
}

pub async fn rebind(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AllocationRebind>,
) -> Result<Json<AllocationView>, ServerError> {
    let split = state.engine.rebind_allocation(id, payload.detail_id).await?;
    Ok(Json(view(split)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_allocation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
