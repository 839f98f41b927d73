//! Grant and budget-item API endpoints.

use api_types::grant::{
    BudgetItemNew, BudgetItemView, BudgetItemsReorder, BudgetItemsResponse, GrantNew, GrantView,
    GrantsResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{BudgetItem, Grant, GrantDraft};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::GrantStatus) -> api_types::grant::GrantStatus {
    match status {
        engine::GrantStatus::Active => api_types::grant::GrantStatus::Active,
        engine::GrantStatus::Completed => api_types::grant::GrantStatus::Completed,
        engine::GrantStatus::Applied => api_types::grant::GrantStatus::Applied,
        engine::GrantStatus::Reported => api_types::grant::GrantStatus::Reported,
    }
}

fn status_from(status: api_types::grant::GrantStatus) -> engine::GrantStatus {
    match status {
        api_types::grant::GrantStatus::Active => engine::GrantStatus::Active,
        api_types::grant::GrantStatus::Completed => engine::GrantStatus::Completed,
        api_types::grant::GrantStatus::Applied => engine::GrantStatus::Applied,
        api_types::grant::GrantStatus::Reported => engine::GrantStatus::Reported,
    }
}

fn grant_view(grant: Grant) -> GrantView {
    GrantView {
        id: grant.id,
        name: grant.name,
        grant_code: grant.grant_code,
        total_amount: grant.total_amount,
        start_date: grant.start_date,
        end_date: grant.end_date,
        status: status_view(grant.status),
    }
}

fn item_view(item: BudgetItem) -> BudgetItemView {
    BudgetItemView {
        id: item.id,
        grant_id: item.grant_id,
        name: item.name,
        category: item.category,
        budgeted_amount: item.budgeted_amount,
        note: item.note,
        sort_order: item.sort_order,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GrantNew>,
) -> Result<(StatusCode, Json<GrantView>), ServerError> {
    let grant = state
        .engine
        .create_grant(GrantDraft {
            name: payload.name,
            grant_code: payload.grant_code,
            total_amount: payload.total_amount,
            start_date: payload.start_date,
            end_date: payload.end_date,
            status: payload.status.map(status_from).unwrap_or_default(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(grant_view(grant))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<GrantsResponse>, ServerError> {
    let grants = state.engine.list_grants().await?;
    Ok(Json(GrantsResponse {
        grants: grants.into_iter().map(grant_view).collect(),
    }))
}

pub async fn budget_item_new(
    State(state): State<ServerState>,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<BudgetItemNew>,
) -> Result<(StatusCode, Json<BudgetItemView>), ServerError> {
    let item = state
        .engine
        .create_budget_item(
            grant_id,
            &payload.name,
            payload.category.as_deref(),
            payload.budgeted_amount,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item_view(item))))
}

pub async fn budget_items_list(
    State(state): State<ServerState>,
    Path(grant_id): Path<Uuid>,
) -> Result<Json<BudgetItemsResponse>, ServerError> {
    let items = state.engine.list_budget_items(grant_id).await?;
    Ok(Json(BudgetItemsResponse {
        budget_items: items.into_iter().map(item_view).collect(),
    }))
}

pub async fn budget_items_reorder(
    State(state): State<ServerState>,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<BudgetItemsReorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_budget_items(grant_id, &payload.ordered_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
