//! Transaction API endpoints.

use api_types::transaction::{
    ResetRequest, ResetResponse, TransactionListQuery, TransactionView, TransactionsResponse,
};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::{Transaction, TransactionListFilter};

use crate::{ServerError, server::ServerState};

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        detail_id: tx.detail_id,
        free_deal_id: tx.free_deal_id,
        date: tx.date,
        amount: tx.amount,
        description: tx.description,
        account: tx.account,
        supplier: tx.supplier,
        memo_tags: tx.memo_tags,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let filter = TransactionListFilter {
        from: query.from,
        to: query.to,
        account: query.account,
    };
    let transactions = state.engine.list_transactions(&filter).await?;
    Ok(Json(TransactionsResponse {
        transactions: transactions.into_iter().map(view).collect(),
    }))
}

pub async fn reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, ServerError> {
    let summary = state.engine.reset_all_transactions(payload.confirm).await?;
    Ok(Json(ResetResponse {
        transactions_deleted: summary.transactions_deleted,
        allocations_deleted: summary.allocations_deleted,
    }))
}
