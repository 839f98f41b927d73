use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod sync {
    use super::*;

    /// Request body for starting a reconciliation run.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncRequest {
        /// Inclusive issue-date range, `YYYY-MM-DD`.
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        /// Company override; the configured default is used when absent.
        pub company_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncResponse {
        pub fetched: u64,
        pub created: u64,
        pub updated: u64,
        pub skipped: u64,
        /// Human-readable descriptions of recoverable failures.
        pub errors: Vec<String>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub account: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub detail_id: i64,
        pub free_deal_id: i64,
        pub date: NaiveDate,
        pub amount: i64,
        pub description: Option<String>,
        pub account: String,
        pub supplier: Option<String>,
        pub memo_tags: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }

    /// Request body for the destructive full wipe.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetRequest {
        pub confirm: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetResponse {
        pub transactions_deleted: u64,
        pub allocations_deleted: u64,
    }
}

pub mod allocation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationNew {
        pub budget_item_id: Uuid,
        pub amount: i64,
        pub detail_id: Option<i64>,
        pub note: Option<String>,
    }

    /// Request body for pointing an existing split at a transaction line.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationRebind {
        pub detail_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationView {
        pub id: Uuid,
        pub detail_id: Option<i64>,
        pub budget_item_id: Uuid,
        pub amount: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationsResponse {
        pub allocations: Vec<AllocationView>,
    }
}

pub mod grant {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GrantStatus {
        #[default]
        Active,
        Completed,
        Applied,
        Reported,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GrantNew {
        pub name: String,
        pub grant_code: Option<String>,
        pub total_amount: Option<i64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub status: Option<GrantStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GrantView {
        pub id: Uuid,
        pub name: String,
        pub grant_code: Option<String>,
        pub total_amount: Option<i64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub status: GrantStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GrantsResponse {
        pub grants: Vec<GrantView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemNew {
        pub name: String,
        pub category: Option<String>,
        pub budgeted_amount: Option<i64>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemView {
        pub id: Uuid,
        pub grant_id: Uuid,
        pub name: String,
        pub category: Option<String>,
        pub budgeted_amount: Option<i64>,
        pub note: Option<String>,
        pub sort_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemsResponse {
        pub budget_items: Vec<BudgetItemView>,
    }

    /// Request body for rewriting a grant's display order in one batch.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemsReorder {
        pub ordered_ids: Vec<Uuid>,
    }
}
