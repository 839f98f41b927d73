pub use allocation_splits::AllocationSplit;
pub use budget_items::BudgetItem;
pub use error::EngineError;
pub use grants::{Grant, GrantDraft, GrantStatus};
pub use ops::{
    Engine, EngineBuilder, ResetSummary, SyncError, SyncParams, SyncSummary, TransactionListFilter,
    UpsertOutcome,
};
pub use sync_runs::SyncRunStatus;
pub use transactions::{Transaction, TransactionRecord};

pub mod allocation_splits;
pub mod budget_items;
pub mod grants;
pub mod source;
pub mod sync_runs;
pub mod transactions;

mod error;
mod ops;

type ResultEngine<T> = Result<T, EngineError>;
