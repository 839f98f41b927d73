use chrono::{NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, entity::prelude::*};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionRecord, allocation_splits, transactions,
};

use super::{Engine, with_tx};

/// Result of upserting one fetched accounting line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The stored row already matches the fetched line.
    Unchanged,
}

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive issue dates.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Exact match on the resolved account name.
    pub account: Option<String>,
}

/// Row counts removed by [`Engine::reset_all_transactions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub transactions_deleted: u64,
    pub allocations_deleted: u64,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Inserts or refreshes the row keyed by the record's `detail_id`.
    ///
    /// A row that already matches after normalization is left untouched so a
    /// re-run over the same period is a no-op.
    pub async fn upsert_transaction(
        &self,
        record: &TransactionRecord,
    ) -> ResultEngine<UpsertOutcome> {
        with_tx!(self, |db_tx| {
            let existing = transactions::Entity::find()
                .filter(transactions::Column::DetailId.eq(record.detail_id))
                .one(&db_tx)
                .await?;

            let now = Utc::now();
            match existing {
                None => {
                    record.insert(now).insert(&db_tx).await?;
                    Ok(UpsertOutcome::Created)
                }
                Some(model) if record.differs_from(&model) => {
                    record.overwrite(model.id, now).update(&db_tx).await?;
                    Ok(UpsertOutcome::Updated)
                }
                Some(_) => Ok(UpsertOutcome::Unchanged),
            }
        })
    }

    /// Looks a transaction up by its stable external line id.
    pub async fn find_transaction_by_detail_id(
        &self,
        detail_id: i64,
    ) -> ResultEngine<Option<Transaction>> {
        let model = transactions::Entity::find()
            .filter(transactions::Column::DetailId.eq(detail_id))
            .one(&self.database)
            .await?;
        model.map(Transaction::try_from).transpose()
    }

    /// Lists transactions newest first, `(date DESC, detail_id DESC)`.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::DetailId);
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::Date.lte(to));
        }
        if let Some(account) = &filter.account {
            query = query.filter(transactions::Column::Account.eq(account.clone()));
        }

        let rows = query.all(&self.database).await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Deletes every synced transaction and every allocation split.
    ///
    /// This is the destructive path used before a full re-import; it requires
    /// an explicit `confirm` so a bare call cannot wipe user allocations.
    pub async fn reset_all_transactions(&self, confirm: bool) -> ResultEngine<ResetSummary> {
        if !confirm {
            return Err(EngineError::Validation(
                "reset requires explicit confirmation".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let allocations = allocation_splits::Entity::delete_many()
                .exec(&db_tx)
                .await?;
            let transactions = transactions::Entity::delete_many().exec(&db_tx).await?;
            Ok(ResetSummary {
                transactions_deleted: transactions.rows_affected,
                allocations_deleted: allocations.rows_affected,
            })
        })
    }
}
