use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, entity::prelude::*};
use uuid::Uuid;

use crate::{
    AllocationSplit, EngineError, ResultEngine, allocation_splits, budget_items, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Records a user split of a transaction's amount onto a budget item.
    ///
    /// `detail_id` is stored as a plain value. Its existence is checked only
    /// here, as a courtesy: a split pointing at a line that later disappears
    /// is kept and reattaches when the line comes back.
    pub async fn create_allocation(
        &self,
        budget_item_id: Uuid,
        amount: i64,
        detail_id: Option<i64>,
        note: Option<&str>,
    ) -> ResultEngine<AllocationSplit> {
        if amount == 0 {
            return Err(EngineError::Validation(
                "allocation amount must not be zero".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let item = budget_items::Entity::find_by_id(budget_item_id.to_string())
                .one(&db_tx)
                .await?;
            if item.is_none() {
                return Err(EngineError::Validation(format!(
                    "budget item {budget_item_id} does not exist"
                )));
            }

            if let Some(detail_id) = detail_id {
                let known = transactions::Entity::find()
                    .filter(transactions::Column::DetailId.eq(detail_id))
                    .one(&db_tx)
                    .await?;
                if known.is_none() {
                    tracing::warn!(detail_id, "allocation created for an unknown detail id");
                }
            }

            let now = Utc::now();
            let split = AllocationSplit {
                id: Uuid::new_v4(),
                detail_id,
                budget_item_id,
                amount,
                note: normalize_optional_text(note),
                created_at: now,
                updated_at: now,
            };
            allocation_splits::ActiveModel::from(&split)
                .insert(&db_tx)
                .await?;
            Ok(split)
        })
    }

    /// Updates an existing split's amount, note and budget item.
    pub async fn update_allocation(
        &self,
        allocation_id: Uuid,
        amount: i64,
        note: Option<&str>,
        budget_item_id: Uuid,
    ) -> ResultEngine<AllocationSplit> {
        if amount == 0 {
            return Err(EngineError::Validation(
                "allocation amount must not be zero".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = allocation_splits::Entity::find_by_id(allocation_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("allocation not exists".to_string()))?;

            let item = budget_items::Entity::find_by_id(budget_item_id.to_string())
                .one(&db_tx)
                .await?;
            if item.is_none() {
                return Err(EngineError::Validation(format!(
                    "budget item {budget_item_id} does not exist"
                )));
            }

            let mut active: allocation_splits::ActiveModel = model.into();
            active.amount = ActiveValue::Set(amount);
            active.note = ActiveValue::Set(normalize_optional_text(note));
            active.budget_item_id = ActiveValue::Set(budget_item_id.to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;
            AllocationSplit::try_from(updated)
        })
    }

    /// Deletes one split.
    pub async fn delete_allocation(&self, allocation_id: Uuid) -> ResultEngine<()> {
        let result = allocation_splits::Entity::delete_by_id(allocation_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("allocation not exists".to_string()));
        }
        Ok(())
    }

    /// Lists splits that point at no line at all (`detail_id IS NULL`).
    pub async fn list_orphaned_allocations(&self) -> ResultEngine<Vec<AllocationSplit>> {
        let rows = allocation_splits::Entity::find()
            .filter(allocation_splits::Column::DetailId.is_null())
            .order_by_desc(allocation_splits::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(AllocationSplit::try_from).collect()
    }

    /// Points a split at a line id, manually.
    ///
    /// Unlike creation this is strict: the target line must exist right now,
    /// otherwise the split keeps its previous `detail_id` untouched.
    pub async fn rebind_allocation(
        &self,
        allocation_id: Uuid,
        detail_id: i64,
    ) -> ResultEngine<AllocationSplit> {
        with_tx!(self, |db_tx| {
            let model = allocation_splits::Entity::find_by_id(allocation_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("allocation not exists".to_string()))?;

            let target = transactions::Entity::find()
                .filter(transactions::Column::DetailId.eq(detail_id))
                .one(&db_tx)
                .await?;
            if target.is_none() {
                return Err(EngineError::KeyNotFound(format!(
                    "no transaction bears detail id {detail_id}"
                )));
            }

            let mut active: allocation_splits::ActiveModel = model.into();
            active.detail_id = ActiveValue::Set(Some(detail_id));
            active.updated_at = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;
            AllocationSplit::try_from(updated)
        })
    }

    /// Lists every split attached to a given line, query-time join by value.
    pub async fn allocations_for_detail(
        &self,
        detail_id: i64,
    ) -> ResultEngine<Vec<AllocationSplit>> {
        let rows = allocation_splits::Entity::find()
            .filter(allocation_splits::Column::DetailId.eq(detail_id))
            .order_by_asc(allocation_splits::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(AllocationSplit::try_from).collect()
    }
}
