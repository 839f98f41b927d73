use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, entity::prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetItem, EngineError, Grant, GrantDraft, ResultEngine, budget_items, grants,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    pub async fn create_grant(&self, draft: GrantDraft) -> ResultEngine<Grant> {
        let name = normalize_required_name(&draft.name, "grant")?;
        if let (Some(start), Some(end)) = (draft.start_date, draft.end_date)
            && start > end
        {
            return Err(EngineError::Validation(
                "grant start date must be <= end date".to_string(),
            ));
        }

        let now = Utc::now();
        let grant = Grant {
            id: Uuid::new_v4(),
            name,
            grant_code: normalize_optional_text(draft.grant_code.as_deref()),
            total_amount: draft.total_amount,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        grants::ActiveModel::from(&grant).insert(&self.database).await?;
        Ok(grant)
    }

    /// Lists grants, most recently created first.
    pub async fn list_grants(&self) -> ResultEngine<Vec<Grant>> {
        let rows = grants::Entity::find()
            .order_by_desc(grants::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(Grant::try_from).collect()
    }

    /// Appends a budget item at the end of the grant's display order.
    pub async fn create_budget_item(
        &self,
        grant_id: Uuid,
        name: &str,
        category: Option<&str>,
        budgeted_amount: Option<i64>,
        note: Option<&str>,
    ) -> ResultEngine<BudgetItem> {
        let name = normalize_required_name(name, "budget item")?;

        with_tx!(self, |db_tx| {
            grants::Entity::find_by_id(grant_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("grant not exists".to_string()))?;

            let last: Option<i32> = budget_items::Entity::find()
                .filter(budget_items::Column::GrantId.eq(grant_id.to_string()))
                .select_only()
                .column(budget_items::Column::SortOrder)
                .order_by_desc(budget_items::Column::SortOrder)
                .limit(1)
                .into_tuple()
                .one(&db_tx)
                .await?;

            let now = Utc::now();
            let item = BudgetItem {
                id: Uuid::new_v4(),
                grant_id,
                name,
                category: normalize_optional_text(category),
                budgeted_amount,
                note: normalize_optional_text(note),
                sort_order: last.map_or(0, |n| n + 1),
                created_at: now,
                updated_at: now,
            };
            budget_items::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        })
    }

    /// Lists a grant's budget items in display order.
    pub async fn list_budget_items(&self, grant_id: Uuid) -> ResultEngine<Vec<BudgetItem>> {
        let rows = budget_items::Entity::find()
            .filter(budget_items::Column::GrantId.eq(grant_id.to_string()))
            .order_by_asc(budget_items::Column::SortOrder)
            .order_by_asc(budget_items::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(BudgetItem::try_from).collect()
    }

    /// Rewrites the display order of a grant's budget items as one batch.
    ///
    /// `ordered_ids` must name every item of the grant exactly once; the
    /// whole batch commits or nothing does.
    pub async fn reorder_budget_items(
        &self,
        grant_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let existing = budget_items::Entity::find()
                .filter(budget_items::Column::GrantId.eq(grant_id.to_string()))
                .all(&db_tx)
                .await?;
            if existing.len() != ordered_ids.len() {
                return Err(EngineError::Validation(format!(
                    "reorder must list all {} items of the grant",
                    existing.len()
                )));
            }

            let now = Utc::now();
            for (position, id) in ordered_ids.iter().enumerate() {
                let model = existing
                    .iter()
                    .find(|m| m.id == id.to_string())
                    .ok_or_else(|| {
                        EngineError::Validation(format!(
                            "budget item {id} does not belong to grant {grant_id}"
                        ))
                    })?;
                let mut active: budget_items::ActiveModel = model.clone().into();
                active.sort_order = ActiveValue::Set(i32::try_from(position).map_err(|_| {
                    EngineError::Validation("too many budget items to reorder".to_string())
                })?);
                active.updated_at = ActiveValue::Set(now);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }
}
