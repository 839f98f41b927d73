//! User-entered budget splits.
//!
//! An `AllocationSplit` assigns part of a transaction's amount to a budget
//! item. It references the transaction through `detail_id` as a plain value:
//! there is no foreign key and no cascade, so the split outlives deletion of
//! the transaction row and reattaches by itself when a row bearing the same
//! `detail_id` is recreated by a later sync.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub id: Uuid,
    /// Weak reference to `transactions.detail_id`. `None` marks an orphan.
    pub detail_id: Option<i64>,
    pub budget_item_id: Uuid,
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "allocation_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub detail_id: Option<i64>,
    pub budget_item_id: String,
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_items::Entity",
        from = "Column::BudgetItemId",
        to = "super::budget_items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BudgetItems,
}

impl Related<super::budget_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AllocationSplit> for ActiveModel {
    fn from(split: &AllocationSplit) -> Self {
        Self {
            id: ActiveValue::Set(split.id.to_string()),
            detail_id: ActiveValue::Set(split.detail_id),
            budget_item_id: ActiveValue::Set(split.budget_item_id.to_string()),
            amount: ActiveValue::Set(split.amount),
            note: ActiveValue::Set(split.note.clone()),
            created_at: ActiveValue::Set(split.created_at),
            updated_at: ActiveValue::Set(split.updated_at),
        }
    }
}

impl TryFrom<Model> for AllocationSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("allocation not exists".to_string()))?,
            detail_id: model.detail_id,
            budget_item_id: Uuid::parse_str(&model.budget_item_id)
                .map_err(|_| EngineError::KeyNotFound("budget item not exists".to_string()))?,
            amount: model.amount,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
