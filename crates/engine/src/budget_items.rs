//! Budget line items belonging to a grant.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: Uuid,
    pub grant_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub budgeted_amount: Option<i64>,
    pub note: Option<String>,
    /// Display position within the grant, managed by the reorder batch.
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub grant_id: String,
    pub name: String,
    pub category: Option<String>,
    pub budgeted_amount: Option<i64>,
    pub note: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grants::Entity",
        from = "Column::GrantId",
        to = "super::grants::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Grants,
    #[sea_orm(has_many = "super::allocation_splits::Entity")]
    AllocationSplits,
}

impl Related<super::grants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grants.def()
    }
}

impl Related<super::allocation_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllocationSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetItem> for ActiveModel {
    fn from(item: &BudgetItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            grant_id: ActiveValue::Set(item.grant_id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            category: ActiveValue::Set(item.category.clone()),
            budgeted_amount: ActiveValue::Set(item.budgeted_amount),
            note: ActiveValue::Set(item.note.clone()),
            sort_order: ActiveValue::Set(item.sort_order),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        }
    }
}

impl TryFrom<Model> for BudgetItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("budget item not exists".to_string()))?,
            grant_id: Uuid::parse_str(&model.grant_id)
                .map_err(|_| EngineError::KeyNotFound("grant not exists".to_string()))?,
            name: model.name,
            category: model.category,
            budgeted_amount: model.budgeted_amount,
            note: model.note,
            sort_order: model.sort_order,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
