//! Grants: the funding envelopes budget items belong to.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    #[default]
    Active,
    Completed,
    Applied,
    Reported,
}

impl GrantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Applied => "applied",
            Self::Reported => "reported",
        }
    }
}

impl TryFrom<&str> for GrantStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "applied" => Ok(Self::Applied),
            "reported" => Ok(Self::Reported),
            other => Err(EngineError::Validation(format!(
                "invalid grant status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: Uuid,
    pub name: String,
    pub grant_code: Option<String>,
    pub total_amount: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: GrantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a grant.
#[derive(Clone, Debug, Default)]
pub struct GrantDraft {
    pub name: String,
    pub grant_code: Option<String>,
    pub total_amount: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: GrantStatus,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub grant_code: Option<String>,
    pub total_amount: Option<i64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_items::Entity")]
    BudgetItems,
}

impl Related<super::budget_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Grant> for ActiveModel {
    fn from(grant: &Grant) -> Self {
        Self {
            id: ActiveValue::Set(grant.id.to_string()),
            name: ActiveValue::Set(grant.name.clone()),
            grant_code: ActiveValue::Set(grant.grant_code.clone()),
            total_amount: ActiveValue::Set(grant.total_amount),
            start_date: ActiveValue::Set(grant.start_date),
            end_date: ActiveValue::Set(grant.end_date),
            status: ActiveValue::Set(grant.status.as_str().to_string()),
            created_at: ActiveValue::Set(grant.created_at),
            updated_at: ActiveValue::Set(grant.updated_at),
        }
    }
}

impl TryFrom<Model> for Grant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("grant not exists".to_string()))?,
            name: model.name,
            grant_code: model.grant_code,
            total_amount: model.total_amount,
            start_date: model.start_date,
            end_date: model.end_date,
            status: GrantStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            GrantStatus::Active,
            GrantStatus::Completed,
            GrantStatus::Applied,
            GrantStatus::Reported,
        ] {
            assert_eq!(GrantStatus::try_from(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(GrantStatus::try_from("archived").is_err());
    }

    #[test]
    fn corrupt_stored_status_fails_conversion() {
        let model = Model {
            id: Uuid::new_v4().to_string(),
            name: "研究助成".to_string(),
            grant_code: None,
            total_amount: None,
            start_date: None,
            end_date: None,
            status: "archived".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let err = Grant::try_from(model).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
