//! Locally stored transaction lines.
//!
//! A `Transaction` mirrors one detail line of an external deal. The row is
//! keyed for reconciliation by `detail_id`, the stable line identifier
//! assigned by the external system; the local `id` is a storage surrogate
//! and is never used to match anything.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A synchronized transaction line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Local surrogate identifier, generated once at insert.
    pub id: Uuid,
    /// Stable external line identifier. At most one row per value.
    pub detail_id: i64,
    /// Parent deal identifier (one deal may own several lines).
    pub free_deal_id: i64,
    /// Legacy cross-reference keys, not used for reconciliation.
    pub journal_number: i64,
    pub journal_line_number: i32,
    pub date: NaiveDate,
    pub amount: i64,
    pub description: Option<String>,
    /// Resolved account display name.
    pub account: String,
    pub supplier: Option<String>,
    pub memo_tags: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// The fields the sync run derives from one external detail line.
///
/// An upsert overwrites every stored field with these values, except
/// `detail_id` which identifies the row being overwritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub detail_id: i64,
    pub free_deal_id: i64,
    pub journal_number: i64,
    pub journal_line_number: i32,
    pub date: NaiveDate,
    pub amount: i64,
    pub description: Option<String>,
    pub account: String,
    pub supplier: Option<String>,
    pub memo_tags: Option<String>,
}

fn normalized(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or("")
}

impl TransactionRecord {
    /// Whether the stored row differs from this record in any synchronized
    /// field. Text fields are compared trimmed, with missing values equal to
    /// the empty string, so a re-fetch of identical upstream data never
    /// counts as an update.
    pub fn differs_from(&self, model: &Model) -> bool {
        self.free_deal_id != model.free_deal_id
            || self.journal_number != model.journal_number
            || self.journal_line_number != model.journal_line_number
            || self.date != model.date
            || self.amount != model.amount
            || normalized(self.description.as_deref()) != normalized(model.description.as_deref())
            || self.account.trim() != model.account.trim()
            || normalized(self.supplier.as_deref()) != normalized(model.supplier.as_deref())
            || normalized(self.memo_tags.as_deref()) != normalized(model.memo_tags.as_deref())
    }

    /// Active model overwriting an existing row. `detail_id` stays untouched.
    pub(crate) fn overwrite(&self, local_id: String, now: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(local_id),
            detail_id: ActiveValue::NotSet,
            free_deal_id: ActiveValue::Set(self.free_deal_id),
            journal_number: ActiveValue::Set(self.journal_number),
            journal_line_number: ActiveValue::Set(self.journal_line_number),
            date: ActiveValue::Set(self.date),
            amount: ActiveValue::Set(self.amount),
            description: ActiveValue::Set(self.description.clone()),
            account: ActiveValue::Set(self.account.clone()),
            supplier: ActiveValue::Set(self.supplier.clone()),
            memo_tags: ActiveValue::Set(self.memo_tags.clone()),
            updated_at: ActiveValue::Set(now),
        }
    }

    /// Active model for a fresh row with a new surrogate id.
    pub(crate) fn insert(&self, now: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            detail_id: ActiveValue::Set(self.detail_id),
            free_deal_id: ActiveValue::Set(self.free_deal_id),
            journal_number: ActiveValue::Set(self.journal_number),
            journal_line_number: ActiveValue::Set(self.journal_line_number),
            date: ActiveValue::Set(self.date),
            amount: ActiveValue::Set(self.amount),
            description: ActiveValue::Set(self.description.clone()),
            account: ActiveValue::Set(self.account.clone()),
            supplier: ActiveValue::Set(self.supplier.clone()),
            memo_tags: ActiveValue::Set(self.memo_tags.clone()),
            updated_at: ActiveValue::Set(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub detail_id: i64,
    pub free_deal_id: i64,
    pub journal_number: i64,
    pub journal_line_number: i32,
    pub date: Date,
    pub amount: i64,
    pub description: Option<String>,
    pub account: String,
    pub supplier: Option<String>,
    pub memo_tags: Option<String>,
    pub updated_at: DateTimeUtc,
}

// No relation towards allocation_splits: the shared detail_id is a plain
// value looked up at query time, not an ownership link.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            detail_id: model.detail_id,
            free_deal_id: model.free_deal_id,
            journal_number: model.journal_number,
            journal_line_number: model.journal_line_number,
            date: model.date,
            amount: model.amount,
            description: model.description,
            account: model.account,
            supplier: model.supplier,
            memo_tags: model.memo_tags,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord {
            detail_id: 9001,
            free_deal_id: 500,
            journal_number: 500,
            journal_line_number: 1,
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            amount: 12000,
            description: Some("toner cartridges".to_string()),
            account: "消耗品費".to_string(),
            supplier: Some("文具のヤマダ".to_string()),
            memo_tags: None,
        }
    }

    fn stored(record: &TransactionRecord) -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            detail_id: record.detail_id,
            free_deal_id: record.free_deal_id,
            journal_number: record.journal_number,
            journal_line_number: record.journal_line_number,
            date: record.date,
            amount: record.amount,
            description: record.description.clone(),
            account: record.account.clone(),
            supplier: record.supplier.clone(),
            memo_tags: record.memo_tags.clone(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn identical_record_does_not_differ() {
        let record = record();
        let model = stored(&record);
        assert!(!record.differs_from(&model));
    }

    #[test]
    fn whitespace_and_none_are_equivalent() {
        let mut record = record();
        record.description = Some("  toner cartridges ".to_string());
        record.memo_tags = Some("".to_string());
        let model = stored(&self::record());
        assert!(!record.differs_from(&model));
    }

    #[test]
    fn amount_change_is_detected() {
        let record = record();
        let mut model = stored(&record);
        model.amount = 13000;
        assert!(record.differs_from(&model));
    }

    #[test]
    fn account_change_is_detected() {
        let record = record();
        let mut model = stored(&record);
        model.account = "旅費交通費".to_string();
        assert!(record.differs_from(&model));
    }
}
