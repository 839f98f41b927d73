//! The seam towards the external bookkeeping service.
//!
//! The reconciliation engine never talks HTTP itself: it consumes a
//! [`DealSource`], a paginated view over the remote deal stream plus the
//! master lists needed to resolve display names. The records here mirror the
//! wire contract of the deals API (unknown fields are ignored), so an
//! implementation only has to unwrap the response envelopes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Display name used when an account item cannot be resolved.
pub const UNKNOWN_ACCOUNT_LABEL: &str = "不明";

/// Errors produced by a [`DealSource`] implementation.
///
/// The engine never retries on its own; callers decide between retry and
/// abort (a credential refresh-and-retry loop lives outside the engine).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("credential rejected by source: {0}")]
    Auth(String),
    #[error("source api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("source transport error: {0}")]
    Transport(String),
}

/// A company the credential can access.
#[derive(Clone, Debug, Deserialize)]
pub struct Company {
    pub id: i64,
    pub display_name: String,
    #[serde(default)]
    pub role: String,
}

/// One external accounting entry. A deal may own multiple detail lines
/// (e.g. a split expense); the lines carry the stable identifiers.
#[derive(Clone, Debug, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub ref_number: Option<String>,
    #[serde(default)]
    pub details: Vec<DealLine>,
}

/// One line item within a deal.
///
/// `id` is the stable external line identifier (`detail_id` in storage):
/// assigned by the remote system, unique per accounting line and reused when
/// the same underlying entry is re-fetched. Lines can arrive without one
/// (drafts, unregistered entries); such lines cannot be reconciled and are
/// skipped by the sync. `account_item_name` may be absent, requiring the
/// master-list fallback.
#[derive(Clone, Debug, Deserialize)]
pub struct DealLine {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_item_id: Option<i64>,
    #[serde(default)]
    pub account_item_name: Option<String>,
    pub amount: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Inclusive issue-date range for a sync run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Read-only adapter over the external bookkeeping API.
///
/// `deals` is driven by offset/limit: the caller keeps requesting pages
/// until a short page comes back. Implementations perform outbound network
/// calls only and mutate no local state.
#[async_trait]
pub trait DealSource: Send + Sync {
    async fn companies(&self, token: &str) -> Result<Vec<Company>, SourceError>;

    async fn deals(
        &self,
        token: &str,
        company_id: i64,
        range: DateRange,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Deal>, SourceError>;

    async fn account_items(
        &self,
        token: &str,
        company_id: i64,
    ) -> Result<HashMap<i64, String>, SourceError>;

    async fn tags(&self, token: &str, company_id: i64)
    -> Result<HashMap<i64, String>, SourceError>;
}

/// Resolves the display name of a line's account item.
///
/// Priority: the inline name returned by the detail-level fetch wins (the
/// source's own resolution can be fresher than the master list), then the
/// master-list lookup, then [`UNKNOWN_ACCOUNT_LABEL`].
pub fn resolve_account_name(line: &DealLine, account_items: &HashMap<i64, String>) -> String {
    if let Some(name) = line.account_item_name.as_deref() {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(id) = line.account_item_id
        && let Some(name) = account_items.get(&id)
    {
        return name.clone();
    }
    UNKNOWN_ACCOUNT_LABEL.to_string()
}

/// Joins the line's tag ids into a display string using the tag master.
/// Unknown ids are dropped; an empty result becomes `None`.
pub fn resolve_memo_tags(line: &DealLine, tags: &HashMap<i64, String>) -> Option<String> {
    let names: Vec<&str> = line
        .tag_ids
        .iter()
        .filter_map(|id| tags.get(id).map(String::as_str))
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(inline_name: Option<&str>, account_item_id: Option<i64>) -> DealLine {
        DealLine {
            id: Some(1),
            account_item_id,
            account_item_name: inline_name.map(str::to_string),
            amount: 1000,
            tag_ids: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn inline_name_wins_over_master_list() {
        let mut items = HashMap::new();
        items.insert(10, "Office Costs".to_string());

        let resolved = resolve_account_name(&line(Some("Supplies"), Some(10)), &items);
        assert_eq!(resolved, "Supplies");
    }

    #[test]
    fn master_list_used_when_inline_name_missing() {
        let mut items = HashMap::new();
        items.insert(10, "Office Costs".to_string());

        let resolved = resolve_account_name(&line(None, Some(10)), &items);
        assert_eq!(resolved, "Office Costs");
    }

    #[test]
    fn blank_inline_name_falls_through() {
        let mut items = HashMap::new();
        items.insert(10, "Office Costs".to_string());

        let resolved = resolve_account_name(&line(Some("  "), Some(10)), &items);
        assert_eq!(resolved, "Office Costs");
    }

    #[test]
    fn unknown_label_when_nothing_resolves() {
        let resolved = resolve_account_name(&line(None, Some(99)), &HashMap::new());
        assert_eq!(resolved, UNKNOWN_ACCOUNT_LABEL);

        let resolved = resolve_account_name(&line(None, None), &HashMap::new());
        assert_eq!(resolved, UNKNOWN_ACCOUNT_LABEL);
    }

    #[test]
    fn memo_tags_join_known_names() {
        let mut tags = HashMap::new();
        tags.insert(1, "旅費".to_string());
        tags.insert(2, "消耗品".to_string());

        let mut l = line(None, None);
        l.tag_ids = vec![1, 3, 2];
        assert_eq!(resolve_memo_tags(&l, &tags).as_deref(), Some("旅費, 消耗品"));

        l.tag_ids = vec![3];
        assert_eq!(resolve_memo_tags(&l, &tags), None);
    }
}
