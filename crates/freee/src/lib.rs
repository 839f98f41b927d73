//! HTTP client for the freee bookkeeping API.
//!
//! Implements [`DealSource`] by unwrapping the API's response envelopes into
//! the engine's source records. The client holds no credential: the access
//! token is passed on every call, so a caller can rotate it between runs.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use engine::source::{Company, DateRange, Deal, DealSource, SourceError};

pub const DEFAULT_BASE_URL: &str = "https://api.freee.co.jp";

#[derive(Clone, Debug)]
pub struct FreeeClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompaniesEnvelope {
    companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
struct DealsEnvelope {
    deals: Vec<Deal>,
}

#[derive(Debug, Deserialize)]
struct NamedItem {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccountItemsEnvelope {
    account_items: Vec<NamedItem>,
}

#[derive(Debug, Deserialize)]
struct TagsEnvelope {
    tags: Vec<NamedItem>,
}

fn into_map(items: Vec<NamedItem>) -> HashMap<i64, String> {
    items.into_iter().map(|item| (item.id, item.name)).collect()
}

impl Default for FreeeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeeClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default host (test servers, mocks).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, path, "freee api call failed");
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| SourceError::Transport(format!("invalid response body: {err}")))
    }
}

#[async_trait]
impl DealSource for FreeeClient {
    async fn companies(&self, token: &str) -> Result<Vec<Company>, SourceError> {
        let envelope: CompaniesEnvelope = self.get_json(token, "/api/1/companies", &[]).await?;
        Ok(envelope.companies)
    }

    async fn deals(
        &self,
        token: &str,
        company_id: i64,
        range: DateRange,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Deal>, SourceError> {
        let query = [
            ("company_id", company_id.to_string()),
            ("start_issue_date", range.start.to_string()),
            ("end_issue_date", range.end.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let envelope: DealsEnvelope = self.get_json(token, "/api/1/deals", &query).await?;
        Ok(envelope.deals)
    }

    async fn account_items(
        &self,
        token: &str,
        company_id: i64,
    ) -> Result<HashMap<i64, String>, SourceError> {
        let query = [("company_id", company_id.to_string())];
        let envelope: AccountItemsEnvelope =
            self.get_json(token, "/api/1/account_items", &query).await?;
        Ok(into_map(envelope.account_items))
    }

    async fn tags(
        &self,
        token: &str,
        company_id: i64,
    ) -> Result<HashMap<i64, String>, SourceError> {
        let query = [("company_id", company_id.to_string())];
        let envelope: TagsEnvelope = self.get_json(token, "/api/1/tags", &query).await?;
        Ok(into_map(envelope.tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deals_envelope_tolerates_missing_optional_fields() {
        let body = r#"{
            "deals": [
                {
                    "id": 500,
                    "issue_date": "2026-04-03",
                    "details": [
                        { "id": 9001, "account_item_id": 10, "amount": 12000 },
                        {
                            "id": 9002,
                            "account_item_name": "旅費交通費",
                            "amount": 800,
                            "tag_ids": [1, 2],
                            "description": "taxi"
                        },
                        { "account_item_id": 10, "amount": 50 }
                    ]
                },
                { "id": 501, "issue_date": "2026-04-10" }
            ]
        }"#;

        let envelope: DealsEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.deals.len(), 2);

        let first = &envelope.deals[0];
        assert_eq!(first.details.len(), 3);
        assert_eq!(first.details[0].id, Some(9001));
        assert!(first.details[0].account_item_name.is_none());
        assert_eq!(
            first.details[1].account_item_name.as_deref(),
            Some("旅費交通費")
        );
        assert_eq!(first.details[1].tag_ids, vec![1, 2]);
        // Drafts can come back without a line id; the payload still parses.
        assert!(first.details[2].id.is_none());

        assert!(envelope.deals[1].details.is_empty());
    }

    #[test]
    fn master_envelopes_collapse_to_maps() {
        let body = r#"{ "account_items": [ { "id": 10, "name": "消耗品費" } ] }"#;
        let envelope: AccountItemsEnvelope = serde_json::from_str(body).unwrap();
        let map = into_map(envelope.account_items);
        assert_eq!(map.get(&10).map(String::as_str), Some("消耗品費"));

        let body = r#"{ "tags": [ { "id": 1, "name": "旅費" }, { "id": 2, "name": "事務" } ] }"#;
        let envelope: TagsEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(into_map(envelope.tags).len(), 2);
    }

    #[test]
    fn companies_envelope_reads_display_name() {
        let body = r#"{
            "companies": [
                { "id": 77, "display_name": "テスト会社", "role": "admin" }
            ]
        }"#;
        let envelope: CompaniesEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.companies[0].id, 77);
        assert_eq!(envelope.companies[0].display_name, "テスト会社");
    }
}
