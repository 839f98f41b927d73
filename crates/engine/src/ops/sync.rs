use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, TransactionRecord,
    source::{DateRange, DealSource, SourceError, resolve_account_name, resolve_memo_tags},
    sync_runs::{self, SyncRunStatus},
};

use super::{Engine, UpsertOutcome};

/// Parameters of one reconciliation run.
#[derive(Clone, Debug)]
pub struct SyncParams {
    /// Inclusive issue-date range to fetch.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Company to sync; when `None` the first company the credential can
    /// access is used.
    pub company_id: Option<i64>,
    pub page_size: u64,
    /// Checked between pages; a cancelled token stops the run after the
    /// current page commits.
    pub cancel: Option<CancellationToken>,
}

impl SyncParams {
    pub const DEFAULT_PAGE_SIZE: u64 = 100;

    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            company_id: None,
            page_size: Self::DEFAULT_PAGE_SIZE,
            cancel: None,
        }
    }
}

/// One recoverable failure inside a run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("page fetch failed at offset {offset}: {source}")]
    Page {
        offset: u64,
        #[source]
        source: SourceError,
    },
    #[error("line {detail_id} could not be stored: {message}")]
    Line { detail_id: i64, message: String },
}

/// Counters reported by [`Engine::run_sync`].
///
/// `skipped` counts lines whose stored row already matched; `fetched` counts
/// every detail line seen, whatever happened to it.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub fetched: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: Vec<SyncError>,
}

impl SyncSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn map_source(err: SourceError) -> EngineError {
    match err {
        SourceError::Auth(message) => EngineError::Auth(message),
        other => EngineError::Source(other),
    }
}

impl Engine {
    /// Runs one reconciliation pass against the external source.
    ///
    /// Fetched lines are upserted one by one, each in its own committed DB
    /// transaction, so a failure mid-run loses nothing already stored. A
    /// failure before the first page (company resolution, master lists)
    /// aborts with an error; a failure on a later page ends the run early
    /// and reports it in the summary instead. Nothing is ever deleted here.
    pub async fn run_sync(
        &self,
        source: &dyn DealSource,
        token: &str,
        params: &SyncParams,
    ) -> ResultEngine<SyncSummary> {
        if params.start_date > params.end_date {
            return Err(EngineError::Validation(
                "sync start date must be <= end date".to_string(),
            ));
        }
        if params.page_size == 0 {
            return Err(EngineError::Validation(
                "sync page size must be at least 1".to_string(),
            ));
        }

        let run_id = self.open_sync_run().await?;
        match self.sync_pages(source, token, params).await {
            Ok((summary, status)) => {
                let message = if summary.errors.is_empty() {
                    None
                } else {
                    Some(
                        summary
                            .errors
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; "),
                    )
                };
                self.close_sync_run(&run_id, status, message, summary.fetched)
                    .await?;
                tracing::info!(
                    fetched = summary.fetched,
                    created = summary.created,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    errors = summary.errors.len(),
                    status = status.as_str(),
                    "sync finished"
                );
                Ok(summary)
            }
            Err(err) => {
                self.close_sync_run(&run_id, SyncRunStatus::Error, Some(err.to_string()), 0)
                    .await?;
                Err(err)
            }
        }
    }

    async fn sync_pages(
        &self,
        source: &dyn DealSource,
        token: &str,
        params: &SyncParams,
    ) -> ResultEngine<(SyncSummary, SyncRunStatus)> {
        let company_id = match params.company_id {
            Some(id) => id,
            None => {
                let companies = source.companies(token).await.map_err(map_source)?;
                companies
                    .first()
                    .map(|c| c.id)
                    .ok_or_else(|| {
                        EngineError::Validation(
                            "credential has access to no company".to_string(),
                        )
                    })?
            }
        };

        // Master lists come first: without them every line would resolve to
        // the unknown label, so their failure aborts before any upsert.
        let account_items = source
            .account_items(token, company_id)
            .await
            .map_err(map_source)?;
        let tags = source.tags(token, company_id).await.map_err(map_source)?;

        let range = DateRange {
            start: params.start_date,
            end: params.end_date,
        };
        let mut summary = SyncSummary::default();
        let mut cancelled = false;
        let mut offset = 0;

        loop {
            if params
                .cancel
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                tracing::info!(offset, "sync cancelled between pages");
                cancelled = true;
                break;
            }

            let page = match source
                .deals(token, company_id, range, params.page_size, offset)
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(offset, error = %err, "page fetch failed, ending run early");
                    summary.errors.push(SyncError::Page {
                        offset,
                        source: err,
                    });
                    break;
                }
            };
            let page_len = page.len() as u64;

            for deal in &page {
                for (index, line) in deal.details.iter().enumerate() {
                    summary.fetched += 1;
                    // A line without an external id cannot be reconciled.
                    let Some(detail_id) = line.id else {
                        summary.skipped += 1;
                        continue;
                    };
                    let record = TransactionRecord {
                        detail_id,
                        free_deal_id: deal.id,
                        journal_number: deal.id,
                        journal_line_number: index as i32 + 1,
                        date: deal.issue_date,
                        amount: line.amount,
                        description: line.description.clone(),
                        account: resolve_account_name(line, &account_items),
                        supplier: deal.partner_name.clone(),
                        memo_tags: resolve_memo_tags(line, &tags),
                    };
                    match self.upsert_transaction(&record).await {
                        Ok(UpsertOutcome::Created) => summary.created += 1,
                        Ok(UpsertOutcome::Updated) => summary.updated += 1,
                        Ok(UpsertOutcome::Unchanged) => summary.skipped += 1,
                        Err(err) => {
                            tracing::warn!(detail_id, error = %err, "line upsert failed");
                            summary.errors.push(SyncError::Line {
                                detail_id,
                                message: err.to_string(),
                            });
                        }
                    }
                }
            }

            if page_len < params.page_size {
                break;
            }
            offset += page_len;
        }

        let status = if cancelled {
            SyncRunStatus::Cancelled
        } else if summary.errors.is_empty() {
            SyncRunStatus::Success
        } else {
            SyncRunStatus::Warning
        };
        Ok((summary, status))
    }

    async fn open_sync_run(&self) -> ResultEngine<String> {
        let run_id = Uuid::new_v4().to_string();
        sync_runs::ActiveModel {
            id: ActiveValue::Set(run_id.clone()),
            started_at: ActiveValue::Set(Utc::now()),
            finished_at: ActiveValue::Set(None),
            status: ActiveValue::Set(SyncRunStatus::Running.as_str().to_string()),
            message: ActiveValue::Set(None),
            record_count: ActiveValue::Set(0),
        }
        .insert(&self.database)
        .await?;
        Ok(run_id)
    }

    async fn close_sync_run(
        &self,
        run_id: &str,
        status: SyncRunStatus,
        message: Option<String>,
        record_count: u64,
    ) -> ResultEngine<()> {
        sync_runs::ActiveModel {
            id: ActiveValue::Set(run_id.to_string()),
            started_at: ActiveValue::NotSet,
            finished_at: ActiveValue::Set(Some(Utc::now())),
            status: ActiveValue::Set(status.as_str().to_string()),
            message: ActiveValue::Set(message),
            record_count: ActiveValue::Set(record_count as i64),
        }
        .update(&self.database)
        .await?;
        Ok(())
    }
}
