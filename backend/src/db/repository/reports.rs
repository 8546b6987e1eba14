//! Issue report store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{BuildingId, IssueReport};

/// Append-mostly store of user issue reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a report.
    ///
    /// Inserting is idempotent on the report id so redelivered change events
    /// are not counted twice.
    ///
    /// # Returns
    /// * `Ok(true)` - The report was stored
    /// * `Ok(false)` - A report with the same id already existed
    async fn insert_report(&self, report: IssueReport) -> RepositoryResult<bool>;

    /// Reports newest first, optionally restricted to one building.
    async fn list_reports(&self, building: Option<&BuildingId>) -> RepositoryResult<Vec<IssueReport>>;

    /// Reports with `reported_at >= since`, newest first.
    async fn recent_reports(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<IssueReport>>;
}
