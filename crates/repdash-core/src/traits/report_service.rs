//! Report and column CRUD trait.

use async_trait::async_trait;

use crate::Result;
use crate::report::{ColumnPatch, NewColumn, NewReport, Page, Report, ReportColumn, ReportPatch};

/// CRUD operations on reports and their columns.
///
/// Every operation requires an authenticated session; implementations
/// validate payloads before sending them.
#[async_trait]
pub trait ReportService: Send + Sync {
    /// List the caller's reports.
    async fn list_reports(&self, page: Page) -> Result<Vec<Report>>;

    /// List every user's reports, newest first.
    ///
    /// Requires an admin account; the backend answers 403 otherwise.
    async fn list_all_reports(&self, page: Page) -> Result<Vec<Report>>;

    /// Fetch a single report.
    async fn get_report(&self, id: i64) -> Result<Report>;

    /// Create a report. The backend generates the slug.
    async fn create_report(&self, report: &NewReport) -> Result<Report>;

    /// Update some fields of a report.
    async fn update_report(&self, id: i64, patch: &ReportPatch) -> Result<Report>;

    /// Delete a report together with its columns.
    async fn delete_report(&self, id: i64) -> Result<()>;

    /// List the columns of a report.
    async fn list_columns(&self, report_id: i64, page: Page) -> Result<Vec<ReportColumn>>;

    /// Fetch a single column.
    async fn get_column(&self, report_id: i64, column_id: i64) -> Result<ReportColumn>;

    /// Create a column under a report.
    async fn create_column(&self, report_id: i64, column: &NewColumn) -> Result<ReportColumn>;

    /// Update some fields of a column.
    async fn update_column(
        &self,
        report_id: i64,
        column_id: i64,
        patch: &ColumnPatch,
    ) -> Result<ReportColumn>;

    /// Delete a column.
    async fn delete_column(&self, report_id: i64, column_id: i64) -> Result<()>;
}
