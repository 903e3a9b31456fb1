//! Report and column CRUD over the authenticated adapter.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use repdash_core::report::{
    ColumnPatch, NewColumn, NewReport, Page, Report, ReportCache, ReportColumn, ReportPatch,
};
use repdash_core::{ReportService, Result};

use crate::api::ApiClient;
use crate::http::ApiRequest;
use crate::http::endpoints::{ADMIN_REPORTS, REPORTS, column, columns, report};

/// [`ReportService`] backed by the reporting API.
///
/// Keeps a [`ReportCache`] in step with every successful call. Report
/// renames are applied to the cache before the request is sent and rolled
/// back if it fails.
#[derive(Debug)]
pub struct ReportsClient {
    api: ApiClient,
    cache: RwLock<ReportCache>,
}

impl ReportsClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: RwLock::new(ReportCache::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Reports as last seen.
    pub fn cached_reports(&self) -> Vec<Report> {
        self.read_cache().reports().to_vec()
    }

    pub fn cached_report(&self, id: i64) -> Option<Report> {
        self.read_cache().report(id).cloned()
    }

    /// Columns of a report as last seen.
    pub fn cached_columns(&self, report_id: i64) -> Vec<ReportColumn> {
        self.read_cache().columns(report_id).to_vec()
    }

    pub fn clear_cache(&self) {
        self.write_cache().clear();
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, ReportCache> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, ReportCache> {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn owned(report_id: i64, mut column: ReportColumn) -> ReportColumn {
    column.report_id = Some(report_id);
    column
}

#[async_trait]
impl ReportService for ReportsClient {
    #[instrument(skip(self))]
    async fn list_reports(&self, page: Page) -> Result<Vec<Report>> {
        let request = ApiRequest::get(REPORTS).query(page.query());
        let reports: Vec<Report> = self.api.send(request).await?;
        debug!(count = reports.len(), "listed reports");
        self.write_cache().replace_reports(reports.clone());
        Ok(reports)
    }

    // Other users' reports stay out of the cache.
    #[instrument(skip(self))]
    async fn list_all_reports(&self, page: Page) -> Result<Vec<Report>> {
        let request = ApiRequest::get(ADMIN_REPORTS).query(page.query());
        let reports: Vec<Report> = self.api.send(request).await?;
        debug!(count = reports.len(), "listed all reports");
        Ok(reports)
    }

    #[instrument(skip(self))]
    async fn get_report(&self, id: i64) -> Result<Report> {
        let fetched: Report = self.api.send(ApiRequest::get(report(id))).await?;
        self.write_cache().upsert_report(fetched.clone());
        Ok(fetched)
    }

    #[instrument(skip(self, new), fields(title = %new.title))]
    async fn create_report(&self, new: &NewReport) -> Result<Report> {
        new.validate()?;
        let request = ApiRequest::post(REPORTS).json(new)?;
        let created: Report = self.api.send(request).await?;
        debug!(id = created.id, slug = %created.slug, "created report");
        self.write_cache().insert_report(created.clone());
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    async fn update_report(&self, id: i64, patch: &ReportPatch) -> Result<Report> {
        patch.validate()?;
        let request = ApiRequest::put(report(id)).json(patch)?;

        let previous = match patch.title.as_deref() {
            Some(title) => {
                let mut cache = self.write_cache();
                let previous = cache.report(id).cloned();
                cache.retitle(id, title);
                previous
            }
            None => None,
        };

        match self.api.send::<Report>(request).await {
            Ok(updated) => {
                self.write_cache().upsert_report(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                if let Some(previous) = previous {
                    self.write_cache().upsert_report(previous);
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_report(&self, id: i64) -> Result<()> {
        let _: Value = self.api.send(ApiRequest::delete(report(id))).await?;
        self.write_cache().remove_report(id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_columns(&self, report_id: i64, page: Page) -> Result<Vec<ReportColumn>> {
        let request = ApiRequest::get(columns(report_id)).query(page.query());
        let listed: Vec<ReportColumn> = self.api.send(request).await?;
        let listed: Vec<ReportColumn> = listed.into_iter().map(|c| owned(report_id, c)).collect();
        debug!(count = listed.len(), "listed columns");
        self.write_cache().replace_columns(report_id, listed.clone());
        Ok(listed)
    }

    #[instrument(skip(self))]
    async fn get_column(&self, report_id: i64, column_id: i64) -> Result<ReportColumn> {
        let request = ApiRequest::get(column(report_id, column_id));
        let fetched = owned(report_id, self.api.send(request).await?);
        self.write_cache().upsert_column(report_id, fetched.clone());
        Ok(fetched)
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    async fn create_column(&self, report_id: i64, new: &NewColumn) -> Result<ReportColumn> {
        new.validate()?;
        let request = ApiRequest::post(columns(report_id)).json(new)?;
        let created = owned(report_id, self.api.send(request).await?);
        debug!(id = created.id, "created column");
        self.write_cache().insert_column(report_id, created.clone());
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    async fn update_column(
        &self,
        report_id: i64,
        column_id: i64,
        patch: &ColumnPatch,
    ) -> Result<ReportColumn> {
        patch.validate()?;
        let request = ApiRequest::put(column(report_id, column_id)).json(patch)?;
        let updated = owned(report_id, self.api.send(request).await?);
        self.write_cache().upsert_column(report_id, updated.clone());
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_column(&self, report_id: i64, column_id: i64) -> Result<()> {
        let request = ApiRequest::delete(column(report_id, column_id));
        let _: Value = self.api.send(request).await?;
        self.write_cache().remove_column(report_id, column_id);
        Ok(())
    }
}
