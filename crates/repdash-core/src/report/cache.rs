//! Local mirror of reports and their columns.

use std::collections::BTreeMap;

use super::slug::slugify;
use super::types::{Report, ReportColumn};

/// In-memory copy of the reports and columns the client has seen.
///
/// Reports keep the order the backend returned them in; newly created
/// reports go to the front. Columns are grouped by owning report.
#[derive(Debug, Clone, Default)]
pub struct ReportCache {
    reports: Vec<Report>,
    columns: BTreeMap<i64, Vec<ReportColumn>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cached reports.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn report(&self, id: i64) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Replace the report list with a fresh listing.
    pub fn replace_reports(&mut self, reports: Vec<Report>) {
        self.reports = reports;
    }

    /// Insert a newly created report at the front.
    pub fn insert_report(&mut self, report: Report) {
        self.reports.retain(|r| r.id != report.id);
        self.reports.insert(0, report);
    }

    /// Replace a report in place, or append it if unknown.
    pub fn upsert_report(&mut self, report: Report) {
        match self.reports.iter_mut().find(|r| r.id == report.id) {
            Some(existing) => *existing = report,
            None => self.reports.push(report),
        }
    }

    /// Rename a report locally, regenerating its slug.
    ///
    /// Returns false if the report is not cached.
    pub fn retitle(&mut self, id: i64, title: &str) -> bool {
        match self.reports.iter_mut().find(|r| r.id == id) {
            Some(report) => {
                report.title = title.to_string();
                report.slug = slugify(title);
                true
            }
            None => false,
        }
    }

    /// Remove a report and every column it owns.
    pub fn remove_report(&mut self, id: i64) -> Option<Report> {
        self.columns.remove(&id);
        let index = self.reports.iter().position(|r| r.id == id)?;
        Some(self.reports.remove(index))
    }

    /// Columns of a report.
    pub fn columns(&self, report_id: i64) -> &[ReportColumn] {
        self.columns
            .get(&report_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace every cached column of a report.
    pub fn replace_columns(&mut self, report_id: i64, columns: Vec<ReportColumn>) {
        self.columns.insert(report_id, columns);
    }

    /// Insert a newly created column at the front of its report.
    pub fn insert_column(&mut self, report_id: i64, column: ReportColumn) {
        let columns = self.columns.entry(report_id).or_default();
        columns.retain(|c| c.id != column.id);
        columns.insert(0, column);
    }

    /// Replace a column in place, or append it if unknown.
    pub fn upsert_column(&mut self, report_id: i64, column: ReportColumn) {
        let columns = self.columns.entry(report_id).or_default();
        match columns.iter_mut().find(|c| c.id == column.id) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
    }

    pub fn remove_column(&mut self, report_id: i64, column_id: i64) -> Option<ReportColumn> {
        let columns = self.columns.get_mut(&report_id)?;
        let index = columns.iter().position(|c| c.id == column_id)?;
        Some(columns.remove(index))
    }

    /// Drop everything, e.g. when the session ends.
    pub fn clear(&mut self) {
        self.reports.clear();
        self.columns.clear();
    }
}
