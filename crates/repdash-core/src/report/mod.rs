//! Report and report column types.
//!
//! A report is the parent record of the dashboard; each report owns a list
//! of columns that describe the queries feeding it. The operations live on
//! [`ReportService`](crate::traits::ReportService).

mod cache;
mod slug;
mod types;

pub use cache::ReportCache;
pub use slug::slugify;
pub use types::{
    ColumnPatch, NewColumn, NewReport, Page, Report, ReportColumn, ReportInterval, ReportPatch,
    ReportStatus, ReportType,
};
