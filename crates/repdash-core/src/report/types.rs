//! Report and column data shapes, payloads and their validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};

/// Minimum length of a report title or column name, in characters.
pub const NAME_MIN_CHARS: usize = 3;
/// Maximum length of a report title or column name, in characters.
pub const NAME_MAX_CHARS: usize = 255;
/// Maximum length of a description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Page size used when none is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Largest page the backend serves.
pub const MAX_PAGE_LIMIT: u32 = 100;

string_enum! {
    /// How a report obtains its data.
    ReportType, "report type", "realtime, cached" {
        Realtime => "realtime",
        Cached => "cached",
    }
}

string_enum! {
    /// How often a report is regenerated.
    ReportInterval, "report interval", "hourly, daily, monthly, annually" {
        Hourly => "hourly",
        Daily => "daily",
        Monthly => "monthly",
        Annually => "annually",
    }
}

string_enum! {
    /// Whether a report or column is in use.
    ReportStatus, "status", "active, inactive" {
        Active => "active",
        Inactive => "inactive",
    }
}

/// A report as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub interval: ReportInterval,
    pub status: ReportStatus,
    /// Server-generated from the title; read-only.
    pub slug: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// A report column as returned by the backend.
///
/// The backend does not echo the owning report; the client attaches it
/// from the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportColumn {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ReportStatus,
    /// SQL feeding the column.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
}

/// Payload for creating a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub interval: ReportInterval,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl NewReport {
    /// Create a payload with the required fields.
    pub fn new(
        title: impl Into<String>,
        report_type: ReportType,
        interval: ReportInterval,
        status: ReportStatus,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            report_type,
            interval,
            status,
            params: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the free-form report parameters.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Check the constraints the backend enforces.
    pub fn validate(&self) -> Result<(), Error> {
        validate_name("title", &self.title)?;
        validate_description(self.description.as_deref())
    }
}

/// Partial update of a report. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<ReportInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl ReportPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.report_type.is_none()
            && self.interval.is_none()
            && self.status.is_none()
            && self.params.is_none()
    }

    /// Check the constraints the backend enforces.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_empty() {
            return Err(InvalidInputError::EmptyPatch.into());
        }
        if let Some(title) = &self.title {
            validate_name("title", title)?;
        }
        validate_description(self.description.as_deref())
    }
}

/// Payload for creating a report column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub connection_id: String,
}

impl NewColumn {
    /// Create a payload with the required fields.
    pub fn new(
        name: impl Into<String>,
        status: ReportStatus,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            status,
            query: None,
            connection_id: connection_id.into(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the SQL query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Check the constraints the backend enforces.
    pub fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)?;
        validate_description(self.description.as_deref())?;
        if self.connection_id.trim().is_empty() {
            return Err(InvalidInputError::Field {
                field: "connection_id",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Partial update of a report column. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

impl ColumnPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.query.is_none()
            && self.connection_id.is_none()
    }

    /// Check the constraints the backend enforces.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_empty() {
            return Err(InvalidInputError::EmptyPatch.into());
        }
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_description(self.description.as_deref())
    }
}

/// Pagination window for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    /// Create a page, checking the limit is within `1..=100`.
    pub fn new(limit: u32, offset: u32) -> Result<Self, Error> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(InvalidInputError::Field {
                field: "limit",
                reason: format!("must be between 1 and {}", MAX_PAGE_LIMIT),
            }
            .into());
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Query string parameters for this page.
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<(), Error> {
    let len = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(InvalidInputError::Field {
            field,
            reason: format!(
                "must be {} to {} characters, got {}",
                NAME_MIN_CHARS, NAME_MAX_CHARS, len
            ),
        }
        .into());
    }
    Ok(())
}

fn validate_description(value: Option<&str>) -> Result<(), Error> {
    if let Some(description) = value {
        let len = description.chars().count();
        if len > DESCRIPTION_MAX_CHARS {
            return Err(InvalidInputError::Field {
                field: "description",
                reason: format!("must be at most {} characters, got {}", DESCRIPTION_MAX_CHARS, len),
            }
            .into());
        }
    }
    Ok(())
}
