//! Read-only mirrors of the tables owned by the storage collaborator.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One uploaded QC report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub report_hash: Option<String>,
    pub created_at: NaiveDateTime,
    pub uploaded_at: NaiveDateTime,
}

/// Free-form key/value annotation attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_meta_id: i64,
    pub report_id: i64,
    pub report_meta_key: String,
    pub report_meta_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sample_id: i64,
    #[serde(default)]
    pub sample_name: Option<String>,
    pub report_id: i64,
}

/// Metric definition shared by every sample that reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDataType {
    pub sample_data_type_id: i64,
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub data_section: Option<String>,
    pub data_key: String,
}

/// One metric value for one sample. The value is stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    pub sample_data_id: i64,
    #[serde(default)]
    pub report_id: Option<i64>,
    pub sample_data_type_id: i64,
    pub sample_id: i64,
    #[serde(default)]
    pub value: Option<String>,
}
