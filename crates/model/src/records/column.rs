use serde::{Deserialize, Serialize};
use std::fmt;

/// Tables taking part in the sample join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Report,
    ReportMeta,
    Sample,
    SampleData,
    SampleDataType,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Report => "report",
            Table::ReportMeta => "report_meta",
            Table::Sample => "sample",
            Table::SampleData => "sample_data",
            Table::SampleDataType => "sample_data_type",
        }
    }

    /// Alias used for the table in the main join.
    pub fn alias(self) -> &'static str {
        match self {
            Table::Report => "r",
            Table::ReportMeta => "rm",
            Table::Sample => "s",
            Table::SampleData => "sd",
            Table::SampleDataType => "sdt",
        }
    }
}

/// Storage type of a column, used when decoding driver rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Id,
    NullableId,
    Timestamp,
    Text,
    NullableText,
}

/// A projectable attribute of `sample ⋈ sample_data ⋈ sample_data_type ⋈ report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    ReportId,
    ReportUserId,
    ReportCreatedAt,
    ReportUploadedAt,
    SampleId,
    SampleName,
    SampleDataId,
    SampleDataValue,
    DataTypeId,
    DataTypeSection,
    DataTypeKey,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::ReportId,
        Column::ReportUserId,
        Column::ReportCreatedAt,
        Column::ReportUploadedAt,
        Column::SampleId,
        Column::SampleName,
        Column::SampleDataId,
        Column::SampleDataValue,
        Column::DataTypeId,
        Column::DataTypeSection,
        Column::DataTypeKey,
    ];

    pub fn table(self) -> Table {
        match self {
            Column::ReportId
            | Column::ReportUserId
            | Column::ReportCreatedAt
            | Column::ReportUploadedAt => Table::Report,
            Column::SampleId | Column::SampleName => Table::Sample,
            Column::SampleDataId | Column::SampleDataValue => Table::SampleData,
            Column::DataTypeId | Column::DataTypeSection | Column::DataTypeKey => {
                Table::SampleDataType
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::ReportId => "report_id",
            Column::ReportUserId => "user_id",
            Column::ReportCreatedAt => "created_at",
            Column::ReportUploadedAt => "uploaded_at",
            Column::SampleId => "sample_id",
            Column::SampleName => "sample_name",
            Column::SampleDataId => "sample_data_id",
            Column::SampleDataValue => "value",
            Column::DataTypeId => "sample_data_type_id",
            Column::DataTypeSection => "data_section",
            Column::DataTypeKey => "data_key",
        }
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            Column::ReportId | Column::SampleId | Column::SampleDataId | Column::DataTypeId => {
                ColumnType::Id
            }
            Column::ReportUserId => ColumnType::NullableId,
            Column::ReportCreatedAt | Column::ReportUploadedAt => ColumnType::Timestamp,
            Column::DataTypeKey => ColumnType::Text,
            Column::SampleName | Column::SampleDataValue | Column::DataTypeSection => {
                ColumnType::NullableText
            }
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table().name(), self.name())
    }
}
