use crate::error::StoreError;
use model::{
    core::value::Value,
    records::{
        column::Column,
        entity::{Report, ReportMeta, Sample, SampleData, SampleDataType},
    },
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

/// In-memory copy of the five QC tables.
///
/// Serialized as one JSON object with a list per table; missing lists are
/// read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub report_meta: Vec<ReportMeta>,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub data_types: Vec<SampleDataType>,
    #[serde(default)]
    pub sample_data: Vec<SampleData>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::new(self)
    }
}

/// Lookup tables over a [`Snapshot`], keyed by primary or foreign key.
pub struct SnapshotIndex<'a> {
    snapshot: &'a Snapshot,
    reports: HashMap<i64, &'a Report>,
    samples: HashMap<i64, &'a Sample>,
    data_types: HashMap<i64, &'a SampleDataType>,
    meta_by_report: HashMap<i64, Vec<&'a ReportMeta>>,
    data_by_sample: HashMap<i64, Vec<&'a SampleData>>,
}

impl<'a> SnapshotIndex<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        let mut meta_by_report: HashMap<i64, Vec<&ReportMeta>> = HashMap::new();
        for meta in &snapshot.report_meta {
            meta_by_report.entry(meta.report_id).or_default().push(meta);
        }

        let mut data_by_sample: HashMap<i64, Vec<&SampleData>> = HashMap::new();
        for data in &snapshot.sample_data {
            data_by_sample.entry(data.sample_id).or_default().push(data);
        }

        SnapshotIndex {
            snapshot,
            reports: snapshot.reports.iter().map(|r| (r.report_id, r)).collect(),
            samples: snapshot.samples.iter().map(|s| (s.sample_id, s)).collect(),
            data_types: snapshot
                .data_types
                .iter()
                .map(|t| (t.sample_data_type_id, t))
                .collect(),
            meta_by_report,
            data_by_sample,
        }
    }

    /// Every complete `sample ⋈ sample_data ⋈ sample_data_type ⋈ report`
    /// row, in `sample_data` order. Values whose sample, type or report is
    /// missing are skipped.
    pub fn joined(&self) -> Vec<JoinedRow<'a>> {
        self.snapshot
            .sample_data
            .iter()
            .filter_map(|data| {
                let sample = *self.samples.get(&data.sample_id)?;
                let data_type = *self.data_types.get(&data.sample_data_type_id)?;
                let report = *self.reports.get(&sample.report_id)?;
                Some(JoinedRow {
                    report,
                    sample,
                    data,
                    data_type,
                })
            })
            .collect()
    }

    pub fn report_meta(&self, report_id: i64) -> &[&'a ReportMeta] {
        self.meta_by_report
            .get(&report_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Metric values recorded for a sample, paired with their definitions.
    pub fn sample_metrics(
        &self,
        sample_id: i64,
    ) -> impl Iterator<Item = (&'a SampleData, &'a SampleDataType)> + '_ {
        self.data_by_sample
            .get(&sample_id)
            .into_iter()
            .flatten()
            .filter_map(move |data| {
                let data_type = *self.data_types.get(&data.sample_data_type_id)?;
                Some((*data, data_type))
            })
    }
}

/// One row of the sample join, borrowed from a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub report: &'a Report,
    pub sample: &'a Sample,
    pub data: &'a SampleData,
    pub data_type: &'a SampleDataType,
}

impl JoinedRow<'_> {
    pub fn value_of(&self, column: Column) -> Value {
        match column {
            Column::ReportId => Value::Int(self.report.report_id),
            Column::ReportUserId => self.report.user_id.into(),
            Column::ReportCreatedAt => Value::Timestamp(self.report.created_at),
            Column::ReportUploadedAt => Value::Timestamp(self.report.uploaded_at),
            Column::SampleId => Value::Int(self.sample.sample_id),
            Column::SampleName => self.sample.sample_name.clone().into(),
            Column::SampleDataId => Value::Int(self.data.sample_data_id),
            Column::SampleDataValue => self.data.value.clone().into(),
            Column::DataTypeId => Value::Int(self.data_type.sample_data_type_id),
            Column::DataTypeSection => self.data_type.data_section.clone().into(),
            Column::DataTypeKey => Value::String(self.data_type.data_key.clone()),
        }
    }
}
