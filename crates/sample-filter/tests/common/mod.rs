#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use connectors::{
    error::StoreError,
    memory::{snapshot::Snapshot, store::MemoryStore},
    store::SampleStore,
};
use model::{
    core::value::Value,
    execution::query::SampleQuery,
    records::{
        column::Column,
        entity::{Report, ReportMeta, Sample, SampleData, SampleDataType},
        row::RowData,
    },
};
use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicUsize, Ordering},
};

pub const GC: &str = "percent_gc";
pub const SEQUENCES: &str = "total_sequences";
pub const STATUS: &str = "status";

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn days_ago(days: i64) -> NaiveDateTime {
    now() - Duration::days(days)
}

/// Three reports created 3, 2 and 1 days before [`now`], one sample each.
///
/// | report | created  | instrument | percent_gc | total_sequences | status |
/// |--------|----------|------------|------------|-----------------|--------|
/// | 1      | 3d ago   | hiseq      | 1          | 1000            | pass   |
/// | 2      | 2d ago   | miseq      | 2          | 2500            |        |
/// | 3      | 1d ago   |            | 3          | 4000            |        |
pub fn fixture() -> Snapshot {
    let mut snapshot = Snapshot::default();

    for (report_id, age) in [(1, 3), (2, 2), (3, 1)] {
        snapshot.reports.push(Report {
            report_id,
            user_id: Some(1),
            report_hash: None,
            created_at: days_ago(age),
            uploaded_at: days_ago(age),
        });
        snapshot.samples.push(Sample {
            sample_id: report_id * 10,
            sample_name: Some(format!("sample_{report_id}")),
            report_id,
        });
    }

    for (report_meta_id, report_id, value) in [(1, 1, "hiseq"), (2, 2, "miseq")] {
        snapshot.report_meta.push(ReportMeta {
            report_meta_id,
            report_id,
            report_meta_key: "instrument".to_string(),
            report_meta_value: value.to_string(),
        });
    }

    for (sample_data_type_id, key) in [(100, GC), (101, SEQUENCES), (102, STATUS)] {
        snapshot.data_types.push(SampleDataType {
            sample_data_type_id,
            data_id: None,
            data_section: Some("fastqc".to_string()),
            data_key: key.to_string(),
        });
    }

    let values = [
        (1000, 100, 10, "1"),
        (1001, 101, 10, "1000"),
        (1002, 102, 10, "pass"),
        (2000, 100, 20, "2"),
        (2001, 101, 20, "2500"),
        (3000, 100, 30, "3"),
        (3001, 101, 30, "4000"),
    ];
    for (sample_data_id, sample_data_type_id, sample_id, value) in values {
        snapshot.sample_data.push(SampleData {
            sample_data_id,
            report_id: Some(sample_id / 10),
            sample_data_type_id,
            sample_id,
            value: Some(value.to_string()),
        });
    }

    snapshot
}

pub fn store() -> MemoryStore {
    MemoryStore::new(fixture())
}

/// Ids of every joined row the query returns.
pub async fn row_ids<S: SampleStore + ?Sized>(store: &S, query: &SampleQuery) -> BTreeSet<i64> {
    column_set(store, query, Column::SampleDataId).await
}

/// Ids of the reports the query touches.
pub async fn report_ids<S: SampleStore + ?Sized>(store: &S, query: &SampleQuery) -> BTreeSet<i64> {
    column_set(store, query, Column::ReportId).await
}

async fn column_set<S: SampleStore + ?Sized>(
    store: &S,
    query: &SampleQuery,
    column: Column,
) -> BTreeSet<i64> {
    store
        .fetch(query)
        .await
        .unwrap()
        .iter()
        .filter_map(|row| match row.get_value(column) {
            Value::Int(id) => Some(id),
            _ => None,
        })
        .collect()
}

/// Wraps a store and counts how often it is queried.
pub struct CountingStore<S> {
    pub inner: S,
    pub fetches: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        CountingStore {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: SampleStore> SampleStore for CountingStore<S> {
    async fn fetch(&self, query: &SampleQuery) -> Result<Vec<RowData>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}
