use crate::{
    compiler::FilterCompiler,
    error::StoreError,
    memory::{
        filter::{MemoryFilter, MemoryFilterCompiler},
        snapshot::{JoinedRow, Snapshot},
    },
    store::SampleStore,
};
use async_trait::async_trait;
use model::{
    execution::query::{OrderBy, OrderDir, SampleQuery},
    records::row::{FieldValue, RowData},
};
use std::{cmp::Ordering, path::Path, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A [`SampleStore`] over a snapshot held in memory.
///
/// Queries join and filter the snapshot as it is when they run, so rows
/// removed through [`MemoryStore::delete_report`] disappear from every
/// later fetch.
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<RwLock<Snapshot>>,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        MemoryStore {
            snapshot: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let snapshot = Snapshot::load(path)?;
        info!(
            path = %path.display(),
            reports = snapshot.reports.len(),
            values = snapshot.sample_data.len(),
            "Loaded snapshot"
        );
        Ok(Self::new(snapshot))
    }

    /// Removes a report with its metadata, samples and their values.
    /// Returns false when no such report exists.
    pub async fn delete_report(&self, report_id: i64) -> bool {
        let mut snapshot = self.snapshot.write().await;
        let before = snapshot.reports.len();
        snapshot.reports.retain(|r| r.report_id != report_id);
        if snapshot.reports.len() == before {
            return false;
        }

        let samples = snapshot
            .samples
            .iter()
            .filter(|s| s.report_id == report_id)
            .map(|s| s.sample_id)
            .collect::<Vec<_>>();

        snapshot.report_meta.retain(|m| m.report_id != report_id);
        snapshot.samples.retain(|s| s.report_id != report_id);
        snapshot
            .sample_data
            .retain(|d| d.report_id != Some(report_id) && !samples.contains(&d.sample_id));

        debug!(report_id, samples = samples.len(), "Deleted report");
        true
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn fetch(&self, query: &SampleQuery) -> Result<Vec<RowData>, StoreError> {
        let filter = match query.predicate() {
            Some(expr) => MemoryFilterCompiler.compile(&expr)?,
            None => MemoryFilter::new(),
        };

        let snapshot = self.snapshot.read().await;
        let index = snapshot.index();

        let mut rows = Vec::new();
        for row in index.joined() {
            if filter.eval(&row, &index)? {
                rows.push(row);
            }
        }

        // Stable, so rows that tie keep snapshot order.
        rows.sort_by(|a, b| compare_rows(a, b, &query.order_by));

        let columns = query.columns();
        let result = rows
            .iter()
            .map(|row| {
                RowData::new(
                    columns
                        .iter()
                        .map(|column| FieldValue {
                            column: *column,
                            value: row.value_of(*column),
                        })
                        .collect(),
                )
            })
            .collect::<Vec<_>>();

        debug!(rows = result.len(), "Fetched rows from snapshot");
        Ok(result)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// NULLs sort last ascending and first descending, as PostgreSQL does.
fn compare_rows(a: &JoinedRow, b: &JoinedRow, order_by: &[OrderBy]) -> Ordering {
    for order in order_by {
        let (left, right) = (a.value_of(order.column), b.value_of(order.column));
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => left.compare(&right).unwrap_or(Ordering::Equal),
        };
        let ordering = match order.direction {
            OrderDir::Asc => ordering,
            OrderDir::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::{comparator::Comparator, value::Value},
        execution::expr::FilterExpr,
        records::column::Column,
    };

    const SNAPSHOT: &str = r#"{
        "reports": [
            {"report_id": 1, "created_at": "2024-02-01T00:00:00", "uploaded_at": "2024-02-01T00:00:00"},
            {"report_id": 2, "created_at": "2024-01-01T00:00:00", "uploaded_at": "2024-01-01T00:00:00"}
        ],
        "report_meta": [
            {"report_meta_id": 1, "report_id": 1, "report_meta_key": "run", "report_meta_value": "a"}
        ],
        "samples": [
            {"sample_id": 10, "sample_name": "late", "report_id": 1},
            {"sample_id": 20, "sample_name": "early", "report_id": 2}
        ],
        "data_types": [
            {"sample_data_type_id": 100, "data_key": "percent_gc"}
        ],
        "sample_data": [
            {"sample_data_id": 1, "sample_data_type_id": 100, "sample_id": 10, "value": "40"},
            {"sample_data_id": 2, "sample_data_type_id": 100, "sample_id": 20, "value": "50"}
        ]
    }"#;

    fn store() -> MemoryStore {
        MemoryStore::new(Snapshot::from_json(SNAPSHOT).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_projects_and_orders() {
        let query = SampleQuery::unfiltered()
            .select(vec![Column::SampleName, Column::SampleDataValue])
            .order_by(Column::ReportCreatedAt, OrderDir::Asc);

        let rows = store().fetch(&query).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_value(Column::SampleName), Value::from("early"));
        assert_eq!(rows[1].get_value(Column::SampleDataValue), Value::from("40"));
        assert_eq!(rows[0].field_values.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_filters() {
        let query = SampleQuery::new(Some(FilterExpr::compare(
            Column::SampleName,
            Comparator::Equal,
            "late",
        )));

        let rows = store().fetch(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value(Column::ReportId), Value::Int(1));
    }

    #[tokio::test]
    async fn test_delete_report_cascades() {
        let store = store();
        assert!(store.delete_report(1).await);
        assert!(!store.delete_report(1).await);

        let rows = store.fetch(&SampleQuery::unfiltered()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value(Column::SampleId), Value::Int(20));

        let snapshot = store.snapshot.read().await;
        assert!(snapshot.report_meta.is_empty());
        assert_eq!(snapshot.samples.len(), 1);
    }
}
