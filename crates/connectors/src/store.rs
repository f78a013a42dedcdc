use crate::error::StoreError;
use async_trait::async_trait;
use model::{execution::query::SampleQuery, records::row::RowData};

/// Read-only access to the sample join.
///
/// Implementations compile the query's filter into their own representation
/// at execution time, so one `SampleQuery` can run against any store.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Executes `query` and returns the projected rows in the query's order.
    async fn fetch(&self, query: &SampleQuery) -> Result<Vec<RowData>, StoreError>;

    fn name(&self) -> &str;
}
