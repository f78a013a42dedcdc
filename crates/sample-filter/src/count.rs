use crate::error::FilterError;
use connectors::store::SampleStore;
use model::{execution::query::SampleQuery, records::column::Column};
use std::collections::HashSet;

/// Number of distinct samples `query` matches.
pub async fn count_samples<S>(store: &S, query: &SampleQuery) -> Result<usize, FilterError>
where
    S: SampleStore + ?Sized,
{
    let rows = store
        .fetch(&query.clone().select(vec![Column::SampleId]))
        .await?;

    Ok(rows
        .iter()
        .map(|row| row.get_value(Column::SampleId))
        .collect::<HashSet<_>>()
        .len())
}
