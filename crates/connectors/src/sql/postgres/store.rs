use crate::{
    error::StoreError,
    sql::{
        generator::QueryGenerator,
        postgres::{params::PgParamStore, utils::connect_client},
    },
    store::SampleStore,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use model::{
    core::value::Value,
    execution::{
        expr::{Condition, FilterExpr},
        query::SampleQuery,
    },
    records::{
        column::{Column, ColumnType},
        row::{FieldValue, RowData},
    },
};
use planner::query::dialect;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, Row, error::SqlState};
use tracing::debug;

/// Runs sample queries against a PostgreSQL database holding the QC schema.
#[derive(Clone)]
pub struct PgStore {
    client: Arc<RwLock<Client>>,
    dialect: dialect::Postgres,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Arc::new(RwLock::new(connect_client(url).await?));
        Ok(PgStore {
            client,
            dialect: dialect::Postgres,
        })
    }

    /// The statement and bindings `fetch` would execute for `query`.
    pub fn sql_for(&self, query: &SampleQuery) -> Result<(String, Vec<Value>), StoreError> {
        QueryGenerator::new(&self.dialect).select(query)
    }
}

#[async_trait]
impl SampleStore for PgStore {
    async fn fetch(&self, query: &SampleQuery) -> Result<Vec<RowData>, StoreError> {
        let (sql, params) = self.sql_for(query)?;
        debug!(%sql, params = params.len(), "Executing sample query");

        let bindings = PgParamStore::from_values(params);
        let client = self.client.read().await;
        let rows = client
            .query(&sql, &bindings.as_refs())
            .await
            .map_err(|e| query_error(e, query))?;

        let columns = query.columns();
        rows.iter().map(|row| decode_row(row, &columns)).collect()
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

// A numeric comparison casts stored text; PostgreSQL rejects text that is
// not a number with 22P02 before any row is returned.
fn query_error(err: tokio_postgres::Error, query: &SampleQuery) -> StoreError {
    let conversion = err
        .as_db_error()
        .filter(|db| *db.code() == SqlState::INVALID_TEXT_REPRESENTATION)
        .and_then(|db| conversion_error(db.message(), query));
    conversion.unwrap_or(StoreError::Postgres(err))
}

/// Rebuilds the failed cast as a conversion error naming the metadata key(s)
/// compared numerically by `query` and the rejected text quoted in `message`.
fn conversion_error(message: &str, query: &SampleQuery) -> Option<StoreError> {
    let keys = query
        .predicate()
        .map(|expr| numeric_keys(&expr))
        .unwrap_or_default();
    if keys.is_empty() {
        return None;
    }

    let value = message
        .split_once('"')
        .and_then(|(_, rest)| rest.rsplit_once('"'))
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| message.to_string());

    Some(StoreError::ValueConversion {
        field: keys.join(", "),
        value,
    })
}

fn numeric_keys(expr: &FilterExpr) -> Vec<String> {
    let mut keys = Vec::new();
    collect_numeric_keys(expr, &mut keys);
    keys
}

fn collect_numeric_keys(expr: &FilterExpr, keys: &mut Vec<String>) {
    match expr {
        FilterExpr::Leaf(Condition::ReportMeta { key, test })
        | FilterExpr::Leaf(Condition::SampleMeta { key, test, .. }) => {
            if test.is_numeric() && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        FilterExpr::Leaf(Condition::Compare { .. }) => {}
        FilterExpr::And(children) | FilterExpr::Or(children) => {
            for child in children {
                collect_numeric_keys(child, keys);
            }
        }
    }
}

fn decode_row(row: &Row, columns: &[Column]) -> Result<RowData, StoreError> {
    let field_values = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            Ok(FieldValue {
                column: *column,
                value: decode_value(row, idx, *column)?,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(RowData::new(field_values))
}

fn decode_value(row: &Row, idx: usize, column: Column) -> Result<Value, StoreError> {
    let value = match column.column_type() {
        ColumnType::Id | ColumnType::NullableId => decode_id(row, idx, column)?
            .map(Value::Int)
            .unwrap_or(Value::Null),
        ColumnType::Timestamp => decode_timestamp(row, idx, column)?
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),
        ColumnType::Text | ColumnType::NullableText => row
            .try_get::<_, Option<String>>(idx)
            .map_err(|e| decode_error(column, e))?
            .map(Value::String)
            .unwrap_or(Value::Null),
    };
    Ok(value)
}

// Schemas created by different migrations use either INTEGER or BIGINT keys.
fn decode_id(row: &Row, idx: usize, column: Column) -> Result<Option<i64>, StoreError> {
    match row.try_get::<_, Option<i64>>(idx) {
        Ok(v) => Ok(v),
        Err(_) => row
            .try_get::<_, Option<i32>>(idx)
            .map(|v| v.map(i64::from))
            .map_err(|e| decode_error(column, e)),
    }
}

fn decode_timestamp(
    row: &Row,
    idx: usize,
    column: Column,
) -> Result<Option<NaiveDateTime>, StoreError> {
    match row.try_get::<_, Option<NaiveDateTime>>(idx) {
        Ok(v) => Ok(v),
        Err(_) => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map(|ts| ts.naive_utc()))
            .map_err(|e| decode_error(column, e)),
    }
}

fn decode_error(column: Column, err: tokio_postgres::Error) -> StoreError {
    StoreError::Decode {
        column: column.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::comparator::Comparator, execution::expr::ValueTest};

    const CAST_FAILURE: &str = r#"invalid input syntax for type double precision: "pass""#;

    fn sample_meta(key: &str, op: Comparator, operand: Value) -> FilterExpr {
        FilterExpr::leaf(Condition::SampleMeta {
            key: key.to_string(),
            section: None,
            test: ValueTest::new(op, operand),
        })
    }

    #[test]
    fn test_cast_failure_names_the_numeric_key_and_value() {
        let query = SampleQuery::new(Some(FilterExpr::Or(vec![
            sample_meta("status", Comparator::GreaterThan, Value::Float(1.0)),
            sample_meta("instrument", Comparator::Equal, Value::String("hiseq".into())),
        ])))
        .with_metric_key("percent_gc");

        match conversion_error(CAST_FAILURE, &query) {
            Some(StoreError::ValueConversion { field, value }) => {
                assert_eq!(field, "status");
                assert_eq!(value, "pass");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cast_failure_lists_every_numeric_key_once() {
        let query = SampleQuery::new(Some(FilterExpr::And(vec![
            sample_meta("depth", Comparator::GreaterThan, Value::Float(1.0)),
            sample_meta("depth", Comparator::LessThan, Value::Float(9.0)),
            FilterExpr::leaf(Condition::ReportMeta {
                key: "yield".to_string(),
                test: ValueTest::new(Comparator::GreaterThanOrEqual, Value::Float(2.0)),
            }),
        ])));

        match conversion_error(CAST_FAILURE, &query) {
            Some(StoreError::ValueConversion { field, .. }) => assert_eq!(field, "depth, yield"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_without_numeric_comparison_error_is_kept() {
        let query = SampleQuery::new(Some(sample_meta(
            "instrument",
            Comparator::In,
            Value::StringArray(vec!["hiseq".into()]),
        )));

        assert!(conversion_error(CAST_FAILURE, &query).is_none());
        assert!(conversion_error(CAST_FAILURE, &SampleQuery::unfiltered()).is_none());
    }
}
