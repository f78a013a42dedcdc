use crate::{
    core::comparator::Comparator,
    execution::expr::FilterExpr,
    records::column::Column,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: Column,
    pub direction: OrderDir,
}

/// A deferred query over the sample join.
///
/// Building a `SampleQuery` never touches storage. Callers narrow, project
/// and order it, then hand it to a store for execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleQuery {
    /// The compiled filter specification; `None` is the identity filter.
    pub filter: Option<FilterExpr>,

    /// Extra conditions ANDed onto the filter by the caller.
    pub restrictions: Vec<FilterExpr>,

    /// Columns to return. Empty selects every column of the join.
    pub projection: Vec<Column>,

    pub order_by: Vec<OrderBy>,
}

impl SampleQuery {
    pub fn new(filter: Option<FilterExpr>) -> Self {
        SampleQuery {
            filter,
            ..Default::default()
        }
    }

    /// The query that returns the whole join.
    pub fn unfiltered() -> Self {
        SampleQuery::default()
    }

    pub fn restrict(mut self, expr: FilterExpr) -> Self {
        self.restrictions.push(expr);
        self
    }

    /// Narrows the query to values of a single metric.
    pub fn with_metric_key(self, key: &str) -> Self {
        self.restrict(FilterExpr::compare(
            Column::DataTypeKey,
            Comparator::Equal,
            key,
        ))
    }

    pub fn select(mut self, columns: Vec<Column>) -> Self {
        self.projection = columns;
        self
    }

    pub fn order_by(mut self, column: Column, direction: OrderDir) -> Self {
        self.order_by.push(OrderBy { column, direction });
        self
    }

    /// Projected columns, in output order.
    pub fn columns(&self) -> Vec<Column> {
        if self.projection.is_empty() {
            Column::ALL.to_vec()
        } else {
            self.projection.clone()
        }
    }

    /// Filter and restrictions folded into one expression.
    pub fn predicate(&self) -> Option<FilterExpr> {
        let mut parts = Vec::with_capacity(self.restrictions.len() + 1);
        if let Some(filter) = &self.filter {
            parts.push(filter.clone());
        }
        parts.extend(self.restrictions.iter().cloned());

        if parts.is_empty() {
            None
        } else {
            Some(FilterExpr::and(parts))
        }
    }
}
