use crate::{
    compiler::FilterCompiler,
    error::StoreError,
    memory::snapshot::{JoinedRow, SnapshotIndex},
};
use model::{
    core::{comparator::Comparator, value::Value},
    execution::expr::{Condition, FilterExpr, ValueTest},
    records::column::Column,
};

/// A snapshot-side filter: holds an optional expression tree.
#[derive(Clone, Debug, Default)]
pub struct MemoryFilter {
    expr: Option<MemoryFilterExpr>,
}

/// An expression over one or more leaf conditions.
#[derive(Clone, Debug)]
pub enum MemoryFilterExpr {
    Leaf(MemoryCondition),
    And(Vec<MemoryFilterExpr>),
    Or(Vec<MemoryFilterExpr>),
}

#[derive(Clone, Debug)]
pub enum MemoryCondition {
    Compare {
        column: Column,
        op: Comparator,
        value: Value,
    },
    ReportMeta {
        key: String,
        test: MemoryTest,
    },
    SampleMeta {
        key: String,
        section: Option<String>,
        test: MemoryTest,
    },
}

/// How a stored metadata value is tested.
#[derive(Clone, Debug)]
pub enum MemoryTest {
    Text { op: Comparator, operand: Value },
    Numeric { op: Comparator, operand: f64 },
}

impl MemoryTest {
    /// Tests one stored value. A `None` value never matches; text that
    /// cannot be read as a number fails a numeric test with an error.
    fn test(&self, key: &str, stored: Option<&str>) -> Result<bool, StoreError> {
        let Some(stored) = stored else {
            return Ok(false);
        };

        match self {
            MemoryTest::Text { op, operand } => {
                Ok(op.test(&Value::String(stored.to_string()), operand))
            }
            MemoryTest::Numeric { op, operand } => {
                let actual = stored.trim().parse::<f64>().map_err(|_| {
                    StoreError::ValueConversion {
                        field: key.to_string(),
                        value: stored.to_string(),
                    }
                })?;
                Ok(op.test(&Value::Float(actual), &Value::Float(*operand)))
            }
        }
    }
}

impl MemoryFilter {
    pub fn new() -> Self {
        MemoryFilter { expr: None }
    }

    pub fn with_expr(expr: MemoryFilterExpr) -> Self {
        MemoryFilter { expr: Some(expr) }
    }

    /// Returns true if this row passes the filter (or if there's no filter).
    pub fn eval(&self, row: &JoinedRow, index: &SnapshotIndex) -> Result<bool, StoreError> {
        match &self.expr {
            Some(expr) => expr.eval(row, index),
            None => Ok(true),
        }
    }
}

impl MemoryFilterExpr {
    /// Recursively evaluate this expression against one joined row.
    ///
    /// Groups stop at the first child that decides them, so a conversion
    /// error in a later child is not reached.
    pub fn eval(&self, row: &JoinedRow, index: &SnapshotIndex) -> Result<bool, StoreError> {
        match self {
            MemoryFilterExpr::Leaf(cond) => cond.eval(row, index),
            MemoryFilterExpr::And(children) => {
                for child in children {
                    if !child.eval(row, index)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            MemoryFilterExpr::Or(children) => {
                for child in children {
                    if child.eval(row, index)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl MemoryCondition {
    fn eval(&self, row: &JoinedRow, index: &SnapshotIndex) -> Result<bool, StoreError> {
        match self {
            MemoryCondition::Compare { column, op, value } => {
                let actual = row.value_of(*column);
                // NULL never satisfies a comparison, as in SQL.
                Ok(!actual.is_null() && op.test(&actual, value))
            }
            MemoryCondition::ReportMeta { key, test } => {
                for meta in index.report_meta(row.report.report_id) {
                    if meta.report_meta_key == *key
                        && test.test(key, Some(&meta.report_meta_value))?
                    {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            MemoryCondition::SampleMeta { key, section, test } => {
                for (data, data_type) in index.sample_metrics(row.sample.sample_id) {
                    if data_type.data_key != *key {
                        continue;
                    }
                    if section.is_some() && data_type.data_section != *section {
                        continue;
                    }
                    if test.test(key, data.value.as_deref())? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

pub struct MemoryFilterCompiler;

impl FilterCompiler for MemoryFilterCompiler {
    type Filter = MemoryFilter;

    fn compile(&self, expr: &FilterExpr) -> Result<MemoryFilter, StoreError> {
        Ok(MemoryFilter::with_expr(compile_memory_expr(expr)?))
    }
}

fn compile_memory_expr(expr: &FilterExpr) -> Result<MemoryFilterExpr, StoreError> {
    match expr {
        FilterExpr::Leaf(cond) => Ok(MemoryFilterExpr::Leaf(compile_condition(cond)?)),
        FilterExpr::And(children) => Ok(MemoryFilterExpr::And(compile_children(children)?)),
        FilterExpr::Or(children) => Ok(MemoryFilterExpr::Or(compile_children(children)?)),
    }
}

fn compile_children(children: &[FilterExpr]) -> Result<Vec<MemoryFilterExpr>, StoreError> {
    if children.is_empty() {
        return Err(StoreError::QueryBuild(
            "Filter groups must have at least one condition.".to_string(),
        ));
    }
    children.iter().map(compile_memory_expr).collect()
}

fn compile_condition(cond: &Condition) -> Result<MemoryCondition, StoreError> {
    let condition = match cond {
        Condition::Compare { column, op, value } => MemoryCondition::Compare {
            column: *column,
            op: *op,
            value: value.clone(),
        },
        Condition::ReportMeta { key, test } => MemoryCondition::ReportMeta {
            key: key.clone(),
            test: compile_test(test)?,
        },
        Condition::SampleMeta { key, section, test } => MemoryCondition::SampleMeta {
            key: key.clone(),
            section: section.clone(),
            test: compile_test(test)?,
        },
    };
    Ok(condition)
}

fn compile_test(test: &ValueTest) -> Result<MemoryTest, StoreError> {
    if !test.is_numeric() {
        return Ok(MemoryTest::Text {
            op: test.op,
            operand: test.operand.clone(),
        });
    }

    match test.operand {
        Value::Int(v) => Ok(MemoryTest::Numeric {
            op: test.op,
            operand: v as f64,
        }),
        Value::Float(v) => Ok(MemoryTest::Numeric {
            op: test.op,
            operand: v,
        }),
        ref other => Err(StoreError::QueryBuild(format!(
            "Ordering comparison '{}' needs a numeric operand, got {other}",
            test.op
        ))),
    }
}
