use crate::{
    core::{comparator::Comparator, value::Value},
    records::column::Column,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-independent boolean expression over the sample join.
///
/// Stores lower this tree into their own filter representation; it never
/// references a dialect or a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// A single leaf condition
    Leaf(Condition),

    /// An AND of 1+ sub‐expressions
    And(Vec<FilterExpr>),

    /// An OR of 1+ sub‐expressions
    Or(Vec<FilterExpr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `column op value` evaluated on the joined row itself.
    Compare {
        column: Column,
        op: Comparator,
        value: Value,
    },

    /// The row's report has a `report_meta` entry named `key` whose value
    /// passes `test`.
    ReportMeta { key: String, test: ValueTest },

    /// The row's sample has a metric named `key` (optionally restricted to
    /// one section) whose value passes `test`.
    SampleMeta {
        key: String,
        section: Option<String>,
        test: ValueTest,
    },
}

/// Comparison of a stored text value against an operand.
///
/// Ordering comparators carry a `Value::Float` operand and require the stored
/// text to parse as a number; equality and membership compare text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTest {
    pub op: Comparator,
    pub operand: Value,
}

impl ValueTest {
    pub fn new(op: Comparator, operand: Value) -> Self {
        Self { op, operand }
    }

    pub fn is_numeric(&self) -> bool {
        self.op.is_ordering()
    }
}

impl FilterExpr {
    pub fn leaf(cond: Condition) -> Self {
        FilterExpr::Leaf(cond)
    }

    pub fn compare(column: Column, op: Comparator, value: impl Into<Value>) -> Self {
        FilterExpr::Leaf(Condition::Compare {
            column,
            op,
            value: value.into(),
        })
    }

    /// Conjunction; a single child is returned as is.
    pub fn and(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            FilterExpr::And(exprs)
        }
    }

    /// Disjunction; a single child is returned as is.
    pub fn or(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            FilterExpr::Or(exprs)
        }
    }

    /// Number of leaf conditions in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterExpr::Leaf(_) => 1,
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                children.iter().map(FilterExpr::leaf_count).sum()
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { column, op, value } => write!(f, "{column} {op} {value}"),
            Condition::ReportMeta { key, test } => {
                write!(f, "report_meta[{key}] {} {}", test.op, test.operand)
            }
            Condition::SampleMeta { key, section, test } => match section {
                Some(section) => write!(
                    f,
                    "sample_data[{section}/{key}] {} {}",
                    test.op, test.operand
                ),
                None => write!(f, "sample_data[{key}] {} {}", test.op, test.operand),
            },
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Leaf(cond) => write!(f, "{cond}"),
            FilterExpr::And(exprs) => {
                let exprs = exprs.iter().map(|e| e.to_string()).collect::<Vec<_>>();
                write!(f, "({})", exprs.join(" AND "))
            }
            FilterExpr::Or(exprs) => {
                let exprs = exprs.iter().map(|e| e.to_string()).collect::<Vec<_>>();
                write!(f, "({})", exprs.join(" OR "))
            }
        }
    }
}
