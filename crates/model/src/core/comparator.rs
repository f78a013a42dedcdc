use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Comparison applied by a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
}

impl Comparator {
    /// The comparator that selects exactly the rows this one rejects.
    pub fn negate(self) -> Self {
        match self {
            Comparator::Equal => Comparator::NotEqual,
            Comparator::NotEqual => Comparator::Equal,
            Comparator::GreaterThan => Comparator::LessThanOrEqual,
            Comparator::GreaterThanOrEqual => Comparator::LessThan,
            Comparator::LessThan => Comparator::GreaterThanOrEqual,
            Comparator::LessThanOrEqual => Comparator::GreaterThan,
            Comparator::In => Comparator::NotIn,
            Comparator::NotIn => Comparator::In,
        }
    }

    /// Ordering comparators need both sides to be numeric or temporal.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Comparator::GreaterThan
                | Comparator::GreaterThanOrEqual
                | Comparator::LessThan
                | Comparator::LessThanOrEqual
        )
    }

    pub fn is_membership(self) -> bool {
        matches!(self, Comparator::In | Comparator::NotIn)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::LessThan => "<",
            Comparator::LessThanOrEqual => "<=",
            Comparator::In => "in",
            Comparator::NotIn => "not in",
        }
    }

    /// Applies the comparator. Values that cannot be compared never match,
    /// except under `NotEqual`/`NotIn`, which are the complements of
    /// `Equal`/`In`.
    pub fn test(&self, actual: &Value, target: &Value) -> bool {
        match self {
            Comparator::Equal => actual.equal(target),
            Comparator::NotEqual => !actual.equal(target),

            Comparator::GreaterThan => matches!(actual.compare(target), Some(Ordering::Greater)),
            Comparator::GreaterThanOrEqual => matches!(
                actual.compare(target),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            Comparator::LessThan => matches!(actual.compare(target), Some(Ordering::Less)),
            Comparator::LessThanOrEqual => matches!(
                actual.compare(target),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),

            Comparator::In => contains(target, actual),
            Comparator::NotIn => !contains(target, actual),
        }
    }
}

fn contains(set: &Value, item: &Value) -> bool {
    match (set, item) {
        (Value::StringArray(items), Value::String(s)) => items.iter().any(|i| i == s),
        (Value::StringArray(_), _) => false,
        (single, item) => single.equal(item),
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Comparator::Equal),
            "!=" | "<>" | "ne" => Ok(Comparator::NotEqual),
            ">" | "gt" => Ok(Comparator::GreaterThan),
            ">=" | "ge" => Ok(Comparator::GreaterThanOrEqual),
            "<" | "lt" => Ok(Comparator::LessThan),
            "<=" | "le" => Ok(Comparator::LessThanOrEqual),
            "in" => Ok(Comparator::In),
            "not in" | "not_in" | "notin" => Ok(Comparator::NotIn),
            _ => Err(format!("Unsupported comparator: {s}")),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
