//! Parsing of the JSON filter specification.
//!
//! A specification is a list of groups, each a list of predicate objects:
//!
//! ```json
//! [
//!   [{"type": "daterange", "value": ["2024-01-01", "2024-01-31"], "cmp": "in"}],
//!   [{"type": "reportmeta", "key": "instrument", "value": ["hiseq"], "cmp": "not in"}]
//! ]
//! ```
//!
//! Predicates in a group are ANDed, groups are ORed.

use crate::{
    error::FilterError,
    predicate::{DateWindow, Membership, Predicate},
};
use chrono::NaiveDate;
use model::{
    core::{comparator::Comparator, value::Value},
    execution::expr::ValueTest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A predicate object as it arrives on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPredicate {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<JsonValue>,
    pub cmp: Option<String>,
    pub key: Option<String>,
    pub section: Option<String>,
}

/// A fully validated filter specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub groups: Vec<Vec<Predicate>>,
}

impl FilterSpec {
    pub fn from_json(text: &str) -> Result<Self, FilterError> {
        let raw = serde_json::from_str::<Vec<Vec<RawPredicate>>>(text)
            .map_err(|e| FilterError::MalformedFilterSpec(e.to_string()))?;
        Self::from_raw(&raw)
    }

    /// Validates every predicate; the first failure rejects the whole
    /// specification.
    pub fn from_raw(groups: &[Vec<RawPredicate>]) -> Result<Self, FilterError> {
        let groups = groups
            .iter()
            .map(|group| group.iter().map(parse_predicate).collect())
            .collect::<Result<Vec<Vec<_>>, _>>()?;
        Ok(FilterSpec { groups })
    }

    /// True when the specification selects every row: no groups, or any
    /// group without predicates.
    pub fn is_identity(&self) -> bool {
        self.groups.is_empty() || self.groups.iter().any(Vec::is_empty)
    }
}

pub fn parse_predicate(raw: &RawPredicate) -> Result<Predicate, FilterError> {
    let kind = raw
        .kind
        .as_deref()
        .ok_or_else(|| malformed("predicate is missing 'type'"))?;

    match kind {
        "daterange" => {
            let membership = parse_membership(raw)?;
            let (start, end) = parse_date_pair(required_value(raw)?)?;
            Ok(Predicate::Date {
                window: DateWindow::Calendar { start, end },
                membership,
            })
        }
        "timedelta" => {
            let membership = parse_membership(raw)?;
            let days = parse_days(required_value(raw)?)?;
            Ok(Predicate::Date {
                window: DateWindow::Trailing { days },
                membership,
            })
        }
        "reportmeta" => Ok(Predicate::ReportMeta {
            key: required_key(raw)?,
            test: parse_value_test(raw)?,
        }),
        "samplemeta" => Ok(Predicate::SampleMeta {
            key: required_key(raw)?,
            section: raw.section.clone().filter(|s| !s.is_empty()),
            test: parse_value_test(raw)?,
        }),
        other => Err(FilterError::UnsupportedPredicate {
            kind: other.to_string(),
        }),
    }
}

fn malformed(message: impl Into<String>) -> FilterError {
    FilterError::MalformedFilterSpec(message.into())
}

fn required_value(raw: &RawPredicate) -> Result<&JsonValue, FilterError> {
    match &raw.value {
        Some(JsonValue::Null) | None => Err(malformed("predicate is missing 'value'")),
        Some(value) => Ok(value),
    }
}

fn required_cmp(raw: &RawPredicate) -> Result<&str, FilterError> {
    raw.cmp
        .as_deref()
        .ok_or_else(|| malformed("predicate is missing 'cmp'"))
}

fn required_key(raw: &RawPredicate) -> Result<String, FilterError> {
    match raw.key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(malformed("metadata predicate is missing 'key'")),
    }
}

// The filter builder UI sends `le` for "Within dates" and `gt` for
// "Except dates".
fn parse_membership(raw: &RawPredicate) -> Result<Membership, FilterError> {
    let cmp = required_cmp(raw)?;
    match cmp.trim().to_ascii_lowercase().as_str() {
        "in" | "le" => Ok(Membership::In),
        "not in" | "gt" => Ok(Membership::NotIn),
        _ => Err(malformed(format!(
            "unsupported comparison '{cmp}' for a date predicate"
        ))),
    }
}

fn parse_date_pair(value: &JsonValue) -> Result<(NaiveDate, NaiveDate), FilterError> {
    let JsonValue::Array(items) = value else {
        return Err(malformed("daterange value must be a [start, end] pair"));
    };
    let [start, end] = items.as_slice() else {
        return Err(malformed("daterange value must be a [start, end] pair"));
    };
    Ok((parse_date(start)?, parse_date(end)?))
}

fn parse_date(value: &JsonValue) -> Result<NaiveDate, FilterError> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed(format!("expected a YYYY-MM-DD date, got {value}")))?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| malformed(format!("invalid date '{text}': {e}")))
}

fn parse_days(value: &JsonValue) -> Result<u32, FilterError> {
    let days = match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    days.and_then(|d| u32::try_from(d).ok()).ok_or_else(|| {
        malformed(format!(
            "timedelta value must be a non-negative number of days, got {value}"
        ))
    })
}

fn parse_value_test(raw: &RawPredicate) -> Result<ValueTest, FilterError> {
    let cmp = required_cmp(raw)?;
    let op = cmp.parse::<Comparator>().map_err(malformed)?;
    let value = required_value(raw)?;

    let operand = if op.is_membership() {
        let items = match value {
            JsonValue::Array(items) => items
                .iter()
                .map(scalar_text)
                .collect::<Result<Vec<_>, _>>()?,
            scalar => vec![scalar_text(scalar)?],
        };
        if items.is_empty() {
            return Err(malformed(format!("'{op}' needs at least one value")));
        }
        Value::StringArray(items)
    } else if op.is_ordering() {
        let text = scalar_text(value)?;
        let number = text
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(format!("'{op}' needs a numeric value, got '{text}'")))?;
        Value::Float(number)
    } else {
        Value::String(scalar_text(value)?)
    };

    Ok(ValueTest::new(op, operand))
}

fn scalar_text(value: &JsonValue) -> Result<String, FilterError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(malformed(format!("expected a string or number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<FilterSpec, FilterError> {
        FilterSpec::from_json(text)
    }

    #[test]
    fn test_parses_every_kind() {
        let spec = parse(
            r#"[[
                {"type": "daterange", "value": ["2024-01-01", "2024-01-31"], "cmp": "in"},
                {"type": "timedelta", "value": "7", "cmp": "gt"},
                {"type": "reportmeta", "key": "instrument", "value": "hiseq", "cmp": "not in"},
                {"type": "samplemeta", "key": "percent_gc", "section": "fastqc", "value": 40, "cmp": "ge"}
            ]]"#,
        )
        .unwrap();

        let group = &spec.groups[0];
        assert_eq!(
            group[0],
            Predicate::Date {
                window: DateWindow::Calendar {
                    start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                },
                membership: Membership::In,
            }
        );
        assert_eq!(
            group[1],
            Predicate::Date {
                window: DateWindow::Trailing { days: 7 },
                membership: Membership::NotIn,
            }
        );
        assert_eq!(
            group[2],
            Predicate::ReportMeta {
                key: "instrument".into(),
                test: ValueTest::new(
                    Comparator::NotIn,
                    Value::StringArray(vec!["hiseq".into()])
                ),
            }
        );
        assert_eq!(
            group[3],
            Predicate::SampleMeta {
                key: "percent_gc".into(),
                section: Some("fastqc".into()),
                test: ValueTest::new(Comparator::GreaterThanOrEqual, Value::Float(40.0)),
            }
        );
    }

    #[test]
    fn test_identity_specs() {
        assert!(parse("[]").unwrap().is_identity());
        assert!(parse("[[]]").unwrap().is_identity());
        assert!(
            !parse(r#"[[{"type": "timedelta", "value": 1, "cmp": "in"}]]"#)
                .unwrap()
                .is_identity()
        );
    }

    #[test]
    fn test_unknown_type_is_named() {
        let err = parse(r#"[[{"type": "userid", "value": 1, "cmp": "in"}]]"#).unwrap_err();
        match err {
            FilterError::UnsupportedPredicate { kind } => assert_eq!(kind, "userid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_specs() {
        let cases = [
            r#"{"type": "daterange"}"#,
            r#"[{"type": "daterange"}]"#,
            r#"[[{"value": 1, "cmp": "in"}]]"#,
            r#"[[{"type": "timedelta", "cmp": "in"}]]"#,
            r#"[[{"type": "timedelta", "value": 3}]]"#,
            r#"[[{"type": "timedelta", "value": -3, "cmp": "in"}]]"#,
            r#"[[{"type": "timedelta", "value": 3, "cmp": "eq"}]]"#,
            r#"[[{"type": "daterange", "value": ["2024-01-01"], "cmp": "in"}]]"#,
            r#"[[{"type": "daterange", "value": ["2024-13-01", "2024-12-31"], "cmp": "in"}]]"#,
            r#"[[{"type": "reportmeta", "value": "x", "cmp": "="}]]"#,
            r#"[[{"type": "reportmeta", "key": "k", "value": [], "cmp": "in"}]]"#,
            r#"[[{"type": "reportmeta", "key": "k", "value": "deep", "cmp": "<"}]]"#,
            r#"[[{"type": "samplemeta", "key": "k", "value": "x", "cmp": "like"}]]"#,
            r#"[[{"type": "samplemeta", "key": "k", "value": {"a": 1}, "cmp": "="}]]"#,
        ];

        for case in cases {
            assert!(
                matches!(parse(case), Err(FilterError::MalformedFilterSpec(_))),
                "expected {case} to be rejected"
            );
        }
    }

    #[test]
    fn test_first_error_rejects_whole_spec() {
        let err = parse(
            r#"[
                [{"type": "timedelta", "value": 1, "cmp": "in"}],
                [{"type": "bogus"}]
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedPredicate { .. }));
    }
}
