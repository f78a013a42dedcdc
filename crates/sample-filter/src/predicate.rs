//! Typed predicates and their lowering into filter expressions.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use model::{
    core::comparator::Comparator,
    execution::expr::{Condition, FilterExpr, ValueTest},
    records::column::Column,
};
use std::fmt;

/// Whether a date predicate keeps rows inside or outside its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    In,
    NotIn,
}

/// A closed interval of report creation times. A missing `start` leaves the
/// interval open towards the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Option<NaiveDateTime>,
    pub end: NaiveDateTime,
}

impl Interval {
    /// From the first instant of `start` to the last microsecond of `end`.
    pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> Self {
        Interval {
            start: Some(start.and_time(NaiveTime::MIN)),
            end: end.and_time(NaiveTime::MIN) + (Duration::days(1) - Duration::microseconds(1)),
        }
    }

    /// The `days` days leading up to `now`, both ends included. A window
    /// reaching past the earliest representable time has no lower bound.
    pub fn trailing_days(days: u32, now: NaiveDateTime) -> Self {
        Interval {
            start: now.checked_sub_signed(Duration::days(i64::from(days))),
            end: now,
        }
    }

    /// `In` keeps `start <= created_at <= end`. `NotIn` reuses the same two
    /// bounds with each operator negated and the pair joined by OR, so the
    /// two memberships partition every row.
    pub fn lower(&self, membership: Membership) -> FilterExpr {
        let bounds = self
            .start
            .map(|start| (Comparator::GreaterThanOrEqual, start))
            .into_iter()
            .chain([(Comparator::LessThanOrEqual, self.end)]);

        match membership {
            Membership::In => FilterExpr::and(
                bounds
                    .map(|(op, bound)| FilterExpr::compare(Column::ReportCreatedAt, op, bound))
                    .collect(),
            ),
            Membership::NotIn => FilterExpr::or(
                bounds
                    .map(|(op, bound)| {
                        FilterExpr::compare(Column::ReportCreatedAt, op.negate(), bound)
                    })
                    .collect(),
            ),
        }
    }
}

/// How a date predicate derives its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// `daterange`: whole calendar days from `start` to `end`.
    Calendar { start: NaiveDate, end: NaiveDate },

    /// `timedelta`: the last `days` days before evaluation time.
    Trailing { days: u32 },
}

impl DateWindow {
    pub fn interval(&self, now: NaiveDateTime) -> Interval {
        match self {
            DateWindow::Calendar { start, end } => Interval::calendar_days(*start, *end),
            DateWindow::Trailing { days } => Interval::trailing_days(*days, now),
        }
    }
}

/// One parsed predicate of a filter specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Reports created inside (or outside) a window.
    Date {
        window: DateWindow,
        membership: Membership,
    },

    /// Reports carrying a metadata entry `key` whose value passes `test`.
    ReportMeta { key: String, test: ValueTest },

    /// Samples with a metric `key` whose value passes `test`.
    SampleMeta {
        key: String,
        section: Option<String>,
        test: ValueTest,
    },
}

impl Predicate {
    pub fn lower(&self, now: NaiveDateTime) -> FilterExpr {
        match self {
            Predicate::Date { window, membership } => window.interval(now).lower(*membership),
            Predicate::ReportMeta { key, test } => FilterExpr::leaf(Condition::ReportMeta {
                key: key.clone(),
                test: test.clone(),
            }),
            Predicate::SampleMeta { key, section, test } => {
                FilterExpr::leaf(Condition::SampleMeta {
                    key: key.clone(),
                    section: section.clone(),
                    test: test.clone(),
                })
            }
        }
    }

    /// The wire name of this predicate's type.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Date {
                window: DateWindow::Calendar { .. },
                ..
            } => "daterange",
            Predicate::Date {
                window: DateWindow::Trailing { .. },
                ..
            } => "timedelta",
            Predicate::ReportMeta { .. } => "reportmeta",
            Predicate::SampleMeta { .. } => "samplemeta",
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::In => f.write_str("in"),
            Membership::NotIn => f.write_str("not in"),
        }
    }
}
