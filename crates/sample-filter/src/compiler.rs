use crate::{error::FilterError, spec::FilterSpec};
use chrono::{NaiveDateTime, Utc};
use model::execution::{expr::FilterExpr, query::SampleQuery};
use tracing::debug;

/// Compiles a specification into a deferred query, evaluating relative
/// windows against `now`.
///
/// Nothing is executed; callers narrow, project and order the result before
/// handing it to a store.
pub fn compile(spec: &FilterSpec, now: NaiveDateTime) -> SampleQuery {
    if spec.is_identity() {
        debug!("Filter specification selects every row");
        return SampleQuery::unfiltered();
    }

    let filter = FilterExpr::or(
        spec.groups
            .iter()
            .map(|group| {
                FilterExpr::and(group.iter().map(|predicate| predicate.lower(now)).collect())
            })
            .collect(),
    );

    debug!(%filter, conditions = filter.leaf_count(), "Compiled sample filter");
    SampleQuery::new(Some(filter))
}

pub fn compile_json(text: &str, now: NaiveDateTime) -> Result<SampleQuery, FilterError> {
    let spec = FilterSpec::from_json(text)?;
    Ok(compile(&spec, now))
}

/// [`compile`] evaluated at the current UTC time.
pub fn compile_now(spec: &FilterSpec) -> SampleQuery {
    compile(spec, Utc::now().naive_utc())
}
