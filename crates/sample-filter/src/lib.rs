//! Compiles user-authored sample filters into deferred queries over the
//! QC sample join, and builds trend series from them.

pub mod compiler;
pub mod count;
pub mod error;
pub mod predicate;
pub mod spec;
pub mod trend;

pub use compiler::{compile, compile_json, compile_now};
pub use count::count_samples;
pub use error::FilterError;
pub use spec::FilterSpec;
pub use trend::{PlotSeries, build_series, metric_query, trend_series};
