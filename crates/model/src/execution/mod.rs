pub mod expr;
pub mod query;
