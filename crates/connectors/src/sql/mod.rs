pub mod filter;
pub mod generator;
pub mod postgres;

use model::records::column::Column;
use planner::query::{ast::expr::Expr, qual_ident};

/// Qualified identifier of `column` in the main sample join.
pub(crate) fn column_ident(column: Column) -> Expr {
    qual_ident(column.table().alias(), column.name())
}
