//! Defines the AST for SQL expressions.

use crate::query::ast::select::Select;
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `report` or `r.created_at`.
    Identifier(Ident),

    /// A bound parameter value.
    Value(Value),

    /// Raw SQL emitted verbatim, e.g. the `1` in `SELECT 1`.
    Literal(String),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// `CAST(expr AS type)`
    Cast { expr: Box<Expr>, data_type: String },

    /// `expr [NOT] IN (a, b, ...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `CASE WHEN condition THEN then END`
    CaseWhen {
        condition: Box<Expr>,
        then: Box<Expr>,
    },

    /// `EXISTS (subquery)`
    Exists(Box<Select>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'r' in 'r.created_at'
    pub name: String,              // e.g., the 'created_at' in 'r.created_at'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
}

impl Expr {
    /// Left-folds `exprs` with `op`. Returns `None` for an empty list.
    pub fn fold(exprs: Vec<Expr>, op: BinaryOperator) -> Option<Expr> {
        let mut iter = exprs.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |left, right| {
            Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
        }))
    }
}
