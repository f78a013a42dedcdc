use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;

pub fn qual_ident(qualifier: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(qualifier.to_string()),
        name: name.to_string(),
    })
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}
