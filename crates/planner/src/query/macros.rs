#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::query::ast::common::TableRef {
            schema: None,
            name: $name.to_string(),
        }
    };
    ($schema:expr, $name:expr) => {
        $crate::query::ast::common::TableRef {
            schema: Some($schema.to_string()),
            name: $name.to_string(),
        }
    };
}

/// Builds a `BinaryOp` expression: `binary!(left, Eq, right)`.
#[macro_export]
macro_rules! binary {
    ($left:expr, $op:ident, $right:expr) => {
        $crate::query::ast::expr::Expr::BinaryOp(Box::new($crate::query::ast::expr::BinaryOp {
            left: $left,
            op: $crate::query::ast::expr::BinaryOperator::$op,
            right: $right,
        }))
    };
}
