//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// The zero-sized state structs below enforce SQL clause order at compile time.

use crate::query::ast::{
    common::{JoinKind, OrderDir, TableRef},
    expr::{BinaryOp, BinaryOperator, Expr},
    select::{FromClause, JoinClause, OrderByExpr, Select},
};

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(String::from),
        });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Adds a `JOIN` clause to the query.
    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.ast.joins.push(JoinClause {
            kind,
            table,
            alias: alias.map(String::from),
            on,
        });
        self
    }

    /// Sets the `WHERE` clause, replacing any previous condition.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// ANDs `condition` onto the current `WHERE` clause.
    pub fn and_where(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => Expr::BinaryOp(Box::new(BinaryOp {
                left: existing,
                op: BinaryOperator::And,
                right: condition,
            })),
            None => condition,
        });
        self
    }

    /// Adds an `ORDER BY` clause to the query.
    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::{JoinKind, OrderDir},
            expr::{BinaryOperator, Expr},
        },
        builder::select::SelectBuilder,
        qual_ident, value,
    };
    use crate::{binary, table_ref};
    use model::core::value::Value;

    #[test]
    fn test_build_simple_select() {
        let ast = SelectBuilder::new()
            .select(vec![qual_ident("s", "sample_id")])
            .from(table_ref!("sample"), Some("s"))
            .build();

        assert_eq!(ast.columns, vec![qual_ident("s", "sample_id")]);
        assert_eq!(ast.from.unwrap().table.name, "sample");
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_and_where_chains_conditions() {
        let first = binary!(
            qual_ident("sdt", "data_key"),
            Eq,
            value(Value::from("gc"))
        );
        let second = binary!(
            qual_ident("s", "sample_name"),
            NotEq,
            value(Value::from("ctrl"))
        );

        let ast = SelectBuilder::new()
            .select(vec![qual_ident("s", "sample_id")])
            .from(table_ref!("sample"), Some("s"))
            .and_where(first.clone())
            .and_where(second.clone())
            .build();

        match ast.where_clause {
            Some(Expr::BinaryOp(op)) => {
                assert_eq!(op.op, BinaryOperator::And);
                assert_eq!(op.left, first);
                assert_eq!(op.right, second);
            }
            other => panic!("unexpected where clause: {other:?}"),
        }
    }

    #[test]
    fn test_build_with_join_and_ordering() {
        let ast = SelectBuilder::new()
            .select(vec![qual_ident("r", "created_at"), qual_ident("sd", "value")])
            .from(table_ref!("sample"), Some("s"))
            .join(
                JoinKind::Inner,
                table_ref!("report"),
                Some("r"),
                binary!(qual_ident("r", "report_id"), Eq, qual_ident("s", "report_id")),
            )
            .order_by(qual_ident("r", "created_at"), Some(OrderDir::Asc))
            .build();

        assert_eq!(ast.joins.len(), 1);
        assert_eq!(ast.order_by.len(), 1);
        assert_eq!(ast.order_by[0].direction, Some(OrderDir::Asc));
    }
}
