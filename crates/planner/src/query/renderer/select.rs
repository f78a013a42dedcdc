use crate::query::{
    ast::{
        common::{JoinKind, OrderDir, TableRef},
        select::{FromClause, JoinClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. JOIN
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 4. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 5. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                order.render(r);
            }
        }
    }
}

impl Render for TableRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.schema {
            r.push_identifier(schema);
            r.sql.push('.');
        }
        r.push_identifier(&self.name);
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        let join_str = match self.kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        };
        r.sql.push_str(&format!("{join_str} "));
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::{JoinKind, OrderDir, TableRef},
            expr::{BinaryOp, BinaryOperator, Expr},
            select::{FromClause, JoinClause, OrderByExpr, Select},
        },
        dialect::{MySql, Postgres},
        qual_ident,
        renderer::{Render, Renderer},
        value,
    };
    use chrono::NaiveDate;
    use model::core::value::Value;

    fn table(name: &str) -> TableRef {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }

    fn eq(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        }))
    }

    fn report_meta_exists() -> Expr {
        Expr::Exists(Box::new(Select {
            columns: vec![Expr::Literal("1".to_string())],
            from: Some(FromClause {
                table: table("report_meta"),
                alias: Some("rm".to_string()),
            }),
            where_clause: Some(Expr::BinaryOp(Box::new(BinaryOp {
                left: eq(qual_ident("rm", "report_id"), qual_ident("r", "report_id")),
                op: BinaryOperator::And,
                right: eq(
                    qual_ident("rm", "report_meta_key"),
                    value(Value::from("instrument")),
                ),
            }))),
            ..Default::default()
        }))
    }

    #[test]
    fn test_simple_select_mysql() {
        let ast = Select {
            columns: vec![qual_ident("s", "sample_id")],
            from: Some(FromClause {
                table: table("sample"),
                alias: Some("s".to_string()),
            }),
            where_clause: Some(eq(
                qual_ident("s", "sample_name"),
                value(Value::from("abc")),
            )),
            ..Default::default()
        };

        let dialect = MySql;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(
            sql,
            "SELECT `s`.`sample_id` FROM `sample` AS `s` WHERE (`s`.`sample_name` = ?)"
        );
        assert_eq!(params, vec![Value::from("abc")]);
    }

    #[test]
    fn test_join_with_exists_subquery_postgres() {
        let since = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let ast = Select {
            columns: vec![qual_ident("r", "created_at"), qual_ident("sd", "value")],
            from: Some(FromClause {
                table: table("sample"),
                alias: Some("s".to_string()),
            }),
            joins: vec![JoinClause {
                kind: JoinKind::Inner,
                table: table("report"),
                alias: Some("r".to_string()),
                on: eq(qual_ident("r", "report_id"), qual_ident("s", "report_id")),
            }],
            where_clause: Some(Expr::BinaryOp(Box::new(BinaryOp {
                left: Expr::BinaryOp(Box::new(BinaryOp {
                    left: qual_ident("r", "created_at"),
                    op: BinaryOperator::GtEq,
                    right: value(Value::Timestamp(since)),
                })),
                op: BinaryOperator::And,
                right: report_meta_exists(),
            }))),
            order_by: vec![OrderByExpr {
                expr: qual_ident("r", "created_at"),
                direction: Some(OrderDir::Asc),
            }],
        };

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        let expected_sql = concat!(
            r#"SELECT "r"."created_at", "sd"."value" FROM "sample" AS "s" "#,
            r#"INNER JOIN "report" AS "r" ON ("r"."report_id" = "s"."report_id") "#,
            r#"WHERE (("r"."created_at" >= $1) AND EXISTS (SELECT 1 FROM "report_meta" AS "rm" "#,
            r#"WHERE (("rm"."report_id" = "r"."report_id") AND ("rm"."report_meta_key" = $2)))) "#,
            r#"ORDER BY "r"."created_at" ASC"#
        );
        assert_eq!(sql, expected_sql);
        assert_eq!(
            params,
            vec![Value::Timestamp(since), Value::from("instrument")]
        );
    }
}
