use crate::{compiler::FilterCompiler, error::StoreError, sql::column_ident};
use model::{
    core::{comparator::Comparator, value::Value},
    execution::expr::{Condition, FilterExpr, ValueTest},
    records::column::{Column, Table},
};
use planner::{
    binary,
    query::{
        ast::{
            common::JoinKind,
            expr::{BinaryOp, BinaryOperator, Expr},
        },
        builder::select::SelectBuilder,
        dialect::Dialect,
        qual_ident, value,
    },
    table_ref,
};

const META_ALIAS: &str = "rm";
const METRIC_DATA_ALIAS: &str = "msd";
const METRIC_TYPE_ALIAS: &str = "mdt";

/// Lowers a filter tree into a SQL `WHERE` expression over the sample join.
///
/// Metadata conditions become correlated `EXISTS` subqueries. Ordering
/// comparisons on stored text cast it to the dialect's float type, guarded
/// so that only values of the targeted key are ever cast.
pub struct SqlFilterCompiler<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> SqlFilterCompiler<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    fn condition(&self, cond: &Condition) -> Result<Expr, StoreError> {
        match cond {
            Condition::Compare { column, op, value } => {
                compare(column_ident(*column), *op, value)
            }
            Condition::ReportMeta { key, test } => {
                let guard = binary!(
                    qual_ident(META_ALIAS, "report_meta_key"),
                    Eq,
                    value(Value::from(key.as_str()))
                );
                let test = self.value_test(
                    qual_ident(META_ALIAS, "report_meta_value"),
                    test,
                    &guard,
                )?;

                let subquery = SelectBuilder::new()
                    .select(vec![Expr::Literal("1".to_string())])
                    .from(table_ref!(Table::ReportMeta.name()), Some(META_ALIAS))
                    .and_where(binary!(
                        qual_ident(META_ALIAS, "report_id"),
                        Eq,
                        column_ident(Column::ReportId)
                    ))
                    .and_where(guard)
                    .and_where(test)
                    .build();

                Ok(Expr::Exists(Box::new(subquery)))
            }
            Condition::SampleMeta { key, section, test } => {
                let mut guard = binary!(
                    qual_ident(METRIC_TYPE_ALIAS, "data_key"),
                    Eq,
                    value(Value::from(key.as_str()))
                );
                if let Some(section) = section {
                    guard = binary!(
                        guard,
                        And,
                        binary!(
                            qual_ident(METRIC_TYPE_ALIAS, "data_section"),
                            Eq,
                            value(Value::from(section.as_str()))
                        )
                    );
                }
                let test = self.value_test(qual_ident(METRIC_DATA_ALIAS, "value"), test, &guard)?;

                let subquery = SelectBuilder::new()
                    .select(vec![Expr::Literal("1".to_string())])
                    .from(table_ref!(Table::SampleData.name()), Some(METRIC_DATA_ALIAS))
                    .join(
                        JoinKind::Inner,
                        table_ref!(Table::SampleDataType.name()),
                        Some(METRIC_TYPE_ALIAS),
                        binary!(
                            qual_ident(METRIC_TYPE_ALIAS, "sample_data_type_id"),
                            Eq,
                            qual_ident(METRIC_DATA_ALIAS, "sample_data_type_id")
                        ),
                    )
                    .and_where(binary!(
                        qual_ident(METRIC_DATA_ALIAS, "sample_id"),
                        Eq,
                        column_ident(Column::SampleId)
                    ))
                    .and_where(guard)
                    .and_where(test)
                    .build();

                Ok(Expr::Exists(Box::new(subquery)))
            }
        }
    }

    fn value_test(&self, stored: Expr, test: &ValueTest, guard: &Expr) -> Result<Expr, StoreError> {
        if !test.is_numeric() {
            return compare(stored, test.op, &test.operand);
        }

        if !matches!(test.operand, Value::Int(_) | Value::Float(_)) {
            return Err(StoreError::QueryBuild(format!(
                "Ordering comparison '{}' needs a numeric operand, got {}",
                test.op, test.operand
            )));
        }

        let numeric = Expr::Cast {
            expr: Box::new(Expr::CaseWhen {
                condition: Box::new(guard.clone()),
                then: Box::new(stored),
            }),
            data_type: self.dialect.float_type().to_string(),
        };
        compare(numeric, test.op, &test.operand)
    }
}

impl FilterCompiler for SqlFilterCompiler<'_> {
    type Filter = Expr;

    fn compile(&self, expr: &FilterExpr) -> Result<Expr, StoreError> {
        let (children, op) = match expr {
            FilterExpr::Leaf(cond) => return self.condition(cond),
            FilterExpr::And(children) => (children, BinaryOperator::And),
            FilterExpr::Or(children) => (children, BinaryOperator::Or),
        };

        let exprs = children
            .iter()
            .map(|child| self.compile(child))
            .collect::<Result<Vec<_>, _>>()?;

        Expr::fold(exprs, op).ok_or_else(|| {
            StoreError::QueryBuild("Filter groups must have at least one condition.".to_string())
        })
    }
}

fn compare(left: Expr, op: Comparator, operand: &Value) -> Result<Expr, StoreError> {
    let op = match op {
        Comparator::In | Comparator::NotIn => {
            let list = match operand {
                Value::StringArray(items) => items
                    .iter()
                    .map(|item| value(Value::String(item.clone())))
                    .collect::<Vec<_>>(),
                single => vec![value(single.clone())],
            };
            if list.is_empty() {
                return Err(StoreError::QueryBuild(
                    "Set membership needs at least one value.".to_string(),
                ));
            }
            return Ok(Expr::InList {
                expr: Box::new(left),
                list,
                negated: op == Comparator::NotIn,
            });
        }
        Comparator::Equal => BinaryOperator::Eq,
        Comparator::NotEqual => BinaryOperator::NotEq,
        Comparator::GreaterThan => BinaryOperator::Gt,
        Comparator::GreaterThanOrEqual => BinaryOperator::GtEq,
        Comparator::LessThan => BinaryOperator::Lt,
        Comparator::LessThanOrEqual => BinaryOperator::LtEq,
    };

    Ok(Expr::BinaryOp(Box::new(BinaryOp {
        left,
        op,
        right: value(operand.clone()),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planner::query::{
        dialect::Postgres,
        renderer::{Render, Renderer},
    };

    fn render(expr: &FilterExpr) -> (String, Vec<Value>) {
        let dialect = Postgres;
        let sql_expr = SqlFilterCompiler::new(&dialect).compile(expr).unwrap();
        let mut renderer = Renderer::new(&dialect);
        sql_expr.render(&mut renderer);
        renderer.finish()
    }

    #[test]
    fn test_created_at_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let expr = FilterExpr::or(vec![
            FilterExpr::compare(Column::ReportCreatedAt, Comparator::LessThan, start),
            FilterExpr::compare(Column::ReportCreatedAt, Comparator::GreaterThan, start),
        ]);

        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            r#"(("r"."created_at" < $1) OR ("r"."created_at" > $2))"#
        );
        assert_eq!(params, vec![Value::Timestamp(start), Value::Timestamp(start)]);
    }

    #[test]
    fn test_report_meta_not_in_is_an_exists() {
        let expr = FilterExpr::leaf(Condition::ReportMeta {
            key: "instrument".into(),
            test: ValueTest::new(
                Comparator::NotIn,
                Value::StringArray(vec!["hiseq".into(), "miseq".into()]),
            ),
        });

        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            concat!(
                r#"EXISTS (SELECT 1 FROM "report_meta" AS "rm" WHERE ((("rm"."report_id" = "r"."report_id") "#,
                r#"AND ("rm"."report_meta_key" = $1)) AND ("rm"."report_meta_value" NOT IN ($2, $3))))"#
            )
        );
        assert_eq!(
            params,
            vec![
                Value::from("instrument"),
                Value::from("hiseq"),
                Value::from("miseq")
            ]
        );
    }

    #[test]
    fn test_sample_meta_numeric_comparison_casts_guarded_value() {
        let expr = FilterExpr::leaf(Condition::SampleMeta {
            key: "percent_gc".into(),
            section: None,
            test: ValueTest::new(Comparator::GreaterThan, Value::Float(40.0)),
        });

        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            concat!(
                r#"EXISTS (SELECT 1 FROM "sample_data" AS "msd" "#,
                r#"INNER JOIN "sample_data_type" AS "mdt" ON ("mdt"."sample_data_type_id" = "msd"."sample_data_type_id") "#,
                r#"WHERE ((("msd"."sample_id" = "s"."sample_id") AND ("mdt"."data_key" = $1)) "#,
                r#"AND (CAST(CASE WHEN ("mdt"."data_key" = $2) THEN "msd"."value" END AS DOUBLE PRECISION) > $3)))"#
            )
        );
        assert_eq!(
            params,
            vec![
                Value::from("percent_gc"),
                Value::from("percent_gc"),
                Value::Float(40.0)
            ]
        );
    }

    #[test]
    fn test_numeric_comparison_rejects_text_operand() {
        let dialect = Postgres;
        let expr = FilterExpr::leaf(Condition::ReportMeta {
            key: "depth".into(),
            test: ValueTest::new(Comparator::LessThan, Value::from("deep")),
        });

        let result = SqlFilterCompiler::new(&dialect).compile(&expr);
        assert!(matches!(result, Err(StoreError::QueryBuild(_))));
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let dialect = Postgres;
        let result = SqlFilterCompiler::new(&dialect).compile(&FilterExpr::And(vec![]));
        assert!(matches!(result, Err(StoreError::QueryBuild(_))));
    }
}
