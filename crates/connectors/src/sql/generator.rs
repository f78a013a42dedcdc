use crate::{
    compiler::FilterCompiler,
    error::StoreError,
    sql::{column_ident, filter::SqlFilterCompiler},
};
use model::{
    core::value::Value,
    execution::query::{OrderDir as QueryOrderDir, SampleQuery},
    records::column::{Column, Table},
};
use planner::{
    binary,
    query::{
        ast::{
            common::{JoinKind, OrderDir},
            select::Select,
        },
        builder::select::SelectBuilder,
        dialect::Dialect,
        qual_ident,
        renderer::{Render, Renderer},
    },
    table_ref,
};

/// Renders a [`SampleQuery`] as one parameterised `SELECT` over
/// `sample ⋈ sample_data ⋈ sample_data_type ⋈ report`.
pub struct QueryGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Generates a SQL SELECT statement and its parameters.
    pub fn select(&self, query: &SampleQuery) -> Result<(String, Vec<Value>), StoreError> {
        let ast = self.select_ast(query)?;
        let mut renderer = Renderer::new(self.dialect);
        ast.render(&mut renderer);
        Ok(renderer.finish())
    }

    pub fn select_ast(&self, query: &SampleQuery) -> Result<Select, StoreError> {
        let columns = query
            .columns()
            .into_iter()
            .map(column_ident)
            .collect::<Vec<_>>();

        let mut select = SelectBuilder::new()
            .select(columns)
            .from(table_ref!(Table::Sample.name()), Some(Table::Sample.alias()))
            .join(
                JoinKind::Inner,
                table_ref!(Table::SampleData.name()),
                Some(Table::SampleData.alias()),
                binary!(
                    column_ident(Column::SampleId),
                    Eq,
                    qual_ident(Table::SampleData.alias(), "sample_id")
                ),
            )
            .join(
                JoinKind::Inner,
                table_ref!(Table::SampleDataType.name()),
                Some(Table::SampleDataType.alias()),
                binary!(
                    column_ident(Column::DataTypeId),
                    Eq,
                    qual_ident(Table::SampleData.alias(), "sample_data_type_id")
                ),
            )
            .join(
                JoinKind::Inner,
                table_ref!(Table::Report.name()),
                Some(Table::Report.alias()),
                binary!(
                    column_ident(Column::ReportId),
                    Eq,
                    qual_ident(Table::Sample.alias(), "report_id")
                ),
            );

        if let Some(predicate) = query.predicate() {
            let compiler = SqlFilterCompiler::new(self.dialect);
            select = select.where_clause(compiler.compile(&predicate)?);
        }

        for order in &query.order_by {
            let direction = match order.direction {
                QueryOrderDir::Asc => OrderDir::Asc,
                QueryOrderDir::Desc => OrderDir::Desc,
            };
            select = select.order_by(column_ident(order.column), Some(direction));
        }

        Ok(select.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::comparator::Comparator,
        execution::{expr::FilterExpr, query::OrderDir},
    };
    use planner::query::dialect::{MySql, Postgres};

    const JOIN_PG: &str = concat!(
        r#"FROM "sample" AS "s" "#,
        r#"INNER JOIN "sample_data" AS "sd" ON ("s"."sample_id" = "sd"."sample_id") "#,
        r#"INNER JOIN "sample_data_type" AS "sdt" ON ("sdt"."sample_data_type_id" = "sd"."sample_data_type_id") "#,
        r#"INNER JOIN "report" AS "r" ON ("r"."report_id" = "s"."report_id")"#
    );

    #[test]
    fn test_unfiltered_query_has_no_where_clause() {
        let dialect = Postgres;
        let query = SampleQuery::unfiltered().select(vec![Column::SampleId]);

        let (sql, params) = QueryGenerator::new(&dialect).select(&query).unwrap();
        assert_eq!(sql, format!(r#"SELECT "s"."sample_id" {JOIN_PG}"#));
        assert!(params.is_empty());
    }

    #[test]
    fn test_trend_shaped_query() {
        let dialect = Postgres;
        let query = SampleQuery::new(Some(FilterExpr::compare(
            Column::SampleName,
            Comparator::NotEqual,
            "blank",
        )))
        .with_metric_key("percent_gc")
        .select(vec![
            Column::SampleDataId,
            Column::ReportCreatedAt,
            Column::SampleDataValue,
        ])
        .order_by(Column::ReportCreatedAt, OrderDir::Asc)
        .order_by(Column::SampleDataId, OrderDir::Asc);

        let (sql, params) = QueryGenerator::new(&dialect).select(&query).unwrap();
        assert_eq!(
            sql,
            format!(
                concat!(
                    r#"SELECT "sd"."sample_data_id", "r"."created_at", "sd"."value" {} "#,
                    r#"WHERE (("s"."sample_name" <> $1) AND ("sdt"."data_key" = $2)) "#,
                    r#"ORDER BY "r"."created_at" ASC, "sd"."sample_data_id" ASC"#
                ),
                JOIN_PG
            )
        );
        assert_eq!(params, vec![Value::from("blank"), Value::from("percent_gc")]);
    }

    #[test]
    fn test_mysql_placeholders() {
        let dialect = MySql;
        let query = SampleQuery::unfiltered()
            .with_metric_key("total_sequences")
            .select(vec![Column::SampleDataValue]);

        let (sql, params) = QueryGenerator::new(&dialect).select(&query).unwrap();
        assert!(sql.starts_with("SELECT `sd`.`value` FROM `sample` AS `s`"));
        assert!(sql.ends_with("WHERE (`sdt`.`data_key` = ?)"));
        assert_eq!(params.len(), 1);
    }
}
