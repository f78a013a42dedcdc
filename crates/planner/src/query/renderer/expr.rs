use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::Literal(raw) => r.sql.push_str(raw),
            Expr::BinaryOp(op) => op.render(r),
            Expr::Cast { expr, data_type } => {
                r.sql.push_str("CAST(");
                expr.render(r);
                r.sql.push_str(" AS ");
                r.sql.push_str(data_type);
                r.sql.push(')');
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push_str("))");
            }
            Expr::CaseWhen { condition, then } => {
                r.sql.push_str("CASE WHEN ");
                condition.render(r);
                r.sql.push_str(" THEN ");
                then.render(r);
                r.sql.push_str(" END");
            }
            Expr::Exists(select) => {
                r.sql.push_str("EXISTS (");
                select.render(r);
                r.sql.push(')');
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.push_identifier(qualifier);
            r.sql.push('.');
        }
        r.push_identifier(&self.name);
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}
