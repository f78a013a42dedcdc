use crate::error::StoreError;
use model::execution::expr::FilterExpr;

/// A trait for lowering filter expressions into a store-specific format.
pub trait FilterCompiler {
    /// The type of filter that this compiler produces.
    type Filter;

    /// Lower the expression tree into a filter.
    fn compile(&self, expr: &FilterExpr) -> Result<Self::Filter, StoreError>;
}
