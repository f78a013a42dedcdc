use crate::core::value::Value;
use crate::records::column::Column;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub column: Column,
    pub value: Value,
}

/// One projected row of the sample join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.field_values.iter().find(|f| f.column == column)
    }

    pub fn get_value(&self, column: Column) -> Value {
        self.get(column)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}
