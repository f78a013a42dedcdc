pub mod column;
pub mod entity;
pub mod row;
