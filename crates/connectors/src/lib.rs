pub mod compiler;
pub mod error;
pub mod memory;
pub mod sql;
pub mod store;
