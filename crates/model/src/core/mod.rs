pub mod comparator;
pub mod value;
