pub mod params;
pub mod store;
pub mod utils;
