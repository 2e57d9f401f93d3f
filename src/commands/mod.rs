pub mod stat;
pub mod types;
