// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod app;
pub mod config;
pub mod divisions;
pub mod pool;
pub mod schedule;
pub mod season;
pub mod store;
