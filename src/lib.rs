pub mod config;
pub mod core;
pub mod models;
pub mod series;
pub mod signal;
pub mod stats;
pub mod storage;
#[cfg(test)]
pub mod test_helpers;
