//! Command implementations for the restkit CLI

pub mod db;
pub mod serve;

// Re-export main dispatcher functions for flat access from main.rs
pub use db::run_db;
pub use serve::run_serve;
