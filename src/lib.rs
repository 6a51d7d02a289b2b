//! postview: browse users, their posts and comments (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod client;
pub mod config;
pub mod constants;
pub mod dom;
pub mod env;
pub mod listeners;
pub mod models;
pub mod mutate;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod render;
