// ABOUTME: Library root for noderoll - exposes the node, drain and renewal operations.
// ABOUTME: The main binary is in main.rs.

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fleet;
pub mod ops;
pub mod output;
pub mod renew;
pub mod types;
