// ABOUTME: Command module aggregator for the noderoll CLI.
// ABOUTME: Re-exports node, renew, and service command handlers.

mod backend_connection;
pub mod node;
mod renew;
pub mod service;

pub use renew::renew;
