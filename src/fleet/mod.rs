// ABOUTME: Node registry access, validated mutations and the drain waiter.
// ABOUTME: Building blocks composed by the renewal state machine and the node commands.

mod drain;
mod error;
mod mutator;
mod poll;
mod registry;

pub use drain::await_drained;
pub use error::{FleetError, Result, ValidationError};
pub use mutator::{set_group_capacity, set_status, validate_capacity, validate_status_request};
pub use poll::{PollPolicy, PollReport, poll_until};
pub use registry::{list_nodes, list_services, undrained};
