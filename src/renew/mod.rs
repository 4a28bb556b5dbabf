// ABOUTME: Node renewal orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Renewal struct and the end-to-end driver.

mod error;
mod renewal;
mod run;
mod state;
mod transitions;

pub use error::{RenewalError, RenewalStep};
pub use renewal::{Renewal, RenewalPlan, RenewalReport, RenewalSettings};
pub use run::renew_nodes;
pub use state::{Completed, Discovered, Drained, Draining, Registered, ScaledOut};
