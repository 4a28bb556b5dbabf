// ABOUTME: Renewal state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the discover/scale/drain/scale ordering at compile time.

/// Nodes listed and group described; nothing changed yet.
/// Available actions: `scale_out()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Discovered;

/// Scale-out requested for the group.
/// Available actions: `await_registration()`, `skip_registration()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledOut;

/// Replacement nodes have joined the cluster (or the wait was skipped).
/// Available actions: `drain()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Registered;

/// Drain requested for every planned node.
/// Available actions: `await_drain()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Draining;

/// Every planned node reported drained.
/// Available actions: `scale_in()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Drained;

/// Scale-in requested; the renewal is finished.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;
