//! Deterministic simulation harness for Roshambo protocol testing.
//!
//! Stands in for the peer-connection collaborator: two app instances
//! joined by in-memory FIFO queues, with delivery fully under test control
//! so every message interleaving the wire can produce is reproducible from
//! a seed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod scenario;
pub mod world;

pub use scenario::{OracleFn, RunnableScenario, Scenario};
pub use world::World;
