//! Roshambo protocol core logic
//!
//! Pure state machine logic for the two-party game protocol, completely
//! decoupled from I/O. This enables deterministic testing of every message
//! ordering the wire can produce.
//!
//! # Architecture
//!
//! Protocol logic in this crate is implemented as deterministic state
//! machines that are isolated from I/O, time, randomness, and scheduling.
//! All external effects are supplied explicitly by the caller.
//!
//! State transitions produce declarative actions that describe intended
//! effects rather than executing them directly. A runtime or test harness
//! is responsible for interpreting and executing these actions.
//!
//! This separation keeps protocol correctness independent of execution
//! concerns and allows the same code to be reused across production
//! runtimes and simulation environments with fault injection.
//!
//! # Components
//!
//! - [`session`]: Connection lifecycle state machine (invitation, dial, teardown)
//! - [`round`]: Game synchronization engine (choice exchange, convergence, reset)
//! - [`invite`]: Peer identity and invitation token codec
//! - [`error`]: Error taxonomy

pub mod error;
pub mod invite;
pub mod round;
pub mod session;

pub use error::{ProtocolViolation, RoundError, SessionError};
pub use invite::{InviteToken, PeerId};
pub use round::{Round, RoundAction, decide};
pub use session::{LinkState, Role, Session, SessionAction};
