//! Application layer for Roshambo
//!
//! Composes the lifecycle and game state machines behind the surface a UI
//! observes, so protocol logic never leaks into view-rendering callbacks.
//! The app routes user actions, transport events and inbound channel bytes
//! into the core machines, executes the actions they return, and keeps one
//! displayable status line.
//!
//! # Components
//!
//! - [`App`]: session + round composition exposed to the UI
//! - [`AppEffect`]: effects for the transport collaborator to execute
//! - [`link`]: shareable-link collaborator (URL build/parse, game ids)

mod app;
pub mod link;

pub use app::{App, AppEffect};
