//! Wire format for the Roshambo peer protocol.
//!
//! Messages are tagged records with a required `kind` discriminator,
//! serialized as JSON. The channel collaborator delivers whole messages, so
//! there is no framing layer here; a message is exactly one channel payload.
//!
//! The only protocol knowledge in this crate is perspective: a round outcome
//! is always expressed from its holder's point of view, and
//! [`Outcome::mirrored`] re-expresses it for the opposite peer. Everything
//! else is plain data.
//!
//! Decoding is strict. An unknown `kind` or a malformed payload is a decode
//! error, which callers discard without touching session state: a
//! mismatched-version peer must not be able to corrupt a round.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod choice;
pub mod error;
pub mod message;
pub mod outcome;

pub use choice::{Choice, Winner};
pub use error::{Result, WireError};
pub use message::GameMessage;
pub use outcome::Outcome;
