//! The three protocol messages and their wire encoding.
//!
//! Wire shapes, with `kind` as the required discriminator:
//!
//! ```json
//! { "kind": "choice", "choice": "rock" }
//! { "kind": "result", "result": { "localChoice": "rock", "remoteChoice": "scissors", "winner": "remote" } }
//! { "kind": "reset" }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    Choice, Outcome,
    error::{Result, WireError},
};

/// A protocol message exchanged over the peer data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GameMessage {
    /// The sender picked a throw for the current round.
    Choice {
        /// The sender's throw.
        choice: Choice,
    },
    /// The sender held both throws and decided the round.
    ///
    /// The payload is already mirrored into the recipient's point of view;
    /// the recipient adopts it verbatim and never re-derives.
    Result {
        /// The decided round, from the recipient's point of view.
        result: Outcome,
    },
    /// Clear the current round on both sides.
    Reset,
}

impl GameMessage {
    /// Serialize for the data channel.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(WireError::Encode)
    }

    /// Parse bytes received from the data channel.
    ///
    /// Fails on unknown `kind` values and malformed payloads. Callers
    /// discard such messages rather than tearing the session down.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(WireError::Decode)
    }
}
