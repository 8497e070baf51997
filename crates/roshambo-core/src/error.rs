//! Error taxonomy for the protocol core.
//!
//! Every display string here is suitable for showing to the user, and no
//! variant is fatal: at worst the session returns to disconnected or idle
//! and the user starts over.

use thiserror::Error;

use crate::session::LinkState;

/// Lifecycle and invitation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The invitation token could not be decoded, or names this instance
    /// itself. Recoverable: the session stays idle and the user may retry
    /// with a corrected link.
    #[error("invalid invitation: {reason}")]
    InvalidInvitation {
        /// Why decoding was rejected.
        reason: String,
    },

    /// The operation is not allowed in the current lifecycle state.
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        /// State the session was in.
        state: LinkState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// The data channel failed. Forces disconnected; the protocol does not
    /// retry on its own.
    #[error("connection lost: {reason}")]
    Transport {
        /// Human-readable failure description from the transport.
        reason: String,
    },
}

/// Game engine misuse by the local caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundError {
    /// A throw was submitted while no channel is connected.
    #[error("cannot play while {state:?}")]
    NotConnected {
        /// Lifecycle state observed at submit time.
        state: LinkState,
    },
}

/// A peer message that violates the round protocol.
///
/// Violations leave round state untouched and are discarded by the caller;
/// a misbehaving or mismatched-version peer cannot corrupt a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// A `choice` arrived after the round was already decided, e.g. a
    /// duplicate delivery. Discarded rather than overwriting a decided
    /// result.
    #[error("peer sent a choice after the round was decided")]
    ChoiceAfterDecided,

    /// A second `choice` arrived before the round was decided. Throws are
    /// immutable once recorded.
    #[error("peer sent a second choice for the same round")]
    DuplicateChoice,

    /// A `result` arrived before this side had thrown, so the sender
    /// cannot legitimately have held both choices.
    #[error("peer sent a result for a round this side has not played")]
    UnsolicitedResult,

    /// A `result` arrived that disagrees with state already held. The two
    /// sides have diverged; surfaced, never silently overwritten.
    #[error("peer sent a result that contradicts the round held here")]
    ConflictingResult,
}
