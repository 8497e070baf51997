//! Round outcome as carried by the `result` message.

use serde::{Deserialize, Serialize};

use crate::{Choice, Winner};

/// A decided round, expressed from the holder's own point of view.
///
/// `local_choice` is always "my throw" for whichever peer holds the value.
/// A peer forwarding an outcome to the other side must mirror it first so
/// the attribution stays true for the recipient; a `result` message on the
/// wire therefore always arrives pre-mirrored.
///
/// Once a round holds an outcome it is terminal until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// The holder's own throw.
    pub local_choice: Choice,
    /// The opposing throw.
    pub remote_choice: Choice,
    /// Verdict from the holder's point of view.
    pub winner: Winner,
}

impl Outcome {
    /// Re-express this outcome from the opposite peer's point of view.
    ///
    /// Swaps the choice attribution and flips the winner; a draw stays a
    /// draw. Mirroring is an involution: applying it twice yields the
    /// original. Every perspective swap in the protocol goes through this
    /// one function.
    #[must_use]
    pub fn mirrored(self) -> Self {
        Self {
            local_choice: self.remote_choice,
            remote_choice: self.local_choice,
            winner: self.winner.flipped(),
        }
    }
}
