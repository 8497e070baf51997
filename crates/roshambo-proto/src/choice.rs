//! Player throws and winner attribution.

use serde::{Deserialize, Serialize};

/// A throw in rock-paper-scissors.
///
/// Immutable once recorded for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Beats scissors.
    Rock,
    /// Beats rock.
    Paper,
    /// Beats paper.
    Scissors,
}

impl Choice {
    /// Every throw, in wire order.
    pub const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    /// Whether this throw beats `other`.
    ///
    /// The rule set is closed over the full 3x3 domain: rock beats
    /// scissors, paper beats rock, scissors beats paper, and nothing else.
    #[must_use]
    pub fn beats(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors)
                | (Self::Paper, Self::Rock)
                | (Self::Scissors, Self::Paper)
        )
    }
}

/// Winner of a round, attributed from one peer's point of view.
///
/// There is no globally-fixed "player one": each side holds its own
/// attribution, and the protocol keeps the two views mirror images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The holder of the value won.
    Local,
    /// The opposing peer won.
    Remote,
    /// Equal throws.
    Draw,
}

impl Winner {
    /// The same verdict seen from the opposite peer.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
            Self::Draw => Self::Draw,
        }
    }
}
