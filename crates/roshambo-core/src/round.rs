//! Game synchronization engine.
//!
//! Owns the per-round state and the message exchange that makes two
//! independently computing peers agree on one outcome. Each side derives
//! from its own perspective; the protocol's job is to keep the two views
//! mirror images of each other.
//!
//! # Message exchange
//!
//! A round completes along one of three paths:
//!
//! ```text
//! peer chose first            this side chose first       both chose blind
//! ────────────────            ─────────────────────       ────────────────
//! <- choice                   -> choice                   -> choice
//! submit: derive, terminal    <- result: adopt            <- choice
//! -> result (mirrored)                                    initiator: derive,
//!                                                         -> result (mirrored)
//!                                                         joiner: wait, adopt
//! ```
//!
//! Whichever side holds both throws first derives the outcome and ships it
//! mirrored into the peer's point of view; that side's `result` carries
//! both throws, so no separate `choice` follows it. When both sides throw
//! before seeing the other's choice, each observes a raw `choice` crossing
//! its own; that situation is symmetric, and the [`Role`] breaks the tie:
//! the initiator derives and sends, the joiner waits and adopts. Exactly
//! one `result` crosses the wire per round, and the receiving side never
//! re-derives.
//!
//! Both completion paths go through the same derivation ([`decide`]) and
//! the same mirroring ([`Outcome::mirrored`]), so they cannot drift apart.

use roshambo_proto::{Choice, GameMessage, Outcome, Winner};

use crate::{
    error::{ProtocolViolation, RoundError},
    session::{LinkState, Role},
};

/// Decide a round from one player's point of view.
///
/// Pure function, total over the 3x3 choice domain: equal throws draw,
/// otherwise [`Choice::beats`] picks the winner.
#[must_use]
pub fn decide(mine: Choice, theirs: Choice) -> Outcome {
    let winner = if mine == theirs {
        Winner::Draw
    } else if mine.beats(theirs) {
        Winner::Local
    } else {
        Winner::Remote
    };
    Outcome { local_choice: mine, remote_choice: theirs, winner }
}

/// Actions returned by the game engine for the driver to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    /// Send this message over the data channel.
    Send(GameMessage),
}

/// Per-round synchronization state for one peer.
///
/// Created fresh when the link becomes connected; cleared by reset (local
/// or remote) and torn down on disconnect. Once an outcome is held the
/// round is terminal until a reset is processed.
#[derive(Debug, Clone)]
pub struct Round {
    role: Role,
    local: Option<Choice>,
    remote: Option<Choice>,
    outcome: Option<Outcome>,
}

impl Round {
    /// Fresh round for a connected link.
    pub fn new(role: Role) -> Self {
        Self { role, local: None, remote: None, outcome: None }
    }

    /// This player's throw, once recorded.
    #[must_use]
    pub fn local_choice(&self) -> Option<Choice> {
        self.local
    }

    /// The opponent's throw, once observed.
    #[must_use]
    pub fn remote_choice(&self) -> Option<Choice> {
        self.remote
    }

    /// The decided outcome. `Some` means the round is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the round has been decided.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record this player's throw.
    ///
    /// A second submit, whether mid-round or after the round is decided,
    /// is a no-op: no message is sent and no state changes, so a stale
    /// button press cannot corrupt a round. If the opponent's throw is
    /// already known this side completes the round and ships the verdict,
    /// mirrored into the peer's point of view.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::NotConnected`] unless the observed lifecycle
    /// state is `Connected`.
    pub fn submit_choice(
        &mut self,
        choice: Choice,
        link: LinkState,
    ) -> Result<Vec<RoundAction>, RoundError> {
        if link != LinkState::Connected {
            return Err(RoundError::NotConnected { state: link });
        }
        if self.local.is_some() || self.outcome.is_some() {
            return Ok(Vec::new());
        }
        self.local = Some(choice);
        match self.remote {
            Some(theirs) => {
                let outcome = decide(choice, theirs);
                self.outcome = Some(outcome);
                // The mirrored result carries both throws; the peer needs
                // no separate choice message.
                Ok(vec![RoundAction::Send(GameMessage::Result { result: outcome.mirrored() })])
            },
            None => Ok(vec![RoundAction::Send(GameMessage::Choice { choice })]),
        }
    }

    /// Process a message from the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolViolation`] for messages that break the round
    /// protocol. Violations leave the round untouched; the caller discards
    /// and logs them.
    pub fn handle_message(
        &mut self,
        msg: GameMessage,
    ) -> Result<Vec<RoundAction>, ProtocolViolation> {
        match msg {
            GameMessage::Choice { choice } => self.handle_remote_choice(choice),
            GameMessage::Result { result } => self.handle_result(result),
            GameMessage::Reset => {
                self.clear();
                Ok(Vec::new())
            },
        }
    }

    /// Clear the round and tell the peer to clear in lockstep.
    pub fn request_reset(&mut self) -> Vec<RoundAction> {
        self.clear();
        vec![RoundAction::Send(GameMessage::Reset)]
    }

    /// Reset all round state to absent, from any phase including terminal.
    pub fn clear(&mut self) {
        self.local = None;
        self.remote = None;
        self.outcome = None;
    }

    fn handle_remote_choice(
        &mut self,
        theirs: Choice,
    ) -> Result<Vec<RoundAction>, ProtocolViolation> {
        if self.outcome.is_some() {
            return Err(ProtocolViolation::ChoiceAfterDecided);
        }
        if self.remote.is_some() {
            return Err(ProtocolViolation::DuplicateChoice);
        }
        self.remote = Some(theirs);
        let Some(mine) = self.local else {
            // They chose first; completion happens at this side's submit.
            return Ok(Vec::new());
        };
        // A raw choice crossing ours means both sides threw blind. The
        // situation is symmetric on both peers, so the role breaks the
        // tie: one verdict, derived once.
        match self.role {
            Role::Initiator => {
                let outcome = decide(mine, theirs);
                self.outcome = Some(outcome);
                Ok(vec![RoundAction::Send(GameMessage::Result { result: outcome.mirrored() })])
            },
            Role::Joiner => Ok(Vec::new()),
        }
    }

    fn handle_result(&mut self, result: Outcome) -> Result<Vec<RoundAction>, ProtocolViolation> {
        if let Some(held) = self.outcome {
            if held == result {
                // Duplicate delivery of the verdict already held.
                return Ok(Vec::new());
            }
            return Err(ProtocolViolation::ConflictingResult);
        }
        match self.local {
            None => Err(ProtocolViolation::UnsolicitedResult),
            Some(mine) if mine != result.local_choice => {
                Err(ProtocolViolation::ConflictingResult)
            },
            Some(_) => {
                // Adopt the sender's derivation verbatim: it held both
                // throws first, and the payload is already expressed from
                // this side's point of view.
                self.remote = Some(result.remote_choice);
                self.outcome = Some(result);
                Ok(Vec::new())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn connected_round(role: Role) -> Round {
        Round::new(role)
    }

    fn submit(round: &mut Round, choice: Choice) -> Vec<RoundAction> {
        round.submit_choice(choice, LinkState::Connected).unwrap()
    }

    #[test]
    fn first_submit_sends_the_choice() {
        let mut round = connected_round(Role::Initiator);
        let actions = submit(&mut round, Choice::Rock);

        assert_eq!(
            actions,
            vec![RoundAction::Send(GameMessage::Choice { choice: Choice::Rock })]
        );
        assert_eq!(round.local_choice(), Some(Choice::Rock));
        assert!(!round.is_decided());
    }

    #[test]
    fn submit_completing_the_pair_sends_only_the_mirrored_result() {
        let mut round = connected_round(Role::Joiner);
        round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();

        let actions = submit(&mut round, Choice::Scissors);
        let expected = Outcome {
            local_choice: Choice::Scissors,
            remote_choice: Choice::Rock,
            winner: Winner::Remote,
        };
        assert_eq!(round.outcome(), Some(expected));
        assert_eq!(
            actions,
            vec![RoundAction::Send(GameMessage::Result { result: expected.mirrored() })]
        );
    }

    #[test]
    fn adopting_a_result_never_rederives() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Rock);

        // Pre-mirrored by the sender: expressed from this side's view.
        let payload = Outcome {
            local_choice: Choice::Rock,
            remote_choice: Choice::Scissors,
            winner: Winner::Local,
        };
        let actions = round.handle_message(GameMessage::Result { result: payload }).unwrap();

        assert!(actions.is_empty());
        assert_eq!(round.outcome(), Some(payload));
        assert_eq!(round.remote_choice(), Some(Choice::Scissors));
    }

    #[test]
    fn blind_exchange_initiator_derives_and_sends() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Paper);

        let actions =
            round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();
        let expected = Outcome {
            local_choice: Choice::Paper,
            remote_choice: Choice::Rock,
            winner: Winner::Local,
        };
        assert_eq!(round.outcome(), Some(expected));
        assert_eq!(
            actions,
            vec![RoundAction::Send(GameMessage::Result { result: expected.mirrored() })]
        );
    }

    #[test]
    fn blind_exchange_joiner_waits_for_the_verdict() {
        let mut round = connected_round(Role::Joiner);
        submit(&mut round, Choice::Rock);

        let actions =
            round.handle_message(GameMessage::Choice { choice: Choice::Paper }).unwrap();
        assert!(actions.is_empty());
        assert!(!round.is_decided());
        assert_eq!(round.remote_choice(), Some(Choice::Paper));

        // The initiator's verdict arrives, pre-mirrored.
        let payload = Outcome {
            local_choice: Choice::Rock,
            remote_choice: Choice::Paper,
            winner: Winner::Remote,
        };
        round.handle_message(GameMessage::Result { result: payload }).unwrap();
        assert_eq!(round.outcome(), Some(payload));
    }

    #[test]
    fn second_submit_is_a_no_op() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Rock);

        let actions = submit(&mut round, Choice::Paper);
        assert!(actions.is_empty());
        assert_eq!(round.local_choice(), Some(Choice::Rock));
    }

    #[test]
    fn submit_after_terminal_is_a_no_op() {
        let mut round = connected_round(Role::Joiner);
        round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();
        submit(&mut round, Choice::Paper);
        assert!(round.is_decided());

        let actions = submit(&mut round, Choice::Scissors);
        assert!(actions.is_empty());
        assert_eq!(round.local_choice(), Some(Choice::Paper));
        assert_eq!(round.outcome().unwrap().local_choice, Choice::Paper);
    }

    #[test]
    fn submit_requires_a_connected_link() {
        let mut round = connected_round(Role::Initiator);
        for state in [LinkState::Idle, LinkState::Connecting, LinkState::Disconnected] {
            let err = round.submit_choice(Choice::Rock, state).unwrap_err();
            assert_eq!(err, RoundError::NotConnected { state });
        }
        assert_eq!(round.local_choice(), None);
    }

    #[test]
    fn choice_after_decided_is_a_violation() {
        let mut round = connected_round(Role::Joiner);
        round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();
        submit(&mut round, Choice::Paper);
        let held = round.outcome();

        let err = round
            .handle_message(GameMessage::Choice { choice: Choice::Scissors })
            .unwrap_err();
        assert_eq!(err, ProtocolViolation::ChoiceAfterDecided);
        assert_eq!(round.outcome(), held);
        assert_eq!(round.remote_choice(), Some(Choice::Rock));
    }

    #[test]
    fn second_remote_choice_is_a_violation() {
        let mut round = connected_round(Role::Joiner);
        round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();

        let err = round
            .handle_message(GameMessage::Choice { choice: Choice::Paper })
            .unwrap_err();
        assert_eq!(err, ProtocolViolation::DuplicateChoice);
        assert_eq!(round.remote_choice(), Some(Choice::Rock));
    }

    #[test]
    fn result_before_playing_is_a_violation() {
        let mut round = connected_round(Role::Joiner);
        let payload = Outcome {
            local_choice: Choice::Rock,
            remote_choice: Choice::Paper,
            winner: Winner::Remote,
        };
        let err = round.handle_message(GameMessage::Result { result: payload }).unwrap_err();
        assert_eq!(err, ProtocolViolation::UnsolicitedResult);
        assert!(!round.is_decided());
    }

    #[test]
    fn conflicting_result_is_a_violation() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Rock);

        // Claims this side threw paper; it threw rock.
        let payload = Outcome {
            local_choice: Choice::Paper,
            remote_choice: Choice::Scissors,
            winner: Winner::Remote,
        };
        let err = round.handle_message(GameMessage::Result { result: payload }).unwrap_err();
        assert_eq!(err, ProtocolViolation::ConflictingResult);
        assert!(!round.is_decided());
    }

    #[test]
    fn duplicate_identical_result_is_tolerated() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Rock);
        let payload = Outcome {
            local_choice: Choice::Rock,
            remote_choice: Choice::Scissors,
            winner: Winner::Local,
        };
        round.handle_message(GameMessage::Result { result: payload }).unwrap();

        let actions = round.handle_message(GameMessage::Result { result: payload }).unwrap();
        assert!(actions.is_empty());
        assert_eq!(round.outcome(), Some(payload));
    }

    #[test]
    fn reset_clears_from_any_phase() {
        let mut round = connected_round(Role::Joiner);
        round.handle_message(GameMessage::Reset).unwrap();
        assert_eq!(round.local_choice(), None);

        submit(&mut round, Choice::Rock);
        round.handle_message(GameMessage::Reset).unwrap();
        assert_eq!(round.local_choice(), None);

        round.handle_message(GameMessage::Choice { choice: Choice::Rock }).unwrap();
        submit(&mut round, Choice::Paper);
        assert!(round.is_decided());
        round.handle_message(GameMessage::Reset).unwrap();
        assert_eq!(round.local_choice(), None);
        assert_eq!(round.remote_choice(), None);
        assert_eq!(round.outcome(), None);
    }

    #[test]
    fn request_reset_clears_and_notifies_the_peer() {
        let mut round = connected_round(Role::Initiator);
        submit(&mut round, Choice::Rock);

        let actions = round.request_reset();
        assert_eq!(actions, vec![RoundAction::Send(GameMessage::Reset)]);
        assert_eq!(round.local_choice(), None);

        // The round is reusable after a reset.
        let actions = submit(&mut round, Choice::Scissors);
        assert_eq!(
            actions,
            vec![RoundAction::Send(GameMessage::Choice { choice: Choice::Scissors })]
        );
    }

    fn any_choice() -> impl Strategy<Value = Choice> {
        prop_oneof![Just(Choice::Rock), Just(Choice::Paper), Just(Choice::Scissors)]
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic_and_total(mine in any_choice(), theirs in any_choice()) {
            let outcome = decide(mine, theirs);
            prop_assert_eq!(outcome, decide(mine, theirs));
            prop_assert_eq!(outcome.local_choice, mine);
            prop_assert_eq!(outcome.remote_choice, theirs);
            if mine == theirs {
                prop_assert_eq!(outcome.winner, Winner::Draw);
            } else {
                prop_assert_ne!(outcome.winner, Winner::Draw);
            }
        }

        #[test]
        fn derivation_is_antisymmetric(mine in any_choice(), theirs in any_choice()) {
            let here = decide(mine, theirs);
            let there = decide(theirs, mine);
            prop_assert_eq!(here.winner, there.winner.flipped());
        }

        #[test]
        fn derivation_agrees_with_mirroring(mine in any_choice(), theirs in any_choice()) {
            prop_assert_eq!(decide(mine, theirs).mirrored(), decide(theirs, mine));
        }
    }
}
