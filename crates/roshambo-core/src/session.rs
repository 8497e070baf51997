//! Connection lifecycle state machine.
//!
//! This module manages the session layer: owning the local identity,
//! establishing exactly one peer link, and reporting its lifecycle to the
//! game layer.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods mutate only local state
//! - Channel effects come back as [`SessionAction`] values
//! - Driver code executes actions (dial the peer, clear the round)
//!
//! This keeps the lifecycle logic free of I/O, so the same code runs under
//! the production transport and the deterministic test harness.
//!
//! # State Machine
//!
//! ```text
//!         createInvitation
//!        ┌──────────┐
//!        ↓          │
//! ┌──────────┐──────┘ acceptInvitation ┌────────────┐
//! │   Idle   │───────────────────────>│ Connecting  │
//! └──────────┘                         └────────────┘
//!        │ incoming channel                   │ channel open
//!        ↓                                    ↓
//! ┌───────────┐      close / error     ┌────────────┐
//! │ Connected │──────────────────────>│Disconnected │
//! └───────────┘                        └────────────┘
//! ```
//!
//! `Disconnected` is terminal for this session; the UI layer may construct
//! a fresh [`Session`] to retry, the protocol does not auto-reconnect.

use crate::{
    error::SessionError,
    invite::{InviteToken, PeerId},
};

/// Actions returned by the lifecycle state machine.
///
/// The driver (UI shell or test harness) executes these:
/// - `OpenChannel`: ask the transport collaborator to dial the peer
/// - `ClearRound`: drop the game engine's round state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Dial an outbound data channel to this peer.
    OpenChannel {
        /// Identity decoded from the accepted invitation.
        remote: PeerId,
    },

    /// Clear the game engine's round state so a stale result cannot
    /// survive a dropped connection.
    ClearRound,
}

/// Lifecycle of the single peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No channel requested yet.
    Idle,
    /// Outbound channel dialing, waiting for open.
    Connecting,
    /// Channel open in both directions.
    Connected,
    /// Channel closed or failed.
    Disconnected,
}

/// Which side of the game this instance is.
///
/// Decided once at game creation/join and fixed for the session. Besides
/// labeling, the role is the deterministic tie-break when both peers throw
/// before seeing each other's choice (see [`crate::round`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Created the game and allocated the shareable invitation.
    Initiator,
    /// Connected using an invitation.
    Joiner,
}

/// Connection lifecycle manager.
///
/// Owns the local identity and at most one peer link. Pure state machine:
/// no I/O, no stored channel handle; the driver owns the actual channel and
/// feeds its events in.
#[derive(Debug, Clone)]
pub struct Session {
    local: PeerId,
    remote: Option<PeerId>,
    role: Option<Role>,
    state: LinkState,
}

impl Session {
    /// Create a session around the transport-assigned identity.
    pub fn new(local: PeerId) -> Self {
        Self { local, remote: None, role: None, state: LinkState::Idle }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// This instance's role, once a game has been created or joined.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The transport-assigned local identity.
    #[must_use]
    pub fn local_id(&self) -> &PeerId {
        &self.local
    }

    /// The peer's identity, once known.
    #[must_use]
    pub fn remote_id(&self) -> Option<&PeerId> {
        self.remote.as_ref()
    }

    /// Allocate a shareable invitation for this instance.
    ///
    /// No channel is opened; the session stays idle and waits for the peer
    /// to dial in. Calling again regenerates the same token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` once a channel exists, or after this side
    /// already joined someone else's game.
    pub fn create_invitation(&mut self) -> Result<(PeerId, InviteToken), SessionError> {
        if self.state != LinkState::Idle || self.role == Some(Role::Joiner) {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "create an invitation",
            });
        }
        self.role = Some(Role::Initiator);
        Ok((self.local.clone(), InviteToken::for_peer(&self.local)))
    }

    /// Accept a peer's invitation and start dialing them.
    ///
    /// On success the session moves to `Connecting` and the returned
    /// `OpenChannel` action names the peer to dial.
    ///
    /// # Errors
    ///
    /// `InvalidInvitation` if the token does not decode or names this
    /// instance itself (the initiator opening their own link); the session
    /// stays idle and the user may retry. `InvalidState` if a link already
    /// exists or this side already created a game.
    pub fn accept_invitation(
        &mut self,
        token: &InviteToken,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != LinkState::Idle {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "accept an invitation",
            });
        }
        let remote = token.peer_id()?;
        if remote == self.local {
            return Err(SessionError::InvalidInvitation {
                reason: "the invitation names this instance".to_string(),
            });
        }
        if self.role == Some(Role::Initiator) {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "accept an invitation",
            });
        }
        self.role = Some(Role::Joiner);
        self.remote = Some(remote.clone());
        self.state = LinkState::Connecting;
        Ok(vec![SessionAction::OpenChannel { remote }])
    }

    /// A remote party opened a channel to this instance.
    ///
    /// Accepting a channel implies readiness, so this transitions straight
    /// to `Connected`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session was idle: the session
    /// holds exactly one peer link.
    pub fn on_incoming_channel(&mut self, remote: PeerId) -> Result<(), SessionError> {
        if self.state != LinkState::Idle {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "accept an incoming channel",
            });
        }
        self.role.get_or_insert(Role::Initiator);
        self.remote = Some(remote);
        self.state = LinkState::Connected;
        Ok(())
    }

    /// The outbound channel finished opening.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no dial was in progress. A duplicate open
    /// event while already connected is tolerated.
    pub fn on_channel_open(&mut self) -> Result<(), SessionError> {
        match self.state {
            LinkState::Connecting => {
                self.state = LinkState::Connected;
                Ok(())
            },
            LinkState::Connected => Ok(()),
            state => Err(SessionError::InvalidState { state, operation: "open the channel" }),
        }
    }

    /// The channel closed, gracefully or not.
    ///
    /// Always clears the round: a stale result must not survive a dropped
    /// connection.
    pub fn on_channel_closed(&mut self) -> Vec<SessionAction> {
        self.state = LinkState::Disconnected;
        vec![SessionAction::ClearRound]
    }

    /// The transport reported a channel failure.
    ///
    /// Forces `Disconnected` and hands back the displayable error; a
    /// stuck `Connecting` state would leave the user unable to tell whether
    /// to retry.
    pub fn on_channel_error(
        &mut self,
        reason: impl Into<String>,
    ) -> (SessionError, Vec<SessionAction>) {
        self.state = LinkState::Disconnected;
        (SessionError::Transport { reason: reason.into() }, vec![SessionAction::ClearRound])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(PeerId::new("local-peer"))
    }

    #[test]
    fn invitation_keeps_session_idle() {
        let mut s = session();
        let (id, token) = s.create_invitation().unwrap();

        assert_eq!(s.state(), LinkState::Idle);
        assert_eq!(s.role(), Some(Role::Initiator));
        assert_eq!(id, PeerId::new("local-peer"));
        assert_eq!(token.peer_id().unwrap(), id);
    }

    #[test]
    fn accept_dials_the_decoded_peer() {
        let mut s = session();
        let token = InviteToken::for_peer(&PeerId::new("remote-peer"));

        let actions = s.accept_invitation(&token).unwrap();
        assert_eq!(s.state(), LinkState::Connecting);
        assert_eq!(s.role(), Some(Role::Joiner));
        assert_eq!(
            actions,
            vec![SessionAction::OpenChannel { remote: PeerId::new("remote-peer") }]
        );

        s.on_channel_open().unwrap();
        assert_eq!(s.state(), LinkState::Connected);
        assert_eq!(s.remote_id(), Some(&PeerId::new("remote-peer")));
    }

    #[test]
    fn malformed_token_leaves_session_idle() {
        let mut s = session();
        let err = s.accept_invitation(&InviteToken::new("zz-not-a-token")).unwrap_err();

        assert!(matches!(err, SessionError::InvalidInvitation { .. }));
        assert_eq!(s.state(), LinkState::Idle);
        assert_eq!(s.role(), None);

        // Recoverable: a corrected token works on retry.
        let token = InviteToken::for_peer(&PeerId::new("remote-peer"));
        s.accept_invitation(&token).unwrap();
        assert_eq!(s.state(), LinkState::Connecting);
    }

    #[test]
    fn own_invitation_is_rejected() {
        let mut s = session();
        let (_, token) = s.create_invitation().unwrap();

        // Pretend a second instance with the same identity loads the link.
        let mut same = session();
        let err = same.accept_invitation(&token).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInvitation { .. }));
        assert_eq!(same.state(), LinkState::Idle);
    }

    #[test]
    fn initiator_cannot_join_elsewhere() {
        let mut s = session();
        s.create_invitation().unwrap();

        let token = InviteToken::for_peer(&PeerId::new("remote-peer"));
        let err = s.accept_invitation(&token).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));
        assert_eq!(s.role(), Some(Role::Initiator));
    }

    #[test]
    fn incoming_channel_connects_directly() {
        let mut s = session();
        s.create_invitation().unwrap();

        s.on_incoming_channel(PeerId::new("remote-peer")).unwrap();
        assert_eq!(s.state(), LinkState::Connected);
        assert_eq!(s.role(), Some(Role::Initiator));
        assert_eq!(s.remote_id(), Some(&PeerId::new("remote-peer")));
    }

    #[test]
    fn second_incoming_channel_is_rejected() {
        let mut s = session();
        s.on_incoming_channel(PeerId::new("first")).unwrap();

        let err = s.on_incoming_channel(PeerId::new("second")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));
        assert_eq!(s.remote_id(), Some(&PeerId::new("first")));
    }

    #[test]
    fn close_disconnects_and_clears_round() {
        let mut s = session();
        s.on_incoming_channel(PeerId::new("remote-peer")).unwrap();

        let actions = s.on_channel_closed();
        assert_eq!(s.state(), LinkState::Disconnected);
        assert_eq!(actions, vec![SessionAction::ClearRound]);
    }

    #[test]
    fn transport_error_surfaces_and_disconnects() {
        let mut s = session();
        let token = InviteToken::for_peer(&PeerId::new("remote-peer"));
        s.accept_invitation(&token).unwrap();

        let (err, actions) = s.on_channel_error("ICE negotiation failed");
        assert_eq!(s.state(), LinkState::Disconnected);
        assert_eq!(actions, vec![SessionAction::ClearRound]);
        assert_eq!(
            err,
            SessionError::Transport { reason: "ICE negotiation failed".to_string() }
        );
        assert!(err.to_string().contains("ICE negotiation failed"));
    }

    #[test]
    fn open_without_dial_is_invalid() {
        let mut s = session();
        let err = s.on_channel_open().unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));
    }

    #[test]
    fn no_operation_revives_a_disconnected_session() {
        let mut s = session();
        s.on_incoming_channel(PeerId::new("remote-peer")).unwrap();
        s.on_channel_closed();

        assert!(s.create_invitation().is_err());
        let token = InviteToken::for_peer(&PeerId::new("another-peer"));
        assert!(s.accept_invitation(&token).is_err());
        assert!(s.on_incoming_channel(PeerId::new("another-peer")).is_err());
        assert_eq!(s.state(), LinkState::Disconnected);
    }
}
