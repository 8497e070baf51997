//! UI-facing application state machine.

use rand::Rng;
use roshambo_core::{
    InviteToken, LinkState, PeerId, Role, Round, RoundAction, RoundError, Session, SessionAction,
    SessionError,
};
use roshambo_proto::{Choice, GameMessage, Outcome};
use tracing::{debug, warn};
use url::Url;

use crate::link::{self, GameId, GameLink};

/// Effects the transport collaborator must execute for the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEffect {
    /// Dial an outbound data channel to this peer.
    OpenChannel(PeerId),
    /// Send these bytes over the open data channel.
    SendData(Vec<u8>),
}

/// Application state observed by the UI.
///
/// All protocol logic lives in the core state machines; this type routes
/// user actions, transport events and inbound bytes into them, executes
/// the actions they return, and keeps one displayable status line. No
/// method panics and no error here is fatal: at worst the session ends up
/// disconnected or idle and the user starts over.
#[derive(Debug)]
pub struct App {
    session: Session,
    round: Option<Round>,
    share_link: Option<Url>,
    status: Option<String>,
}

impl App {
    /// New app around the transport-assigned identity.
    pub fn new(local: PeerId) -> Self {
        Self { session: Session::new(local), round: None, share_link: None, status: None }
    }

    /// Lifecycle state, for gating UI controls.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.session.state()
    }

    /// The transport-assigned local identity.
    #[must_use]
    pub fn local_id(&self) -> &PeerId {
        self.session.local_id()
    }

    /// This side's role, once the game is created or joined.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    /// The current round, while a channel is connected.
    #[must_use]
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// The decided outcome, if the round is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.round.as_ref().and_then(Round::outcome)
    }

    /// The shareable link allocated by [`App::create_game`].
    #[must_use]
    pub fn share_link(&self) -> Option<&Url> {
        self.share_link.as_ref()
    }

    /// Most recent displayable status or error line.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Create a game and allocate the shareable invitation link.
    ///
    /// Returns `None` with [`App::status`] set if the session cannot host
    /// a game anymore.
    pub fn create_game<R: Rng>(&mut self, base: &Url, rng: &mut R) -> Option<Url> {
        match self.session.create_invitation() {
            Ok((_, token)) => {
                let game_id = GameId::generate(rng);
                let url = link::build_game_link(base, &game_id, &token);
                debug!(%game_id, "created game");
                self.share_link = Some(url.clone());
                Some(url)
            },
            Err(err) => {
                self.report(&err);
                None
            },
        }
    }

    /// Join a game from a shared link.
    pub fn join_game(&mut self, url: &Url) -> Vec<AppEffect> {
        match link::parse_game_link(url) {
            Some(GameLink { game_id, token }) => {
                debug!(%game_id, "joining game");
                self.accept_invitation(&token)
            },
            None => {
                warn!(%url, "link carries no game parameters");
                self.status = Some("this link is not a game invitation".to_string());
                Vec::new()
            },
        }
    }

    /// Join a game from a bare invitation token.
    pub fn accept_invitation(&mut self, token: &InviteToken) -> Vec<AppEffect> {
        match self.session.accept_invitation(token) {
            Ok(actions) => self.run_session_actions(actions),
            Err(err) => {
                self.report(&err);
                Vec::new()
            },
        }
    }

    /// Transport event: a remote peer opened a channel to this instance.
    pub fn on_incoming_channel(&mut self, remote: PeerId) {
        match self.session.on_incoming_channel(remote) {
            Ok(()) => self.start_round(),
            Err(err) => self.report(&err),
        }
    }

    /// Transport event: the outbound channel finished opening.
    pub fn on_channel_open(&mut self) {
        match self.session.on_channel_open() {
            Ok(()) => self.start_round(),
            Err(err) => self.report(&err),
        }
    }

    /// Transport event: the channel closed.
    pub fn on_channel_closed(&mut self) {
        let actions = self.session.on_channel_closed();
        self.run_session_actions(actions);
        debug!("channel closed");
        self.status = Some("connection closed".to_string());
    }

    /// Transport event: the channel failed.
    pub fn on_channel_error(&mut self, reason: &str) {
        let (err, actions) = self.session.on_channel_error(reason);
        self.run_session_actions(actions);
        warn!(%reason, "transport failure");
        self.status = Some(err.to_string());
    }

    /// Bytes arrived on the data channel.
    ///
    /// Malformed and protocol-violating messages are discarded: they show
    /// up in [`App::status`] and the log, but never mutate round state.
    pub fn on_data(&mut self, bytes: &[u8]) -> Vec<AppEffect> {
        let msg = match GameMessage::decode(bytes) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(%err, "discarding undecodable peer message");
                self.status = Some(err.to_string());
                return Vec::new();
            },
        };
        let Some(round) = self.round.as_mut() else {
            warn!(?msg, "peer message outside a connected round");
            return Vec::new();
        };
        match round.handle_message(msg) {
            Ok(actions) => self.run_round_actions(actions),
            Err(violation) => {
                warn!(%violation, "discarding peer message");
                self.status = Some(violation.to_string());
                Vec::new()
            },
        }
    }

    /// The local player picked a throw.
    pub fn submit_choice(&mut self, choice: Choice) -> Vec<AppEffect> {
        let state = self.session.state();
        let Some(round) = self.round.as_mut() else {
            let err = RoundError::NotConnected { state };
            warn!(%err, "rejected throw");
            self.status = Some(err.to_string());
            return Vec::new();
        };
        match round.submit_choice(choice, state) {
            Ok(actions) => self.run_round_actions(actions),
            Err(err) => {
                warn!(%err, "rejected throw");
                self.status = Some(err.to_string());
                Vec::new()
            },
        }
    }

    /// Clear the round on both sides.
    pub fn request_reset(&mut self) -> Vec<AppEffect> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };
        let actions = round.request_reset();
        self.run_round_actions(actions)
    }

    fn start_round(&mut self) {
        // Incoming channels may arrive before any local action set a role.
        let role = self.session.role().unwrap_or(Role::Initiator);
        self.round = Some(Round::new(role));
        self.status = None;
        debug!(?role, "connected, round open");
    }

    fn run_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<AppEffect> {
        let mut effects = Vec::new();
        for action in actions {
            match action {
                SessionAction::OpenChannel { remote } => {
                    effects.push(AppEffect::OpenChannel(remote));
                },
                SessionAction::ClearRound => {
                    // Torn down rather than merely cleared: a round only
                    // exists while a channel does.
                    self.round = None;
                },
            }
        }
        effects
    }

    fn run_round_actions(&mut self, actions: Vec<RoundAction>) -> Vec<AppEffect> {
        let mut effects = Vec::new();
        for action in actions {
            match action {
                RoundAction::Send(msg) => match msg.encode() {
                    Ok(bytes) => effects.push(AppEffect::SendData(bytes)),
                    Err(err) => {
                        warn!(%err, "failed to encode outbound message");
                        self.status = Some(err.to_string());
                    },
                },
            }
        }
        effects
    }

    fn report(&mut self, err: &SessionError) {
        warn!(%err, "rejected operation");
        self.status = Some(err.to_string());
    }
}
