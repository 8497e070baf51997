//! World state for two simulated peers.
//!
//! The World owns both app instances, plays the transport collaborator
//! between them (handshake events, FIFO message queues, link faults),
//! tracks wire metrics, and provides oracle verification helpers.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;
use roshambo_app::{App, AppEffect};
use roshambo_core::PeerId;
use roshambo_proto::{Choice, GameMessage, Outcome};
use tracing::debug;
use url::Url;

/// Base URL used for generated share links.
const BASE_URL: &str = "https://play.example/";

struct Actor {
    app: App,
    inbox: VecDeque<Vec<u8>>,
    peer: Option<String>,
}

/// Two peers joined by an in-memory FIFO link.
///
/// Each direction of the link is its own queue, so per-link ordering is
/// preserved while the interleaving *across* the two directions stays
/// under test control, matching the concurrency model of the real channel.
pub struct World {
    actors: BTreeMap<String, Actor>,
    link_up: bool,
    sent: BTreeMap<String, usize>,
    received: BTreeMap<String, usize>,
    results_on_wire: usize,
}

impl World {
    /// Empty world with the link considered up.
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            link_up: true,
            sent: BTreeMap::new(),
            received: BTreeMap::new(),
            results_on_wire: 0,
        }
    }

    /// Add a peer with a transport-assigned identity.
    pub fn add_peer(&mut self, name: &str, identity: &str) {
        let actor =
            Actor { app: App::new(PeerId::new(identity)), inbox: VecDeque::new(), peer: None };
        self.actors.insert(name.to_string(), actor);
        self.sent.insert(name.to_string(), 0);
        self.received.insert(name.to_string(), 0);
    }

    /// Run the create/share/join/open handshake between two peers.
    ///
    /// `initiator` allocates the share link and `joiner` loads it; the
    /// world then plays the transport, raising the incoming-channel event
    /// on the initiator and the open event on the joiner.
    pub fn connect<R: Rng>(
        &mut self,
        initiator: &str,
        joiner: &str,
        rng: &mut R,
    ) -> Result<(), String> {
        let base = Url::parse(BASE_URL).map_err(|err| err.to_string())?;
        let link = {
            let actor = self.actor_mut(initiator)?;
            actor
                .app
                .create_game(&base, rng)
                .ok_or_else(|| format!("{initiator} could not create a game"))?
        };

        let effects = self.actor_mut(joiner)?.app.join_game(&link);
        if !effects.iter().any(|e| matches!(e, AppEffect::OpenChannel(_))) {
            return Err(format!("{joiner} did not dial after loading the link"));
        }

        let joiner_id = self.actor(joiner)?.app.local_id().clone();
        self.actor_mut(initiator)?.app.on_incoming_channel(joiner_id);
        self.actor_mut(joiner)?.app.on_channel_open();

        self.actor_mut(initiator)?.peer = Some(joiner.to_string());
        self.actor_mut(joiner)?.peer = Some(initiator.to_string());
        debug!(initiator, joiner, "peers connected");
        Ok(())
    }

    /// Submit a throw for a peer, routing outbound messages onto the link.
    pub fn submit(&mut self, name: &str, choice: Choice) -> Result<(), String> {
        let effects = self.actor_mut(name)?.app.submit_choice(choice);
        self.route(name, effects)
    }

    /// Request a round reset from a peer.
    pub fn reset(&mut self, name: &str) -> Result<(), String> {
        let effects = self.actor_mut(name)?.app.request_reset();
        self.route(name, effects)
    }

    /// Deliver the oldest queued message to `name`, if any.
    ///
    /// Returns whether a message was delivered.
    pub fn deliver_one(&mut self, name: &str) -> Result<bool, String> {
        let Some(bytes) = self.actor_mut(name)?.inbox.pop_front() else {
            return Ok(false);
        };
        if let Some(count) = self.received.get_mut(name) {
            *count += 1;
        }
        let effects = self.actor_mut(name)?.app.on_data(&bytes);
        self.route(name, effects)?;
        Ok(true)
    }

    /// Deliver queued messages, alternating between peers, until both
    /// inboxes drain.
    pub fn deliver_all(&mut self) -> Result<(), String> {
        let names: Vec<String> = self.actors.keys().cloned().collect();
        loop {
            let mut delivered = false;
            for name in &names {
                delivered |= self.deliver_one(name)?;
            }
            if !delivered {
                return Ok(());
            }
        }
    }

    /// Deliver queued messages one at a time, picking the receiving peer
    /// at random, until both inboxes drain.
    pub fn deliver_shuffled<R: Rng>(&mut self, rng: &mut R) -> Result<(), String> {
        loop {
            let pending: Vec<String> = self
                .actors
                .iter()
                .filter(|(_, actor)| !actor.inbox.is_empty())
                .map(|(name, _)| name.clone())
                .collect();
            if pending.is_empty() {
                return Ok(());
            }
            let pick = &pending[rng.gen_range(0..pending.len())];
            self.deliver_one(pick)?;
        }
    }

    /// Close the link. Both sides observe the close event; in-flight
    /// messages are lost.
    pub fn close_link(&mut self) {
        self.link_up = false;
        for actor in self.actors.values_mut() {
            actor.inbox.clear();
            actor.app.on_channel_closed();
        }
    }

    /// Fail the link with a transport error on both sides.
    pub fn fail_link(&mut self, reason: &str) {
        self.link_up = false;
        for actor in self.actors.values_mut() {
            actor.inbox.clear();
            actor.app.on_channel_error(reason);
        }
    }

    /// Queue raw bytes for `name`, as a misbehaving peer would.
    pub fn inject(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), String> {
        self.actor_mut(name)?.inbox.push_back(bytes);
        Ok(())
    }

    /// A peer's app, for state assertions.
    pub fn app(&self, name: &str) -> Result<&App, String> {
        Ok(&self.actor(name)?.app)
    }

    /// A peer's decided outcome, if the round is terminal.
    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<Outcome> {
        self.actors.get(name).and_then(|actor| actor.app.outcome())
    }

    /// Number of messages a peer has sent.
    #[must_use]
    pub fn sent(&self, name: &str) -> usize {
        self.sent.get(name).copied().unwrap_or(0)
    }

    /// Number of messages delivered to a peer.
    #[must_use]
    pub fn received(&self, name: &str) -> usize {
        self.received.get(name).copied().unwrap_or(0)
    }

    /// Total `result` messages that have crossed the wire.
    #[must_use]
    pub fn results_on_wire(&self) -> usize {
        self.results_on_wire
    }

    /// Oracle helper: both outcomes held, each the mirror of the other.
    #[must_use]
    pub fn outcomes_mirrored(&self, a: &str, b: &str) -> bool {
        match (self.outcome_of(a), self.outcome_of(b)) {
            (Some(here), Some(there)) => here == there.mirrored(),
            _ => false,
        }
    }

    /// Oracle helper: neither peer holds any round state.
    #[must_use]
    pub fn rounds_clear(&self) -> bool {
        self.actors.values().all(|actor| match actor.app.round() {
            Some(round) => {
                round.local_choice().is_none()
                    && round.remote_choice().is_none()
                    && round.outcome().is_none()
            },
            None => true,
        })
    }

    fn actor(&self, name: &str) -> Result<&Actor, String> {
        self.actors.get(name).ok_or_else(|| format!("unknown peer {name}"))
    }

    fn actor_mut(&mut self, name: &str) -> Result<&mut Actor, String> {
        self.actors.get_mut(name).ok_or_else(|| format!("unknown peer {name}"))
    }

    fn route(&mut self, from: &str, effects: Vec<AppEffect>) -> Result<(), String> {
        for effect in effects {
            match effect {
                // Dialing is simulated by `connect`.
                AppEffect::OpenChannel(_) => {},
                AppEffect::SendData(bytes) => {
                    if let Some(count) = self.sent.get_mut(from) {
                        *count += 1;
                    }
                    if matches!(GameMessage::decode(&bytes), Ok(GameMessage::Result { .. })) {
                        self.results_on_wire += 1;
                    }
                    if !self.link_up {
                        // Lost on the floor; the lifecycle path reports the
                        // failure, not the engine.
                        continue;
                    }
                    let to = self
                        .actor(from)?
                        .peer
                        .clone()
                        .ok_or_else(|| format!("{from} has no connected peer"))?;
                    self.actor_mut(&to)?.inbox.push_back(bytes);
                },
            }
        }
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
