//! Scenario builder API.
//!
//! Declarative construction of two-peer game scenarios that enforces the
//! oracle pattern: a scenario cannot run without a verification function.
//!
//! Moves run with full delivery between them, so a scenario models the
//! sequential exchange; race interleavings are tested directly against
//! [`World`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use roshambo_proto::Choice;

use crate::world::World;

/// Verification function run against the final world state.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;

#[derive(Debug, Clone, Copy)]
enum Move {
    Play(Choice),
    Reset,
}

/// Scenario builder.
///
/// Construct a scenario by naming the two peers and scripting their moves.
/// Must call `.oracle()` to get a [`RunnableScenario`] that can be
/// executed.
pub struct Scenario {
    name: String,
    initiator: Option<String>,
    joiner: Option<String>,
    moves: Vec<(String, Move)>,
    seed: u64,
}

impl Scenario {
    /// Create a new scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), initiator: None, joiner: None, moves: Vec::new(), seed: 0 }
    }

    /// Name the peer that creates the game.
    pub fn initiator(mut self, name: impl Into<String>) -> Self {
        self.initiator = Some(name.into());
        self
    }

    /// Name the peer that joins via the share link.
    pub fn joiner(mut self, name: impl Into<String>) -> Self {
        self.joiner = Some(name.into());
        self
    }

    /// Script a throw for a peer.
    pub fn choice(mut self, actor: impl Into<String>, choice: Choice) -> Self {
        self.moves.push((actor.into(), Move::Play(choice)));
        self
    }

    /// Script a reset request from a peer.
    pub fn reset(mut self, actor: impl Into<String>) -> Self {
        self.moves.push((actor.into(), Move::Reset));
        self
    }

    /// Seed for game-id generation.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory: a scenario cannot run without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Connects the two peers through the full create/share/join/open
    /// handshake, applies the scripted moves with complete delivery after
    /// each, then runs the oracle against the final world.
    pub fn run(self) -> Result<(), String> {
        let Scenario { name, initiator, joiner, moves, seed } = self.scenario;
        let initiator = initiator.ok_or_else(|| format!("scenario '{name}': no initiator"))?;
        let joiner = joiner.ok_or_else(|| format!("scenario '{name}': no joiner"))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = World::new();
        world.add_peer(&initiator, &format!("{initiator}-id"));
        world.add_peer(&joiner, &format!("{joiner}-id"));
        world
            .connect(&initiator, &joiner, &mut rng)
            .map_err(|err| format!("scenario '{name}': {err}"))?;

        for (actor, mv) in moves {
            match mv {
                Move::Play(choice) => world.submit(&actor, choice),
                Move::Reset => world.reset(&actor),
            }
            .map_err(|err| format!("scenario '{name}': {err}"))?;
            world.deliver_all().map_err(|err| format!("scenario '{name}': {err}"))?;
        }

        (self.oracle)(&world)
    }
}
