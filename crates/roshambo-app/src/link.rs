//! Shareable-link collaborator.
//!
//! Builds and parses game links of the form
//! `https://host/?game=<id>&peerId=<token>`. The token text is opaque here;
//! the core decodes it when the link is accepted.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use roshambo_core::InviteToken;
use url::Url;

/// Query parameter naming the game id.
const GAME_PARAM: &str = "game";
/// Query parameter carrying the encoded peer identity.
const PEER_PARAM: &str = "peerId";
/// Length of generated game ids.
const GAME_ID_LEN: usize = 8;

/// Short random tag identifying a game in a shareable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameId(String);

impl GameId {
    /// Generate a fresh id from the caller's RNG.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let id = (0..GAME_ID_LEN).map(|_| char::from(rng.sample(Alphanumeric))).collect();
        Self(id)
    }

    /// Wrap an id parsed from a link.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters extracted from a shareable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLink {
    /// Tag identifying the game.
    pub game_id: GameId,
    /// Encoded identity of the peer to dial.
    pub token: InviteToken,
}

/// Build the shareable link for a game.
///
/// Any query already on `base` is replaced.
#[must_use]
pub fn build_game_link(base: &Url, game_id: &GameId, token: &InviteToken) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair(GAME_PARAM, game_id.as_str())
        .append_pair(PEER_PARAM, token.as_str());
    url
}

/// Extract game parameters from a link.
///
/// Returns `None` when either parameter is missing: the link is then not
/// a game invitation at all, as opposed to a malformed one.
#[must_use]
pub fn parse_game_link(url: &Url) -> Option<GameLink> {
    let mut game_id = None;
    let mut token = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            GAME_PARAM => game_id = Some(GameId::new(value.into_owned())),
            PEER_PARAM => token = Some(InviteToken::new(value.into_owned())),
            _ => {},
        }
    }
    Some(GameLink { game_id: game_id?, token: token? })
}
