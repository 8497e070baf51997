//! Peer identity and invitation tokens.
//!
//! The transport collaborator assigns each instance an opaque identity
//! string. An invitation token is that string reversibly encoded as text so
//! it survives being pasted into a URL query parameter; the encoding
//! carries no meaning to the protocol and any reversible textual encoding
//! would do.

use std::fmt;

use crate::error::SessionError;

/// Opaque peer identity assigned by the transport collaborator.
///
/// The protocol never inspects its content; it only hands it back to the
/// transport when dialing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a transport-assigned identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shareable invitation token encoding a [`PeerId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteToken(String);

impl InviteToken {
    /// Encode an identity into a token.
    pub fn for_peer(id: &PeerId) -> Self {
        Self(hex::encode(id.as_str()))
    }

    /// Wrap token text received from a link or typed in by the user.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the identity this token encodes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidInvitation`] if the token is not a
    /// reversible encoding of a non-empty identity string.
    pub fn peer_id(&self) -> Result<PeerId, SessionError> {
        let bytes = hex::decode(&self.0)
            .map_err(|err| SessionError::InvalidInvitation { reason: err.to_string() })?;
        let id = String::from_utf8(bytes)
            .map_err(|err| SessionError::InvalidInvitation { reason: err.to_string() })?;
        if id.is_empty() {
            return Err(SessionError::InvalidInvitation {
                reason: "token encodes an empty identity".to_string(),
            });
        }
        Ok(PeerId(id))
    }
}

impl fmt::Display for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
