//! Peer connection state.

use serde::{Deserialize, Serialize};

/// Connection state of a peer within the session.
///
/// Transitions are driven solely by peer-state-changed events from the
/// native layer; a peer the session has never observed is `NotConnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerState {
    /// Not connected to the session.
    #[default]
    NotConnected,
    /// Invitation accepted, connection being established.
    Connecting,
    /// Fully connected to the session.
    Connected,
}

impl PeerState {
    /// Decode the wire representation used by the native layer.
    ///
    /// Returns `None` for values outside the known set, which signals a
    /// native/managed protocol mismatch.
    #[must_use]
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::NotConnected),
            1 => Some(Self::Connecting),
            2 => Some(Self::Connected),
            _ => None,
        }
    }

    /// The wire representation used by the native layer.
    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::NotConnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
        }
    }
}

impl std::fmt::Display for PeerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "NotConnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        for state in [
            PeerState::NotConnected,
            PeerState::Connecting,
            PeerState::Connected,
        ] {
            assert_eq!(PeerState::from_wire(state.to_wire()), Some(state));
        }
    }

    #[test]
    fn unknown_wire_value_rejected() {
        assert_eq!(PeerState::from_wire(3), None);
        assert_eq!(PeerState::from_wire(u32::MAX), None);
    }

    #[test]
    fn default_is_not_connected() {
        assert_eq!(PeerState::default(), PeerState::NotConnected);
    }
}
