//! Session lifecycle and the connected-peer roster.

use std::collections::HashMap;

use nearplay_native::{
    escalate, escalate_value, swallow, MediatorError, PeerIdentity, SharedMediator,
};
use nearplay_types::{PeerName, PeerState, ServiceType};
use tracing::{debug, info};

/// Externally observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecycle {
    /// No session running; configuration may be changed.
    Idle,
    /// Session running: advertising membership, tracking peers.
    Active,
}

impl std::fmt::Display for SessionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
        }
    }
}

/// The local multiplayer session: configuration, start/stop, and the live
/// roster of peers with their per-peer connection state.
///
/// Configuration follows sanitize-then-set: values are cleaned up and
/// truncated rather than rejected, but an empty value is a caller error.
/// All state here is owned by the consumer thread; the roster changes only
/// through event intake and explicit roster queries.
pub struct Session {
    service: SharedMediator,
    lifecycle: SessionLifecycle,
    service_type: Option<ServiceType>,
    peer_name: Option<PeerName>,
    server_port: Option<u16>,
    roster: HashMap<PeerIdentity, PeerState>,
}

impl Session {
    pub(crate) fn new(service: SharedMediator) -> Self {
        Self {
            service,
            lifecycle: SessionLifecycle::Idle,
            service_type: None,
            peer_name: None,
            server_port: None,
            roster: HashMap::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }

    /// Whether the session is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == SessionLifecycle::Active
    }

    /// Set the service type identifier — effectively, the name of the
    /// "room". Lower-cased, stripped to `[a-z0-9-]`, truncated to 15
    /// characters; must be the same for all peers who want to join.
    pub fn set_service_type(&mut self, service_type: &str) -> Result<(), MediatorError> {
        let sanitized = ServiceType::new(service_type)
            .map_err(|e| MediatorError::InvalidInput(e.to_string()))?;
        escalate(&self.service, self.service.set_service_type(sanitized.as_str()))?;
        self.service_type = Some(sanitized);
        Ok(())
    }

    /// Set the display name of the local peer, truncated to 63 UTF-8 bytes
    /// on a codepoint boundary.
    pub fn set_local_peer_name(&mut self, name: &str) -> Result<(), MediatorError> {
        let truncated =
            PeerName::new(name).map_err(|e| MediatorError::InvalidInput(e.to_string()))?;
        escalate(&self.service, self.service.set_display_name(truncated.as_str()))?;
        self.peer_name = Some(truncated);
        Ok(())
    }

    /// Set the server port. Must match the port used by the game networking
    /// server.
    pub fn set_server_port(&mut self, port: u16) -> Result<(), MediatorError> {
        escalate(&self.service, self.service.set_server_port(port))?;
        self.server_port = Some(port);
        Ok(())
    }

    /// The sanitized service type, once set.
    #[must_use]
    pub fn service_type(&self) -> Option<&ServiceType> {
        self.service_type.as_ref()
    }

    /// The truncated local peer name, once set.
    #[must_use]
    pub fn local_peer_name(&self) -> Option<&PeerName> {
        self.peer_name.as_ref()
    }

    /// The configured server port, once set.
    #[must_use]
    pub fn server_port(&self) -> Option<u16> {
        self.server_port
    }

    /// Start the session: begin advertising membership over the configured
    /// service and port.
    ///
    /// Fails with [`MediatorError::SessionActive`] if already active.
    pub fn start_session(&mut self) -> Result<(), MediatorError> {
        if self.is_active() {
            return Err(MediatorError::SessionActive);
        }
        escalate(&self.service, self.service.start_session())?;
        self.lifecycle = SessionLifecycle::Active;
        info!(
            service_type = self.service_type.as_ref().map(ServiceType::as_str),
            "session started"
        );
        Ok(())
    }

    /// Disconnect from the session.
    ///
    /// Best-effort: returns `false` instead of failing when the session is
    /// not active — "can't stop what isn't started" is not exceptional.
    pub fn stop_session(&mut self) -> bool {
        let stopped = swallow(&self.service, self.service.disconnect_from_session()).is_some();
        if stopped {
            self.lifecycle = SessionLifecycle::Idle;
            self.roster.clear();
            info!("session stopped");
        }
        stopped
    }

    /// Peers currently in state [`PeerState::Connected`], as a fresh vector.
    ///
    /// Queries the native layer and records the result in the roster; an
    /// empty session yields an empty vector, never an error.
    pub fn connected_peers(&mut self) -> Result<Vec<PeerIdentity>, MediatorError> {
        let mut peers = Vec::new();
        self.connected_peers_into(&mut peers)?;
        Ok(peers)
    }

    /// Like [`connected_peers`](Self::connected_peers), but refills a caller
    /// buffer, reusing its allocation. Returns the number of peers written.
    pub fn connected_peers_into(
        &mut self,
        out: &mut Vec<PeerIdentity>,
    ) -> Result<usize, MediatorError> {
        out.clear();
        let raw = escalate_value(&self.service, self.service.connected_peers(None))?;
        out.extend(
            raw.into_iter()
                .map(|r| PeerIdentity::adopt(&self.service, r)),
        );
        for peer in out.iter() {
            self.roster.insert(peer.clone(), PeerState::Connected);
        }
        Ok(out.len())
    }

    /// Number of connected peers.
    ///
    /// Best-effort: reports zero when the native query fails.
    #[must_use]
    pub fn connected_peer_count(&self) -> usize {
        swallow(&self.service, self.service.connected_peer_count()).unwrap_or(0)
    }

    /// Connection state of `peer`. A peer the session has never observed is
    /// [`PeerState::NotConnected`].
    #[must_use]
    pub fn peer_state(&self, peer: &PeerIdentity) -> PeerState {
        self.roster.get(peer).copied().unwrap_or_default()
    }

    // --- event intake (consumer thread, via LocalMediator) ----------------

    pub(crate) fn on_started(&mut self) {
        self.lifecycle = SessionLifecycle::Active;
    }

    pub(crate) fn on_stopped(&mut self) {
        self.lifecycle = SessionLifecycle::Idle;
        self.roster.clear();
        debug!("session disconnected; roster cleared");
    }

    pub(crate) fn on_peer_state_changed(&mut self, peer: PeerIdentity, state: PeerState) {
        debug!(peer = %peer, state = %state, "peer state changed");
        self.roster.insert(peer, state);
    }

    pub(crate) fn roster_connected(&self) -> Vec<PeerIdentity> {
        self.roster
            .iter()
            .filter(|(_, state)| **state == PeerState::Connected)
            .map(|(peer, _)| peer.clone())
            .collect()
    }
}

/// Fresh roster snapshot without a native round-trip, used by tests and by
/// consumers that only need event-derived state.
impl Session {
    /// Peers currently known to the roster, with their states.
    pub fn roster(&self) -> impl Iterator<Item = (&PeerIdentity, PeerState)> {
        self.roster.iter().map(|(peer, state)| (peer, *state))
    }
}
