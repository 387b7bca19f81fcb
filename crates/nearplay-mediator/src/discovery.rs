//! Programmatic peer discovery and the native peer-browser UI.

use std::sync::Arc;
use std::time::Duration;

use nearplay_native::{escalate, swallow, MediatorError, PeerIdentity, SharedMediator};
use tracing::info;

use crate::bridge::{EventBridge, PresentationFilter};

/// Default timeout for an outgoing invitation.
pub const DEFAULT_INVITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Smallest session size the peer browser accepts.
pub const MIN_BROWSER_PEERS: u32 = 2;
/// Largest session size the peer browser accepts.
pub const MAX_BROWSER_PEERS: u32 = 8;

/// Headless peer discovery: finds nearby peers advertising the configured
/// service and invites them directly, without any native UI.
///
/// Discovery results arrive as [`crate::MediatorEvent::PeerFound`] and
/// [`crate::MediatorEvent::PeerLost`] on the next poll.
pub struct Discovery {
    service: SharedMediator,
}

impl Discovery {
    pub(crate) fn new(service: SharedMediator) -> Self {
        Self { service }
    }

    /// Start browsing for nearby peers.
    pub fn start_discovery(&mut self) -> Result<(), MediatorError> {
        escalate(&self.service, self.service.start_peer_discovery())?;
        info!("peer discovery started");
        Ok(())
    }

    /// Stop browsing.
    ///
    /// Best-effort: returns `false` instead of failing when discovery is not
    /// running.
    pub fn stop_discovery(&mut self) -> bool {
        swallow(&self.service, self.service.stop_peer_discovery()).is_some()
    }

    /// Invite a discovered peer to the session with the default timeout.
    pub fn invite_peer(&mut self, peer: &PeerIdentity) -> Result<(), MediatorError> {
        self.invite_peer_with_timeout(peer, DEFAULT_INVITE_TIMEOUT)
    }

    /// Invite a discovered peer, giving them `timeout` to answer.
    pub fn invite_peer_with_timeout(
        &mut self,
        peer: &PeerIdentity,
        timeout: Duration,
    ) -> Result<(), MediatorError> {
        if timeout.is_zero() {
            return Err(MediatorError::InvalidInput(
                "invitation timeout must be positive".into(),
            ));
        }
        escalate(&self.service, self.service.invite_peer(peer.raw(), timeout))?;
        info!(peer = %peer, timeout_secs = timeout.as_secs(), "peer invited");
        Ok(())
    }
}

/// The native peer-browser UI: a platform-provided picker that discovers
/// nearby peers and lets the user invite them.
///
/// Browser outcomes arrive as [`crate::MediatorEvent::BrowserCancelled`] and
/// [`crate::MediatorEvent::BrowserFinished`]; a failed start arrives as
/// [`crate::MediatorEvent::DiscoveryStartFailed`].
pub struct PeerBrowser {
    service: SharedMediator,
    bridge: Arc<EventBridge>,
}

impl PeerBrowser {
    pub(crate) fn new(service: SharedMediator, bridge: Arc<EventBridge>) -> Self {
        Self { service, bridge }
    }

    /// Show the browser UI, configured for a session of `min_peers` to
    /// `max_peers` participants (both inclusive, within
    /// [`MIN_BROWSER_PEERS`]..=[`MAX_BROWSER_PEERS`]).
    pub fn open_browser(&mut self, min_peers: u32, max_peers: u32) -> Result<(), MediatorError> {
        if min_peers < MIN_BROWSER_PEERS
            || max_peers > MAX_BROWSER_PEERS
            || min_peers > max_peers
        {
            return Err(MediatorError::InvalidInput(format!(
                "browser bounds {min_peers}..={max_peers} outside \
                 {MIN_BROWSER_PEERS}..={MAX_BROWSER_PEERS}"
            )));
        }
        escalate(&self.service, self.service.open_peer_browser(min_peers, max_peers))?;
        info!(min_peers, max_peers, "peer browser opened");
        Ok(())
    }

    /// Dismiss the browser UI.
    ///
    /// Best-effort: returns `false` instead of failing when no browser is
    /// open.
    pub fn close_browser(&mut self) -> bool {
        swallow(&self.service, self.service.close_peer_browser()).is_some()
    }

    /// Decide per nearby peer whether the browser should list it. The filter
    /// runs synchronously on a native thread while the browser UI waits for
    /// its answer, so it must be fast and must not touch consumer-thread
    /// state. `None` restores the default of listing every peer.
    pub fn set_presentation_filter(&mut self, filter: Option<PresentationFilter>) {
        self.bridge.set_presentation_filter(filter);
    }
}
