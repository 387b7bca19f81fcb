//! The consumer-facing mediator context.

use std::sync::Arc;

use nearplay_native::{
    EventKind, Invitation, MediatorError, NativeEvent, NativeHandle, PeerIdentity, SharedMediator,
};
use nearplay_types::PeerState;
use tracing::{debug, error};

use crate::advertiser::{Advertiser, AdvertiserAssistant};
use crate::bridge::EventBridge;
use crate::config::MediatorConfig;
use crate::discovery::{Discovery, PeerBrowser};
use crate::event::{DispatchError, MediatorEvent};
use crate::session::Session;

/// Owner of one native mediator service and everything built on it: the
/// event bridge, the session, and the discovery/advertising controllers.
///
/// All methods except the bridge callbacks run on the consumer thread. Call
/// [`poll_events`](Self::poll_events) once per tick to receive deferred
/// native events in the order they were posted.
pub struct LocalMediator {
    service: SharedMediator,
    bridge: Arc<EventBridge>,
    session: Session,
    discovery: Discovery,
    browser: PeerBrowser,
    advertiser: Advertiser,
    assistant: AdvertiserAssistant,
    torn_down: bool,
}

impl LocalMediator {
    /// Build a mediator over `service` and register for its events.
    #[must_use]
    pub fn new(service: SharedMediator) -> Self {
        let bridge = Arc::new(EventBridge::new());
        service.set_event_sink(Some(bridge.clone()));

        Self {
            session: Session::new(Arc::clone(&service)),
            discovery: Discovery::new(Arc::clone(&service)),
            browser: PeerBrowser::new(Arc::clone(&service), Arc::clone(&bridge)),
            advertiser: Advertiser::new(Arc::clone(&service)),
            assistant: AdvertiserAssistant::new(Arc::clone(&service)),
            bridge,
            service,
            torn_down: false,
        }
    }

    /// Build a mediator and apply `config`.
    ///
    /// Config values pass through the same sanitization as the programmatic
    /// setters.
    pub fn with_config(
        service: SharedMediator,
        config: &MediatorConfig,
    ) -> Result<Self, MediatorError> {
        let mut mediator = Self::new(service);

        if let Some(service_type) = &config.session.service_type {
            mediator.session.set_service_type(service_type)?;
        }
        if let Some(peer_name) = &config.session.peer_name {
            mediator.session.set_local_peer_name(peer_name)?;
        }
        mediator.session.set_server_port(config.session.server_port)?;
        mediator.service.set_log_forwarding(config.log.forward_native);
        mediator.service.set_verbose_log(config.log.verbose);

        Ok(mediator)
    }

    /// The session controller.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// The programmatic discovery controller.
    pub fn discovery_mut(&mut self) -> &mut Discovery {
        &mut self.discovery
    }

    /// The native peer-browser UI controller.
    pub fn browser_mut(&mut self) -> &mut PeerBrowser {
        &mut self.browser
    }

    /// The programmatic advertiser.
    #[must_use]
    pub fn advertiser(&self) -> &Advertiser {
        &self.advertiser
    }

    pub fn advertiser_mut(&mut self) -> &mut Advertiser {
        &mut self.advertiser
    }

    /// The UI-assisted advertiser.
    #[must_use]
    pub fn assistant(&self) -> &AdvertiserAssistant {
        &self.assistant
    }

    pub fn assistant_mut(&mut self) -> &mut AdvertiserAssistant {
        &mut self.assistant
    }

    /// Forward native log lines into `tracing`.
    pub fn set_log_forwarding(&self, enabled: bool) {
        self.service.set_log_forwarding(enabled);
    }

    /// Verbose native logging.
    pub fn set_verbose_logging(&self, enabled: bool) {
        self.service.set_verbose_log(enabled);
    }

    /// Drain and dispatch all deferred native events buffered since the last
    /// poll, in the order they were posted.
    ///
    /// An event that fails to dispatch is logged and skipped; the remaining
    /// events of the batch still go through, and the faulty event's payload
    /// is still freed.
    pub fn poll_events(&mut self) -> Vec<MediatorEvent> {
        let batch = self.bridge.drain();
        let mut events = Vec::with_capacity(batch.len());
        for native in batch {
            let kind = native.kind;
            match self.dispatch(native) {
                Ok(event) => events.push(event),
                Err(err) => error!(kind, %err, "failed to dispatch native event"),
            }
        }
        events
    }

    fn dispatch(&mut self, native: NativeEvent) -> Result<MediatorEvent, DispatchError> {
        let kind =
            EventKind::from_wire(native.kind).ok_or(DispatchError::UnknownKind(native.kind))?;
        let payload = || native.payload.raw().ok_or(DispatchError::MissingPayload(kind));

        Ok(match kind {
            EventKind::SessionStarted => {
                self.session.on_started();
                MediatorEvent::SessionStarted
            }
            EventKind::SessionDisconnected => {
                self.session.on_stopped();
                MediatorEvent::SessionStopped
            }
            EventKind::SessionPeerStateChanged => {
                let (peer_raw, wire_state) = self.service.read_peer_state_changed(payload()?)?;
                let peer = PeerIdentity::adopt(&self.service, peer_raw);
                let state = PeerState::from_wire(wire_state)
                    .ok_or(DispatchError::UnknownPeerState(wire_state))?;
                self.session.on_peer_state_changed(peer.clone(), state);
                MediatorEvent::PeerStateChanged { peer, state }
            }
            EventKind::AdvertiserInvitationReceived => {
                let (peer_raw, handler_raw) = self.service.read_invitation_received(payload()?)?;
                let peer = PeerIdentity::adopt(&self.service, peer_raw);
                let invitation = Invitation::new(
                    NativeHandle::adopt(Arc::clone(&self.service), handler_raw),
                    peer.name(),
                );
                MediatorEvent::InvitationReceived { peer, invitation }
            }
            EventKind::AdvertiserStartFailed => MediatorEvent::AdvertisingStartFailed {
                message: self.service.read_error_string(payload()?)?,
            },
            EventKind::AssistantInvitationDismissed => MediatorEvent::InvitationDismissed,
            EventKind::AssistantInvitationPresenting => MediatorEvent::InvitationPresenting,
            EventKind::BrowserPeerFound => {
                let (peer_raw, info) = self.service.read_peer_found(payload()?)?;
                let peer = PeerIdentity::adopt(&self.service, peer_raw);
                MediatorEvent::PeerFound { peer, info }
            }
            EventKind::BrowserPeerLost => {
                let peer_raw = self.service.read_peer_lost(payload()?)?;
                MediatorEvent::PeerLost {
                    peer: PeerIdentity::adopt(&self.service, peer_raw),
                }
            }
            EventKind::BrowserStartFailed => MediatorEvent::DiscoveryStartFailed {
                message: self.service.read_error_string(payload()?)?,
            },
            EventKind::BrowserCancelled => MediatorEvent::BrowserCancelled,
            EventKind::BrowserFinished => MediatorEvent::BrowserFinished,
        })
    }

    /// Stop everything this mediator started and deregister from the native
    /// layer. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.assistant.stop_advertising();
        self.advertiser.stop_advertising();
        self.browser.close_browser();
        self.discovery.stop_discovery();
        self.session.stop_session();
        self.service.set_event_sink(None);

        // Free the payloads of anything still buffered.
        let leftover = self.bridge.drain();
        if !leftover.is_empty() {
            debug!(count = leftover.len(), "dropping undispatched events at teardown");
        }
        drop(leftover);
    }
}

impl Drop for LocalMediator {
    fn drop(&mut self) {
        self.teardown();
    }
}
