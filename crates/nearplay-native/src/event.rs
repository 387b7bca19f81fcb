//! Raw native events and the sink contract for receiving them.

use std::sync::Arc;

use nearplay_types::DiscoveryInfo;

use crate::handle::RawRef;
use crate::peer::PeerIdentity;
use crate::service::SharedMediator;

/// Wire values of the native event kinds.
pub mod wire {
    pub const SESSION_STARTED: u32 = 0;
    pub const SESSION_DISCONNECTED: u32 = 1;
    pub const SESSION_PEER_STATE_CHANGED: u32 = 2;
    pub const ADVERTISER_INVITATION_RECEIVED: u32 = 3;
    pub const ADVERTISER_START_FAILED: u32 = 4;
    pub const ASSISTANT_INVITATION_DISMISSED: u32 = 5;
    pub const ASSISTANT_INVITATION_PRESENTING: u32 = 6;
    pub const BROWSER_PEER_FOUND: u32 = 7;
    pub const BROWSER_PEER_LOST: u32 = 8;
    pub const BROWSER_START_FAILED: u32 = 9;
    pub const BROWSER_CANCELLED: u32 = 10;
    pub const BROWSER_FINISHED: u32 = 11;
}

/// The closed set of deferred native event kinds.
///
/// Decoded from the wire value at drain time; a wire value outside this set
/// is a native/managed protocol mismatch and fails dispatch of that one
/// event. The synchronous bypass callbacks (peer presenting, log lines) are
/// not queued and therefore have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SessionStarted,
    SessionDisconnected,
    SessionPeerStateChanged,
    AdvertiserInvitationReceived,
    AdvertiserStartFailed,
    AssistantInvitationDismissed,
    AssistantInvitationPresenting,
    BrowserPeerFound,
    BrowserPeerLost,
    BrowserStartFailed,
    BrowserCancelled,
    BrowserFinished,
}

impl EventKind {
    /// Decode a wire value, `None` for unknown values.
    #[must_use]
    pub fn from_wire(value: u32) -> Option<Self> {
        Some(match value {
            wire::SESSION_STARTED => Self::SessionStarted,
            wire::SESSION_DISCONNECTED => Self::SessionDisconnected,
            wire::SESSION_PEER_STATE_CHANGED => Self::SessionPeerStateChanged,
            wire::ADVERTISER_INVITATION_RECEIVED => Self::AdvertiserInvitationReceived,
            wire::ADVERTISER_START_FAILED => Self::AdvertiserStartFailed,
            wire::ASSISTANT_INVITATION_DISMISSED => Self::AssistantInvitationDismissed,
            wire::ASSISTANT_INVITATION_PRESENTING => Self::AssistantInvitationPresenting,
            wire::BROWSER_PEER_FOUND => Self::BrowserPeerFound,
            wire::BROWSER_PEER_LOST => Self::BrowserPeerLost,
            wire::BROWSER_START_FAILED => Self::BrowserStartFailed,
            wire::BROWSER_CANCELLED => Self::BrowserCancelled,
            wire::BROWSER_FINISHED => Self::BrowserFinished,
            _ => return None,
        })
    }

    /// The wire value of this kind.
    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::SessionStarted => wire::SESSION_STARTED,
            Self::SessionDisconnected => wire::SESSION_DISCONNECTED,
            Self::SessionPeerStateChanged => wire::SESSION_PEER_STATE_CHANGED,
            Self::AdvertiserInvitationReceived => wire::ADVERTISER_INVITATION_RECEIVED,
            Self::AdvertiserStartFailed => wire::ADVERTISER_START_FAILED,
            Self::AssistantInvitationDismissed => wire::ASSISTANT_INVITATION_DISMISSED,
            Self::AssistantInvitationPresenting => wire::ASSISTANT_INVITATION_PRESENTING,
            Self::BrowserPeerFound => wire::BROWSER_PEER_FOUND,
            Self::BrowserPeerLost => wire::BROWSER_PEER_LOST,
            Self::BrowserStartFailed => wire::BROWSER_START_FAILED,
            Self::BrowserCancelled => wire::BROWSER_CANCELLED,
            Self::BrowserFinished => wire::BROWSER_FINISHED,
        }
    }
}

/// Owner of a deferred event's native payload.
///
/// The payload stays native-owned until freed; the guard frees it exactly
/// once when dropped, whether or not the event was dispatched successfully.
pub struct PayloadGuard {
    raw: Option<RawRef>,
    kind: u32,
    service: SharedMediator,
}

impl PayloadGuard {
    /// Wrap a native payload reference for event kind `kind`.
    /// `raw` is `None` for payload-less events.
    #[must_use]
    pub fn new(service: SharedMediator, kind: u32, raw: Option<RawRef>) -> Self {
        Self { raw, kind, service }
    }

    /// The payload reference, if this event carries one.
    #[must_use]
    pub fn raw(&self) -> Option<RawRef> {
        self.raw
    }
}

impl Drop for PayloadGuard {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.service.free_event_payload(self.kind, raw);
        }
    }
}

impl std::fmt::Debug for PayloadGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadGuard")
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A deferred native event as delivered by the callback thread.
///
/// Carries the undecoded wire kind; decoding happens on the consumer thread
/// at drain time so that a protocol mismatch is reported there, not on the
/// native thread.
#[derive(Debug)]
pub struct NativeEvent {
    pub kind: u32,
    pub payload: PayloadGuard,
}

impl NativeEvent {
    #[must_use]
    pub fn new(service: &SharedMediator, kind: u32, payload: Option<RawRef>) -> Self {
        Self {
            kind,
            payload: PayloadGuard::new(Arc::clone(service), kind, payload),
        }
    }
}

/// Severity of a native log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeLogLevel {
    Info,
    Warning,
    Error,
}

/// Receiver of native callbacks.
///
/// All methods may be invoked from any thread, including concurrently with
/// each other, and must not block beyond a short critical section.
pub trait EventSink: Send + Sync {
    /// A deferred event. The sink takes ownership of the payload and must
    /// arrange for it to be freed exactly once.
    fn on_event(&self, event: NativeEvent);

    /// The synchronous presentation filter: decide whether `peer` should be
    /// shown in the native browser UI. The native layer blocks on the
    /// return value, so this must answer inline on the calling thread and
    /// must not touch consumer-thread-only state.
    fn on_nearby_peer_presenting(&self, peer: PeerIdentity, info: DiscoveryInfo) -> bool;

    /// A raw native log line; may arrive at any time on any thread.
    fn on_log(&self, level: NativeLogLevel, line: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockMediator;

    #[test]
    fn kind_wire_roundtrip() {
        for value in 0..12 {
            let kind = EventKind::from_wire(value).expect("known wire value");
            assert_eq!(kind.to_wire(), value);
        }
        assert_eq!(EventKind::from_wire(12), None);
        assert_eq!(EventKind::from_wire(u32::MAX), None);
    }

    #[test]
    fn payload_guard_frees_on_drop() {
        let mock = MockMediator::new();
        let payload = mock.make_error_string_payload("boom");

        let guard = PayloadGuard::new(
            mock.shared(),
            wire::ADVERTISER_START_FAILED,
            Some(payload),
        );
        assert_eq!(mock.freed_payload_count(), 0);
        drop(guard);
        assert_eq!(mock.freed_payload_count(), 1);
        assert!(!mock.is_live(payload));
    }

    #[test]
    fn payload_less_guard_frees_nothing() {
        let mock = MockMediator::new();
        let guard = PayloadGuard::new(mock.shared(), wire::SESSION_STARTED, None);
        drop(guard);
        assert_eq!(mock.freed_payload_count(), 0);
    }
}
