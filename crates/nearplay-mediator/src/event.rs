//! Consumer-visible events.

use nearplay_native::{EventKind, Invitation, MarshalError, PeerIdentity};
use nearplay_types::{DiscoveryInfo, PeerState};
use thiserror::Error;

/// An event surfaced by [`crate::LocalMediator::poll_events`].
///
/// Delivered on the consumer thread, in the order the native layer posted
/// them (push order). The synchronous presentation filter is not an event —
/// see [`crate::PeerBrowser::set_presentation_filter`].
#[derive(Debug)]
pub enum MediatorEvent {
    /// The session has been started.
    SessionStarted,
    /// The session has been stopped or disconnected.
    SessionStopped,
    /// The connection state of a peer changed.
    PeerStateChanged { peer: PeerIdentity, state: PeerState },
    /// Peer discovery found a new nearby peer.
    PeerFound {
        peer: PeerIdentity,
        info: DiscoveryInfo,
    },
    /// A previously found peer is no longer nearby.
    PeerLost { peer: PeerIdentity },
    /// Starting peer discovery failed asynchronously.
    DiscoveryStartFailed { message: String },
    /// An invitation to join the session arrived; answer via the one-shot
    /// [`Invitation`].
    InvitationReceived {
        peer: PeerIdentity,
        invitation: Invitation,
    },
    /// Starting the advertiser failed asynchronously.
    AdvertisingStartFailed { message: String },
    /// The native incoming-invitation UI is about to be shown.
    InvitationPresenting,
    /// The native incoming-invitation UI was dismissed or accepted.
    InvitationDismissed,
    /// The native peer browser UI was cancelled.
    BrowserCancelled,
    /// The native peer browser UI finished.
    BrowserFinished,
}

/// Failure to dispatch one drained event.
///
/// Signals a native/managed protocol mismatch. Dispatch of the remaining
/// events in the same drain pass continues; the faulty event's payload is
/// still freed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unrecognized native event kind {0}")]
    UnknownKind(u32),

    #[error("event {0:?} arrived without a payload")]
    MissingPayload(EventKind),

    #[error("unknown peer state {0} on the wire")]
    UnknownPeerState(u32),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}
