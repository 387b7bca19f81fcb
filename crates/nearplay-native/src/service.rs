//! The native peer-networking service contract.

use std::sync::Arc;
use std::time::Duration;

use nearplay_types::DiscoveryInfo;

use crate::error::MarshalError;
use crate::event::EventSink;
use crate::handle::RawRef;

/// Shared reference to a native backend.
pub type SharedMediator = Arc<dyn NativeMediator>;

/// Result of a fallible native call.
///
/// On failure the native layer hands back an owned error object (one retain
/// count transferred to the caller). The caller must release it exactly once,
/// normally by passing it through [`crate::translate`], [`crate::escalate`]
/// or [`crate::swallow`].
pub type NativeResult<T> = Result<T, RawRef>;

/// The opaque native peer-networking service.
///
/// Implementations must be callable from any thread. Event callbacks are
/// delivered to the registered [`EventSink`] on whatever thread the native
/// side happens to be running, possibly concurrently; the sink — not the
/// backend — is responsible for deferring them to the consumer thread.
///
/// Reference ownership conventions:
///
/// - `Err(RawRef)` results transfer one retain count of an error object.
/// - Peer references produced by `connected_peers` and by the `read_*`
///   marshalling calls are retained for the caller.
/// - Event payloads are owned by the event until freed via
///   `free_event_payload`, which must be called exactly once per delivered
///   deferred event.
pub trait NativeMediator: Send + Sync {
    // --- object table -----------------------------------------------------

    /// Increment the retain count of a native object.
    fn object_retain(&self, raw: RawRef);

    /// Decrement the retain count of a native object, destroying it at zero.
    fn object_release(&self, raw: RawRef);

    /// Native identity hash of an object.
    fn object_hash(&self, raw: RawRef) -> u64;

    /// Native identity equality of two objects.
    fn object_eq(&self, a: RawRef, b: RawRef) -> bool;

    // --- error objects ----------------------------------------------------

    /// Error code of a native error object.
    fn error_code(&self, error: RawRef) -> u32;

    /// Human-readable description of a native error object, if any.
    fn error_description(&self, error: RawRef) -> Option<String>;

    // --- peers ------------------------------------------------------------

    /// Display name of a peer object.
    fn peer_display_name(&self, peer: RawRef) -> String;

    // --- session ----------------------------------------------------------

    fn set_service_type(&self, service_type: &str) -> NativeResult<()>;

    fn set_display_name(&self, name: &str) -> NativeResult<()>;

    fn set_server_port(&self, port: u16) -> NativeResult<()>;

    fn start_session(&self) -> NativeResult<()>;

    fn disconnect_from_session(&self) -> NativeResult<()>;

    fn is_session_active(&self) -> bool;

    /// Peers currently connected to the session, as freshly retained
    /// references. `max` caps the number returned; `None` returns all.
    fn connected_peers(&self, max: Option<usize>) -> NativeResult<Vec<RawRef>>;

    fn connected_peer_count(&self) -> NativeResult<usize>;

    // --- programmatic peer discovery --------------------------------------

    fn start_peer_discovery(&self) -> NativeResult<()>;

    fn stop_peer_discovery(&self) -> NativeResult<()>;

    fn invite_peer(&self, peer: RawRef, timeout: Duration) -> NativeResult<()>;

    // --- peer browser UI --------------------------------------------------

    fn open_peer_browser(&self, min_peers: u32, max_peers: u32) -> NativeResult<()>;

    fn close_peer_browser(&self) -> NativeResult<()>;

    // --- programmatic advertiser ------------------------------------------

    fn start_advertiser(&self, discovery_info: Option<&DiscoveryInfo>) -> NativeResult<()>;

    fn stop_advertiser(&self) -> NativeResult<()>;

    fn is_advertising(&self) -> bool;

    /// Invoke the accept/decline continuation of a received invitation.
    ///
    /// The native side is undefined on double invocation; [`crate::Invitation`]
    /// enforces the at-most-once contract.
    fn invoke_invitation_handler(&self, handler: RawRef, accept: bool);

    // --- advertiser assistant UI ------------------------------------------

    fn start_advertiser_assistant(&self, discovery_info: Option<&DiscoveryInfo>)
        -> NativeResult<()>;

    fn stop_advertiser_assistant(&self) -> NativeResult<()>;

    fn is_assistant_advertising(&self) -> bool;

    // --- events -----------------------------------------------------------

    /// Register (or with `None`, deregister) the event sink.
    ///
    /// Callbacks may still arrive during teardown; a deregistered backend
    /// must drop them.
    fn set_event_sink(&self, sink: Option<Arc<dyn EventSink>>);

    /// Forward native log lines to the sink.
    fn set_log_forwarding(&self, enabled: bool);

    /// Verbose native logging.
    fn set_verbose_log(&self, enabled: bool);

    // --- payload marshalling (drain thread) -------------------------------

    /// Read a peer-state-changed payload: (retained peer, wire state).
    fn read_peer_state_changed(&self, payload: RawRef) -> Result<(RawRef, u32), MarshalError>;

    /// Read a peer-found payload: (retained peer, discovery info).
    fn read_peer_found(&self, payload: RawRef) -> Result<(RawRef, DiscoveryInfo), MarshalError>;

    /// Read a peer-lost payload: retained peer.
    fn read_peer_lost(&self, payload: RawRef) -> Result<RawRef, MarshalError>;

    /// Read an invitation-received payload: (retained peer, retained
    /// invitation continuation).
    fn read_invitation_received(&self, payload: RawRef) -> Result<(RawRef, RawRef), MarshalError>;

    /// Read an error-string payload.
    fn read_error_string(&self, payload: RawRef) -> Result<String, MarshalError>;

    /// Free a deferred event payload. Must be called exactly once per
    /// delivered deferred event, dispatched or not.
    fn free_event_payload(&self, kind: u32, payload: RawRef);
}
