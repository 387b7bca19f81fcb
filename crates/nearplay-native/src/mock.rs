//! In-process fake of the native peer-networking service.
//!
//! Backs the workspace's tests: keeps a refcounted object table exactly like
//! the real native side, enforces the same preconditions (no double start,
//! no stop of an inactive session), and lets tests emit events onto the
//! registered sink from any thread. Panics on ownership violations — a
//! double release or a double payload free is a defect the tests must catch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use nearplay_types::DiscoveryInfo;

use crate::error::MarshalError;
use crate::event::{wire, EventSink, NativeEvent, NativeLogLevel};
use crate::handle::RawRef;
use crate::peer::PeerIdentity;
use crate::service::{NativeMediator, NativeResult, SharedMediator};

/// What a native object slot holds.
#[derive(Debug)]
enum MockObject {
    Peer { name: String },
    Error { code: u32, message: Option<String> },
    InvitationHandler,
    Payload(PayloadData),
}

/// Typed contents of an event payload slot.
#[derive(Debug)]
enum PayloadData {
    PeerStateChanged { peer: RawRef, state: u32 },
    PeerFound { peer: RawRef, info: DiscoveryInfo },
    PeerLost { peer: RawRef },
    InvitationReceived { peer: RawRef, handler: RawRef },
    ErrorString(String),
}

#[derive(Debug)]
struct Slot {
    refcount: u32,
    hash: u64,
    object: MockObject,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    objects: HashMap<u64, Slot>,
    freed_payloads: usize,

    service_type: Option<String>,
    display_name: Option<String>,
    server_port: Option<u16>,
    session_active: bool,
    discovering: bool,
    browser_open: bool,
    browser_bounds: Option<(u32, u32)>,
    advertising: bool,
    assistant_advertising: bool,
    advertised_info: Option<DiscoveryInfo>,

    connected: Vec<RawRef>,
    invited: Vec<(RawRef, Duration)>,
    invitation_responses: Vec<(RawRef, bool)>,

    log_forwarding: bool,
    verbose_log: bool,
    fail_next: Option<(u32, String)>,
}

/// Mock native backend.
pub struct MockMediator {
    weak: Weak<Self>,
    inner: Mutex<Inner>,
    // Separate lock: the sink is invoked while no Inner lock is held.
    sink: Mutex<Option<Arc<dyn EventSink>>>,
}

impl MockMediator {
    /// Create a new mock backend.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            inner: Mutex::new(Inner::default()),
            sink: Mutex::new(None),
        })
    }

    /// This mock as a [`SharedMediator`].
    #[must_use]
    pub fn shared(&self) -> SharedMediator {
        self.arc()
    }

    fn arc(&self) -> Arc<Self> {
        self.weak.upgrade().expect("mock still alive")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn current_sink(&self) -> Option<Arc<dyn EventSink>> {
        self.sink.lock().unwrap().clone()
    }

    fn alloc(inner: &mut Inner, object: MockObject) -> RawRef {
        inner.next_id += 1;
        let id = inner.next_id;
        inner.objects.insert(
            id,
            Slot {
                refcount: 1,
                hash: id.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1,
                object,
            },
        );
        RawRef::from_bits(id)
    }

    fn retain(inner: &mut Inner, raw: RawRef) {
        inner
            .objects
            .get_mut(&raw.bits())
            .unwrap_or_else(|| panic!("retain of dead object {raw}"))
            .refcount += 1;
    }

    fn release(inner: &mut Inner, raw: RawRef) {
        let slot = inner
            .objects
            .get_mut(&raw.bits())
            .unwrap_or_else(|| panic!("release of dead object {raw} (double release?)"));
        slot.refcount -= 1;
        if slot.refcount == 0 {
            inner.objects.remove(&raw.bits());
        }
    }

    fn injected_failure(inner: &mut Inner) -> Option<RawRef> {
        let (code, message) = inner.fail_next.take()?;
        Some(Self::alloc(
            inner,
            MockObject::Error {
                code,
                message: Some(message),
            },
        ))
    }

    fn fail(inner: &mut Inner, code: u32, message: &str) -> RawRef {
        Self::alloc(
            inner,
            MockObject::Error {
                code,
                message: Some(message.to_string()),
            },
        )
    }

    /// Allocate a payload slot and deliver it to the sink, if any.
    fn deliver(&self, kind: u32, data: Option<PayloadData>) {
        let Some(sink) = self.current_sink() else {
            return;
        };
        let payload = data.map(|data| {
            let mut inner = self.lock();
            // The payload slot holds its own reference on any objects
            // it carries until freed.
            match &data {
                PayloadData::PeerStateChanged { peer, .. }
                | PayloadData::PeerFound { peer, .. }
                | PayloadData::PeerLost { peer } => Self::retain(&mut inner, *peer),
                PayloadData::InvitationReceived { peer, .. } => Self::retain(&mut inner, *peer),
                PayloadData::ErrorString(_) => {}
            }
            Self::alloc(&mut inner, MockObject::Payload(data))
        });
        sink.on_event(NativeEvent::new(&self.shared(), kind, payload));
    }

    // --- test scripting ---------------------------------------------------

    /// Register a peer in the native object table. The table keeps one
    /// reference of its own, so the peer stays alive for the test.
    pub fn register_peer(&self, name: &str) -> RawRef {
        Self::alloc(
            &mut self.lock(),
            MockObject::Peer {
                name: name.to_string(),
            },
        )
    }

    /// Create an error object owned by the caller.
    pub fn make_error(&self, code: u32, message: Option<&str>) -> RawRef {
        Self::alloc(
            &mut self.lock(),
            MockObject::Error {
                code,
                message: message.map(String::from),
            },
        )
    }

    /// Create an error-string payload owned by the caller; freed via
    /// `free_event_payload`.
    pub fn make_error_string_payload(&self, message: &str) -> RawRef {
        Self::alloc(
            &mut self.lock(),
            MockObject::Payload(PayloadData::ErrorString(message.to_string())),
        )
    }

    /// Create an invitation continuation owned by the caller.
    pub fn make_invitation_handler(&self) -> RawRef {
        Self::alloc(&mut self.lock(), MockObject::InvitationHandler)
    }

    /// Mark a peer as connected or disconnected in the native session
    /// roster, without emitting an event.
    pub fn mark_connected(&self, peer: RawRef, connected: bool) {
        let mut inner = self.lock();
        inner.connected.retain(|p| *p != peer);
        if connected {
            inner.connected.push(peer);
        }
    }

    pub fn emit_session_started(&self) {
        self.deliver(wire::SESSION_STARTED, None);
    }

    pub fn emit_session_disconnected(&self) {
        self.lock().session_active = false;
        self.deliver(wire::SESSION_DISCONNECTED, None);
    }

    pub fn emit_peer_state_changed(&self, peer: RawRef, state: u32) {
        self.mark_connected(peer, state == 2);
        self.deliver(
            wire::SESSION_PEER_STATE_CHANGED,
            Some(PayloadData::PeerStateChanged { peer, state }),
        );
    }

    pub fn emit_peer_found(&self, peer: RawRef, info: DiscoveryInfo) {
        self.deliver(
            wire::BROWSER_PEER_FOUND,
            Some(PayloadData::PeerFound { peer, info }),
        );
    }

    pub fn emit_peer_lost(&self, peer: RawRef) {
        self.deliver(wire::BROWSER_PEER_LOST, Some(PayloadData::PeerLost { peer }));
    }

    /// Emit an invitation from `peer`, returning the continuation reference
    /// for later inspection via [`invitation_responses`](Self::invitation_responses).
    pub fn emit_invitation_received(&self, peer: RawRef) -> RawRef {
        let handler = self.make_invitation_handler();
        self.deliver(
            wire::ADVERTISER_INVITATION_RECEIVED,
            Some(PayloadData::InvitationReceived { peer, handler }),
        );
        handler
    }

    pub fn emit_advertiser_start_failed(&self, message: &str) {
        self.deliver(
            wire::ADVERTISER_START_FAILED,
            Some(PayloadData::ErrorString(message.to_string())),
        );
    }

    pub fn emit_browser_start_failed(&self, message: &str) {
        self.deliver(
            wire::BROWSER_START_FAILED,
            Some(PayloadData::ErrorString(message.to_string())),
        );
    }

    pub fn emit_browser_cancelled(&self) {
        self.deliver(wire::BROWSER_CANCELLED, None);
    }

    pub fn emit_browser_finished(&self) {
        self.deliver(wire::BROWSER_FINISHED, None);
    }

    pub fn emit_assistant_invitation_presenting(&self) {
        self.deliver(wire::ASSISTANT_INVITATION_PRESENTING, None);
    }

    pub fn emit_assistant_invitation_dismissed(&self) {
        self.deliver(wire::ASSISTANT_INVITATION_DISMISSED, None);
    }

    /// Emit an event with a wire kind outside the known set, carrying a
    /// payload that must still be freed.
    pub fn emit_unknown(&self, kind: u32) {
        self.deliver(kind, Some(PayloadData::ErrorString("unknown".to_string())));
    }

    /// Deliver a native log line, if forwarding is enabled.
    pub fn emit_log(&self, level: NativeLogLevel, line: &str) {
        if !self.lock().log_forwarding {
            return;
        }
        if let Some(sink) = self.current_sink() {
            sink.on_log(level, line);
        }
    }

    /// Ask the sink's synchronous presentation filter about `peer`.
    /// Defaults to presenting when no sink is registered.
    pub fn present_nearby_peer(&self, peer: RawRef, info: DiscoveryInfo) -> bool {
        let Some(sink) = self.current_sink() else {
            return true;
        };
        Self::retain(&mut self.lock(), peer);
        let identity = PeerIdentity::adopt(&self.shared(), peer);
        sink.on_nearby_peer_presenting(identity, info)
    }

    /// Make the next fallible native call fail with `code`.
    pub fn fail_next(&self, code: u32, message: &str) {
        self.lock().fail_next = Some((code, message.to_string()));
    }

    // --- test introspection -----------------------------------------------

    pub fn refcount(&self, raw: RawRef) -> u32 {
        self.lock()
            .objects
            .get(&raw.bits())
            .map_or(0, |slot| slot.refcount)
    }

    pub fn is_live(&self, raw: RawRef) -> bool {
        self.lock().objects.contains_key(&raw.bits())
    }

    pub fn live_object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn freed_payload_count(&self) -> usize {
        self.lock().freed_payloads
    }

    pub fn service_type(&self) -> Option<String> {
        self.lock().service_type.clone()
    }

    pub fn display_name(&self) -> Option<String> {
        self.lock().display_name.clone()
    }

    pub fn server_port(&self) -> Option<u16> {
        self.lock().server_port
    }

    pub fn is_discovering(&self) -> bool {
        self.lock().discovering
    }

    pub fn is_browser_open(&self) -> bool {
        self.lock().browser_open
    }

    pub fn browser_bounds(&self) -> Option<(u32, u32)> {
        self.lock().browser_bounds
    }

    pub fn advertised_info(&self) -> Option<DiscoveryInfo> {
        self.lock().advertised_info.clone()
    }

    pub fn invited_peers(&self) -> Vec<(RawRef, Duration)> {
        self.lock().invited.clone()
    }

    pub fn invitation_responses(&self) -> Vec<(RawRef, bool)> {
        self.lock().invitation_responses.clone()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    pub fn is_log_forwarding(&self) -> bool {
        self.lock().log_forwarding
    }

    pub fn is_verbose_log(&self) -> bool {
        self.lock().verbose_log
    }
}

impl NativeMediator for MockMediator {
    fn object_retain(&self, raw: RawRef) {
        Self::retain(&mut self.lock(), raw);
    }

    fn object_release(&self, raw: RawRef) {
        Self::release(&mut self.lock(), raw);
    }

    fn object_hash(&self, raw: RawRef) -> u64 {
        self.lock()
            .objects
            .get(&raw.bits())
            .unwrap_or_else(|| panic!("hash of dead object {raw}"))
            .hash
    }

    fn object_eq(&self, a: RawRef, b: RawRef) -> bool {
        a == b
    }

    fn error_code(&self, error: RawRef) -> u32 {
        match &self.lock().objects[&error.bits()].object {
            MockObject::Error { code, .. } => *code,
            other => panic!("error_code of non-error object: {other:?}"),
        }
    }

    fn error_description(&self, error: RawRef) -> Option<String> {
        match &self.lock().objects[&error.bits()].object {
            MockObject::Error { message, .. } => message.clone(),
            other => panic!("error_description of non-error object: {other:?}"),
        }
    }

    fn peer_display_name(&self, peer: RawRef) -> String {
        match &self.lock().objects[&peer.bits()].object {
            MockObject::Peer { name } => name.clone(),
            other => panic!("peer_display_name of non-peer object: {other:?}"),
        }
    }

    fn set_service_type(&self, service_type: &str) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.session_active {
            return Err(Self::fail(&mut inner, crate::error::code::SESSION_ACTIVE, ""));
        }
        inner.service_type = Some(service_type.to_string());
        Ok(())
    }

    fn set_display_name(&self, name: &str) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.session_active {
            return Err(Self::fail(&mut inner, crate::error::code::SESSION_ACTIVE, ""));
        }
        inner.display_name = Some(name.to_string());
        Ok(())
    }

    fn set_server_port(&self, port: u16) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        inner.server_port = Some(port);
        Ok(())
    }

    fn start_session(&self) -> NativeResult<()> {
        {
            let mut inner = self.lock();
            if let Some(error) = Self::injected_failure(&mut inner) {
                return Err(error);
            }
            if inner.session_active {
                return Err(Self::fail(&mut inner, crate::error::code::SESSION_ACTIVE, ""));
            }
            if inner.service_type.is_none() || inner.display_name.is_none() {
                return Err(Self::fail(
                    &mut inner,
                    crate::error::code::INVALID_STATE,
                    "service type and display name must be configured before starting",
                ));
            }
            inner.session_active = true;
        }
        self.emit_session_started();
        Ok(())
    }

    fn disconnect_from_session(&self) -> NativeResult<()> {
        {
            let mut inner = self.lock();
            if let Some(error) = Self::injected_failure(&mut inner) {
                return Err(error);
            }
            if !inner.session_active {
                return Err(Self::fail(
                    &mut inner,
                    crate::error::code::SESSION_NOT_ACTIVE,
                    "",
                ));
            }
            inner.session_active = false;
            inner.connected.clear();
        }
        self.deliver(wire::SESSION_DISCONNECTED, None);
        Ok(())
    }

    fn is_session_active(&self) -> bool {
        self.lock().session_active
    }

    fn connected_peers(&self, max: Option<usize>) -> NativeResult<Vec<RawRef>> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        let count = max.unwrap_or(usize::MAX).min(inner.connected.len());
        let peers: Vec<RawRef> = inner.connected[..count].to_vec();
        for peer in &peers {
            Self::retain(&mut inner, *peer);
        }
        Ok(peers)
    }

    fn connected_peer_count(&self) -> NativeResult<usize> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        Ok(inner.connected.len())
    }

    fn start_peer_discovery(&self) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.discovering {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "peer discovery is already running",
            ));
        }
        inner.discovering = true;
        Ok(())
    }

    fn stop_peer_discovery(&self) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if !inner.discovering {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "peer discovery is not running",
            ));
        }
        inner.discovering = false;
        Ok(())
    }

    fn invite_peer(&self, peer: RawRef, timeout: Duration) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if !inner.session_active {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::SESSION_NOT_ACTIVE,
                "",
            ));
        }
        inner.invited.push((peer, timeout));
        Ok(())
    }

    fn open_peer_browser(&self, min_peers: u32, max_peers: u32) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.browser_open {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "peer browser is already open",
            ));
        }
        inner.browser_open = true;
        inner.browser_bounds = Some((min_peers, max_peers));
        Ok(())
    }

    fn close_peer_browser(&self) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if !inner.browser_open {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "peer browser is not open",
            ));
        }
        inner.browser_open = false;
        Ok(())
    }

    fn start_advertiser(&self, discovery_info: Option<&DiscoveryInfo>) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.advertising {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "advertiser is already running",
            ));
        }
        inner.advertising = true;
        inner.advertised_info = discovery_info.cloned();
        Ok(())
    }

    fn stop_advertiser(&self) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if !inner.advertising {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "advertiser is not running",
            ));
        }
        inner.advertising = false;
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.lock().advertising
    }

    fn invoke_invitation_handler(&self, handler: RawRef, accept: bool) {
        self.lock().invitation_responses.push((handler, accept));
    }

    fn start_advertiser_assistant(
        &self,
        discovery_info: Option<&DiscoveryInfo>,
    ) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if inner.assistant_advertising {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "advertiser assistant is already running",
            ));
        }
        inner.assistant_advertising = true;
        inner.advertised_info = discovery_info.cloned();
        Ok(())
    }

    fn stop_advertiser_assistant(&self) -> NativeResult<()> {
        let mut inner = self.lock();
        if let Some(error) = Self::injected_failure(&mut inner) {
            return Err(error);
        }
        if !inner.assistant_advertising {
            return Err(Self::fail(
                &mut inner,
                crate::error::code::INVALID_STATE,
                "advertiser assistant is not running",
            ));
        }
        inner.assistant_advertising = false;
        Ok(())
    }

    fn is_assistant_advertising(&self) -> bool {
        self.lock().assistant_advertising
    }

    fn set_event_sink(&self, sink: Option<Arc<dyn EventSink>>) {
        *self.sink.lock().unwrap() = sink;
    }

    fn set_log_forwarding(&self, enabled: bool) {
        self.lock().log_forwarding = enabled;
    }

    fn set_verbose_log(&self, enabled: bool) {
        self.lock().verbose_log = enabled;
    }

    fn read_peer_state_changed(&self, payload: RawRef) -> Result<(RawRef, u32), MarshalError> {
        let mut inner = self.lock();
        let (peer, state) = match &inner.objects[&payload.bits()].object {
            MockObject::Payload(PayloadData::PeerStateChanged { peer, state }) => (*peer, *state),
            other => {
                return Err(MarshalError::new(
                    "peer-state-changed",
                    format!("payload holds {other:?}"),
                ))
            }
        };
        Self::retain(&mut inner, peer);
        Ok((peer, state))
    }

    fn read_peer_found(&self, payload: RawRef) -> Result<(RawRef, DiscoveryInfo), MarshalError> {
        let mut inner = self.lock();
        let (peer, info) = match &inner.objects[&payload.bits()].object {
            MockObject::Payload(PayloadData::PeerFound { peer, info }) => (*peer, info.clone()),
            other => {
                return Err(MarshalError::new(
                    "peer-found",
                    format!("payload holds {other:?}"),
                ))
            }
        };
        Self::retain(&mut inner, peer);
        Ok((peer, info))
    }

    fn read_peer_lost(&self, payload: RawRef) -> Result<RawRef, MarshalError> {
        let mut inner = self.lock();
        let peer = match &inner.objects[&payload.bits()].object {
            MockObject::Payload(PayloadData::PeerLost { peer }) => *peer,
            other => {
                return Err(MarshalError::new(
                    "peer-lost",
                    format!("payload holds {other:?}"),
                ))
            }
        };
        Self::retain(&mut inner, peer);
        Ok(peer)
    }

    fn read_invitation_received(&self, payload: RawRef) -> Result<(RawRef, RawRef), MarshalError> {
        let mut inner = self.lock();
        let (peer, handler) = match &inner.objects[&payload.bits()].object {
            MockObject::Payload(PayloadData::InvitationReceived { peer, handler }) => {
                (*peer, *handler)
            }
            other => {
                return Err(MarshalError::new(
                    "invitation-received",
                    format!("payload holds {other:?}"),
                ))
            }
        };
        Self::retain(&mut inner, peer);
        Self::retain(&mut inner, handler);
        Ok((peer, handler))
    }

    fn read_error_string(&self, payload: RawRef) -> Result<String, MarshalError> {
        let inner = self.lock();
        match &inner.objects[&payload.bits()].object {
            MockObject::Payload(PayloadData::ErrorString(message)) => Ok(message.clone()),
            other => Err(MarshalError::new(
                "error-string",
                format!("payload holds {other:?}"),
            )),
        }
    }

    fn free_event_payload(&self, _kind: u32, payload: RawRef) {
        let mut inner = self.lock();
        let slot = inner
            .objects
            .remove(&payload.bits())
            .unwrap_or_else(|| panic!("free of dead payload {payload} (double free?)"));
        let MockObject::Payload(data) = slot.object else {
            panic!("free of non-payload object: {:?}", slot.object);
        };
        match data {
            PayloadData::PeerStateChanged { peer, .. }
            | PayloadData::PeerFound { peer, .. }
            | PayloadData::PeerLost { peer } => Self::release(&mut inner, peer),
            PayloadData::InvitationReceived { peer, handler } => {
                Self::release(&mut inner, peer);
                Self::release(&mut inner, handler);
            }
            PayloadData::ErrorString(_) => {}
        }
        inner.freed_payloads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;

    #[test]
    fn start_session_requires_configuration() {
        let mock = MockMediator::new();
        let error = mock.start_session().unwrap_err();
        assert_eq!(mock.error_code(error), code::INVALID_STATE);
        mock.object_release(error);
    }

    #[test]
    fn double_start_fails_session_active() {
        let mock = MockMediator::new();
        mock.set_service_type("demo").unwrap();
        mock.set_display_name("Alice").unwrap();
        mock.start_session().unwrap();

        let error = mock.start_session().unwrap_err();
        assert_eq!(mock.error_code(error), code::SESSION_ACTIVE);
        mock.object_release(error);
    }

    #[test]
    fn connected_peers_returns_retained_refs() {
        let mock = MockMediator::new();
        let peer = mock.register_peer("Alice");
        mock.mark_connected(peer, true);

        let peers = mock.connected_peers(None).unwrap();
        assert_eq!(peers, vec![peer]);
        assert_eq!(mock.refcount(peer), 2);
        mock.object_release(peer);
    }

    #[test]
    fn fail_next_injects_one_failure() {
        let mock = MockMediator::new();
        mock.fail_next(code::FATAL, "injected");

        let error = mock.set_server_port(7777).unwrap_err();
        assert_eq!(mock.error_code(error), code::FATAL);
        mock.object_release(error);

        assert!(mock.set_server_port(7777).is_ok());
    }
}
