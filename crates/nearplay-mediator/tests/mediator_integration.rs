//! Integration tests driving the full mediator stack over the mock backend.

use std::sync::Arc;

use nearplay_mediator::{LocalMediator, MediatorEvent, PeerIdentity};
use nearplay_native::mock::MockMediator;
use nearplay_native::{NativeLogLevel, NativeMediator};
use nearplay_types::{DiscoveryInfo, PeerState};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn started_mediator(mock: &Arc<MockMediator>) -> LocalMediator {
    let mut mediator = LocalMediator::new(mock.shared());
    let session = mediator.session_mut();
    session.set_service_type("Apidemo!").unwrap();
    session.set_local_peer_name("Host").unwrap();
    session.set_server_port(7777).unwrap();
    session.start_session().unwrap();
    mediator
}

#[test]
fn session_lifecycle_end_to_end() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = started_mediator(&mock);

    assert_eq!(mock.service_type().as_deref(), Some("apidemo"));
    assert!(mock.is_session_active());

    let events = mediator.poll_events();
    assert!(matches!(events[..], [MediatorEvent::SessionStarted]));

    // A guest connects.
    let guest = mock.register_peer("Guest");
    mock.emit_peer_state_changed(guest, PeerState::Connecting.to_wire());
    mock.emit_peer_state_changed(guest, PeerState::Connected.to_wire());

    let events = mediator.poll_events();
    assert_eq!(events.len(), 2);
    let MediatorEvent::PeerStateChanged { peer, state } = &events[1] else {
        panic!("expected PeerStateChanged, got {:?}", events[1]);
    };
    assert_eq!(peer.name(), "Guest");
    assert_eq!(*state, PeerState::Connected);

    let connected = mediator.session_mut().connected_peers().unwrap();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].name(), "Guest");

    // The guest leaves.
    mock.emit_peer_state_changed(guest, PeerState::NotConnected.to_wire());
    mediator.poll_events();
    assert_eq!(mediator.session().connected_peer_count(), 0);

    assert!(mediator.session_mut().stop_session());
    assert!(!mock.is_session_active());
}

#[test]
fn concurrent_emitters_preserve_per_thread_order() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = LocalMediator::new(mock.shared());

    // Each thread emits a found/lost sequence for its own peer; the batch
    // must contain every event, with each peer's sequence in emit order.
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let mock = Arc::clone(&mock);
            std::thread::spawn(move || {
                let peer = mock.register_peer(&format!("peer-{t}"));
                for i in 0..50 {
                    let mut info = DiscoveryInfo::new();
                    info.insert("seq", i.to_string());
                    mock.emit_peer_found(peer, info);
                }
                mock.emit_peer_lost(peer);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let events = mediator.poll_events();
    assert_eq!(events.len(), 4 * 51);

    for t in 0..4 {
        let name = format!("peer-{t}");
        let mut expected_seq = 0;
        let mut lost = false;
        for event in &events {
            match event {
                MediatorEvent::PeerFound { peer, info } if peer.name() == name => {
                    assert!(!lost, "found after lost for {name}");
                    assert_eq!(info.get("seq"), Some(expected_seq.to_string().as_str()));
                    expected_seq += 1;
                }
                MediatorEvent::PeerLost { peer } if peer.name() == name => {
                    assert_eq!(expected_seq, 50);
                    lost = true;
                }
                _ => {}
            }
        }
        assert!(lost, "no lost event for {name}");
    }
}

#[test]
fn every_payload_is_freed_exactly_once() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = started_mediator(&mock);

    let guest = mock.register_peer("Guest");
    mock.emit_peer_state_changed(guest, PeerState::Connected.to_wire());
    mock.emit_peer_found(guest, DiscoveryInfo::new());
    mock.emit_browser_start_failed("radio off");
    mock.emit_unknown(42); // dispatch fails, payload must still be freed
    mock.emit_session_disconnected();

    let events = mediator.poll_events();
    assert_eq!(events.len(), 5); // everything but the unknown kind
    assert_eq!(mock.freed_payload_count(), 4);

    // One undispatched event left at teardown gets freed too.
    mock.emit_browser_start_failed("late");
    drop(mediator);
    assert_eq!(mock.freed_payload_count(), 5);

    // Only the registry's own peer reference remains.
    assert_eq!(mock.live_object_count(), 1);
}

#[test]
fn invitation_is_answered_exactly_once() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = LocalMediator::new(mock.shared());
    mediator.advertiser_mut().start_advertising(None).unwrap();

    let inviter = mock.register_peer("Inviter");
    let handler = mock.emit_invitation_received(inviter);

    let mut events = mediator.poll_events();
    let Some(MediatorEvent::InvitationReceived { peer, invitation }) = events.pop() else {
        panic!("expected InvitationReceived, got {events:?}");
    };
    assert_eq!(peer.name(), "Inviter");

    invitation.accept();
    assert_eq!(mock.invitation_responses(), vec![(handler, true)]);
    // The continuation was released after the answer; `accept` consumed the
    // invitation, so a second answer cannot be expressed.
    assert!(!mock.is_live(handler));
}

#[test]
fn unanswered_invitation_releases_on_drop() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = LocalMediator::new(mock.shared());

    let inviter = mock.register_peer("Inviter");
    let handler = mock.emit_invitation_received(inviter);

    drop(mediator.poll_events());
    assert!(mock.invitation_responses().is_empty());
    assert!(!mock.is_live(handler));
}

#[test]
fn stale_events_after_stop_are_tolerated() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = started_mediator(&mock);
    mediator.poll_events();

    let guest = mock.register_peer("Guest");
    mock.emit_peer_state_changed(guest, PeerState::Connected.to_wire());
    assert!(mediator.session_mut().stop_session());

    // The state change was posted before the stop but drained after it;
    // it still dispatches cleanly.
    let events = mediator.poll_events();
    assert!(matches!(
        events[..],
        [MediatorEvent::PeerStateChanged {
            state: PeerState::Connected,
            ..
        }]
    ));
    assert_eq!(mock.freed_payload_count(), 1);
}

#[test]
fn teardown_deregisters_and_later_events_are_dropped() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = started_mediator(&mock);
    mediator.teardown();
    assert!(!mock.has_sink());

    // With no sink the backend drops events instead of delivering them.
    mock.emit_browser_cancelled();
    assert!(mediator.poll_events().is_empty());
}

#[test]
fn native_log_lines_respect_the_forwarding_switch() {
    init_tracing();
    let mock = MockMediator::new();
    let mediator = LocalMediator::new(mock.shared());

    mediator.set_log_forwarding(true);
    assert!(mock.is_log_forwarding());
    mock.emit_log(NativeLogLevel::Warning, "weak signal");

    mediator.set_log_forwarding(false);
    mock.emit_log(NativeLogLevel::Error, "never forwarded");
    assert!(!mock.is_log_forwarding());
}

#[test]
fn presentation_filter_limits_the_browser() {
    init_tracing();
    let mock = MockMediator::new();
    let mut mediator = LocalMediator::new(mock.shared());
    mediator.browser_mut().open_browser(2, 4).unwrap();
    mediator
        .browser_mut()
        .set_presentation_filter(Some(Arc::new(
            |_: &PeerIdentity, info: &DiscoveryInfo| info.get("mode") == Some("co-op"),
        )));

    let coop = mock.register_peer("Coop");
    let versus = mock.register_peer("Versus");

    let mut coop_info = DiscoveryInfo::new();
    coop_info.insert("mode", "co-op");
    assert!(mock.present_nearby_peer(coop, coop_info));
    assert!(!mock.present_nearby_peer(versus, DiscoveryInfo::new()));

    mediator.browser_mut().set_presentation_filter(None);
    let anyone = mock.register_peer("Anyone");
    assert!(mock.present_nearby_peer(anyone, DiscoveryInfo::new()));
}
