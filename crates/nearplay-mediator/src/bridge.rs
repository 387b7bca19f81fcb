//! The event bridge registered with the native layer.

use std::sync::{Arc, Mutex, PoisonError};

use nearplay_native::{EventSink, NativeEvent, NativeLogLevel, PeerIdentity};
use nearplay_types::DiscoveryInfo;
use tracing::{error, info, warn};

use crate::queue::EventQueue;

/// Decision callback for the native browser UI: should this nearby peer be
/// presented? Runs on a native thread and must not touch consumer state.
pub type PresentationFilter = Arc<dyn Fn(&PeerIdentity, &DiscoveryInfo) -> bool + Send + Sync>;

/// The sink the mediator registers with the native layer.
///
/// Deferred events are buffered for the consumer's next drain. Two kinds of
/// callback are unsafe to defer and are handled inline on the calling
/// thread: the presentation filter (the native layer blocks on its answer)
/// and raw log lines (forwarded straight to `tracing`).
#[derive(Default)]
pub struct EventBridge {
    queue: EventQueue,
    presentation_filter: Mutex<Option<PresentationFilter>>,
}

impl EventBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all deferred events buffered since the last drain, in push order.
    #[must_use]
    pub fn drain(&self) -> Vec<NativeEvent> {
        self.queue.drain()
    }

    /// Install the presentation filter. `None` restores the default of
    /// presenting every nearby peer.
    pub fn set_presentation_filter(&self, filter: Option<PresentationFilter>) {
        *self
            .presentation_filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = filter;
    }

    /// The current filter, cloned out so the lock is never held while the
    /// consumer's closure runs. A filter that panicked on an earlier call
    /// must not wedge later callbacks, so poisoning is ignored.
    fn presentation_filter(&self) -> Option<PresentationFilter> {
        self.presentation_filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.queue.len()
    }
}

impl EventSink for EventBridge {
    fn on_event(&self, event: NativeEvent) {
        self.queue.push(event);
    }

    fn on_nearby_peer_presenting(&self, peer: PeerIdentity, info: DiscoveryInfo) -> bool {
        match self.presentation_filter() {
            Some(filter) => filter(&peer, &info),
            None => true,
        }
    }

    fn on_log(&self, level: NativeLogLevel, line: &str) {
        match level {
            NativeLogLevel::Info => info!(target: "nearplay::native", "{line}"),
            NativeLogLevel::Warning => warn!(target: "nearplay::native", "{line}"),
            NativeLogLevel::Error => error!(target: "nearplay::native", "{line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use nearplay_native::mock::MockMediator;
    use nearplay_native::NativeMediator;
    use nearplay_types::PeerState;

    use super::*;

    #[test]
    fn deferred_events_are_buffered_not_dispatched() {
        let mock = MockMediator::new();
        let bridge = Arc::new(EventBridge::new());
        mock.set_event_sink(Some(bridge.clone()));

        let peer = mock.register_peer("Alice");
        mock.emit_peer_state_changed(peer, PeerState::Connected.to_wire());
        mock.emit_session_started();

        assert_eq!(bridge.buffered(), 2);
    }

    #[test]
    fn presentation_filter_answers_inline() {
        let mock = MockMediator::new();
        let bridge = Arc::new(EventBridge::new());
        mock.set_event_sink(Some(bridge.clone()));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_filter = Arc::clone(&calls);
        bridge.set_presentation_filter(Some(Arc::new(
            move |peer: &PeerIdentity, _info: &DiscoveryInfo| {
                calls_in_filter.fetch_add(1, Ordering::SeqCst);
                peer.name() != "Hidden"
            },
        )));

        let visible = mock.register_peer("Alice");
        let hidden = mock.register_peer("Hidden");
        assert!(mock.present_nearby_peer(visible, DiscoveryInfo::new()));
        assert!(!mock.present_nearby_peer(hidden, DiscoveryInfo::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Nothing was deferred.
        assert_eq!(bridge.buffered(), 0);
    }

    #[test]
    fn panicking_filter_does_not_wedge_later_callbacks() {
        let mock = MockMediator::new();
        let bridge = Arc::new(EventBridge::new());
        mock.set_event_sink(Some(bridge.clone()));

        bridge.set_presentation_filter(Some(Arc::new(
            |peer: &PeerIdentity, _info: &DiscoveryInfo| {
                assert_ne!(peer.name(), "Bad", "filter rejects this peer the hard way");
                true
            },
        )));

        let bad = mock.register_peer("Bad");
        let good = mock.register_peer("Good");

        let first = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            mock.present_nearby_peer(bad, DiscoveryInfo::new())
        }));
        assert!(first.is_err());

        // One bad answer must not poison the rest: later callbacks still
        // reach the filter, and the consumer can still replace it.
        assert!(mock.present_nearby_peer(good, DiscoveryInfo::new()));
        bridge.set_presentation_filter(None);
        assert!(mock.present_nearby_peer(bad, DiscoveryInfo::new()));
    }

    #[test]
    fn missing_filter_defaults_to_presenting() {
        let mock = MockMediator::new();
        let bridge = Arc::new(EventBridge::new());
        mock.set_event_sink(Some(bridge));

        let peer = mock.register_peer("Alice");
        assert!(mock.present_nearby_peer(peer, DiscoveryInfo::new()));
    }
}
