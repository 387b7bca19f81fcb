//! Consumer-facing core of nearplay.
//!
//! A [`LocalMediator`] owns one native peer-networking service and exposes
//! it to a single consumer thread: configure and start a session, discover
//! and invite nearby peers (headless or through the native browser UI),
//! advertise the session, and receive deferred native events once per tick
//! via [`LocalMediator::poll_events`].
//!
//! Native callbacks arrive on arbitrary threads; the [`EventBridge`] buffers
//! them until the next poll, preserving post order. Two callbacks bypass the
//! buffer and run inline on the calling thread: the browser's presentation
//! filter and native log lines.

pub mod advertiser;
pub mod bridge;
pub mod config;
pub mod discovery;
pub mod event;
pub mod mediator;
pub mod queue;
pub mod session;

pub use advertiser::{Advertiser, AdvertiserAssistant};
pub use bridge::{EventBridge, PresentationFilter};
pub use config::{ConfigError, LogConfig, MediatorConfig, SessionConfig};
pub use discovery::{
    Discovery, PeerBrowser, DEFAULT_INVITE_TIMEOUT, MAX_BROWSER_PEERS, MIN_BROWSER_PEERS,
};
pub use event::{DispatchError, MediatorEvent};
pub use mediator::LocalMediator;
pub use session::{Session, SessionLifecycle};

pub use nearplay_native::{Invitation, MediatorError, PeerIdentity, SharedMediator};
pub use nearplay_types::{DiscoveryInfo, PeerName, PeerState, ServiceType};
