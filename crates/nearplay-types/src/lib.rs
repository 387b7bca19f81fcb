//! Shared types for nearplay.
//!
//! This crate contains the value types shared across the nearplay workspace:
//! peer connection state, discovery info metadata, and the validated name
//! types used to configure a session (service type, local peer name).

pub mod info;
pub mod name;
pub mod peer_state;

pub use info::DiscoveryInfo;
pub use name::{truncate_utf8, NameError, PeerName, ServiceType, PEER_NAME_MAX_BYTES, SERVICE_TYPE_MAX_LEN};
pub use peer_state::PeerState;
