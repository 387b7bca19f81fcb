//! Native peer-networking boundary for nearplay.
//!
//! The platform's peer-networking subsystem is an external collaborator: it
//! hands out refcounted opaque objects (peers, errors, invitation
//! continuations) and delivers callbacks on arbitrary background threads.
//! This crate owns that boundary:
//!
//! - [`NativeHandle`] / [`RawRef`] — deterministic ownership of native
//!   references (clone = retain, drop = release; no finalizer reliance).
//! - [`PeerIdentity`] — an immutable peer value with cached display name and
//!   hash, identity delegated to the native object.
//! - [`MediatorError`] and the translate/escalate/swallow helpers — the fixed
//!   error taxonomy, with every inspected native error object released
//!   exactly once.
//! - [`NativeMediator`] — the trait an actual backend implements, including
//!   event delivery via [`EventSink`] and per-kind payload marshalling.
//! - [`mock::MockMediator`] — an in-process fake backend (behind the `mock`
//!   feature) used by the workspace's tests.

pub mod error;
pub mod event;
pub mod handle;
pub mod invitation;
pub mod peer;
pub mod service;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{escalate, escalate_value, swallow, translate, MarshalError, MediatorError};
pub use event::{EventKind, EventSink, NativeEvent, NativeLogLevel, PayloadGuard};
pub use handle::{NativeHandle, RawRef};
pub use invitation::Invitation;
pub use peer::PeerIdentity;
pub use service::{NativeMediator, NativeResult, SharedMediator};
