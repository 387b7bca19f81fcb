//! Error taxonomy and native error translation.
//!
//! Native calls report failure via an out-of-band error object. Two
//! propagation policies exist, chosen per operation:
//!
//! - caller-intent operations ([`escalate`] / [`escalate_value`]) turn the
//!   error object into a typed [`MediatorError`];
//! - cleanup/best-effort operations ([`swallow`]) log it at debug level and
//!   report only success/failure.
//!
//! Either way the error object is inspected at most once and released
//! exactly once; ownership moves into a [`NativeHandle`] whose drop performs
//! the release.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::handle::{NativeHandle, RawRef};
use crate::service::{NativeResult, SharedMediator};

/// Native error codes, as defined by the boundary contract.
pub mod code {
    pub const NONE: u32 = 0;
    pub const FATAL: u32 = 1;
    pub const NOT_SUPPORTED: u32 = 2;
    pub const SESSION_ACTIVE: u32 = 3;
    pub const SESSION_NOT_ACTIVE: u32 = 4;
    pub const INVALID_STATE: u32 = 5;
    pub const INVALID_INPUT: u32 = 6;
}

/// Failure kinds surfaced by the mediator.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// Unrecoverable native failure.
    #[error("fatal native failure: {0}")]
    Fatal(String),

    /// Feature unavailable on this platform or build.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The session must be inactive for this operation.
    #[error("session must be non-active for this operation; check Session::is_active")]
    SessionActive,

    /// The session must be active for this operation.
    #[error("session must be active for this operation; check Session::is_active")]
    SessionNotActive,

    /// A native object or subsystem is in the wrong mode.
    #[error("invalid native state: {0}")]
    InvalidState(String),

    /// Bad argument — a caller bug.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A native error code this layer does not know how to translate.
    #[error("unrecognized native error (code {code}): {message}")]
    Unrecognized { code: u32, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediatorError {
    /// Whether this error represents a precondition violation the caller
    /// can avoid by checking state first.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::SessionActive | Self::SessionNotActive)
    }
}

/// Payload marshalling failure — a native/managed protocol mismatch.
#[derive(Debug, Error)]
#[error("failed to marshal {what} payload: {detail}")]
pub struct MarshalError {
    pub what: &'static str,
    pub detail: String,
}

impl MarshalError {
    #[must_use]
    pub fn new(what: &'static str, detail: impl Into<String>) -> Self {
        Self {
            what,
            detail: detail.into(),
        }
    }
}

/// Translate a native error object into a [`MediatorError`], releasing it.
///
/// Returns `None` for code `NONE`, which the boundary contract treats as
/// a no-op rather than a failure.
pub fn translate(service: &SharedMediator, error: RawRef) -> Option<MediatorError> {
    // Owns the single release, on every return path below.
    let guard = NativeHandle::adopt(Arc::clone(service), error);

    let code = service.error_code(guard.raw());
    if code == code::NONE {
        return None;
    }

    let message = service
        .error_description(guard.raw())
        .unwrap_or_else(|| format!("native error code {code}"));

    Some(match code {
        code::FATAL => MediatorError::Fatal(message),
        code::NOT_SUPPORTED => MediatorError::NotSupported(message),
        code::SESSION_ACTIVE => MediatorError::SessionActive,
        code::SESSION_NOT_ACTIVE => MediatorError::SessionNotActive,
        code::INVALID_STATE => MediatorError::InvalidState(message),
        code::INVALID_INPUT => MediatorError::InvalidInput(message),
        _ => MediatorError::Unrecognized { code, message },
    })
}

/// Escalate a fallible native call that produces no value.
pub fn escalate(service: &SharedMediator, result: NativeResult<()>) -> Result<(), MediatorError> {
    match result {
        Ok(()) => Ok(()),
        Err(error) => match translate(service, error) {
            None => Ok(()),
            Some(err) => Err(err),
        },
    }
}

/// Escalate a fallible native call that produces a value.
///
/// A failure carrying code `NONE` has no value to return and is reported as
/// an unrecognized error — it violates the boundary contract.
pub fn escalate_value<T>(
    service: &SharedMediator,
    result: NativeResult<T>,
) -> Result<T, MediatorError> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => Err(translate(service, error).unwrap_or(MediatorError::Unrecognized {
            code: code::NONE,
            message: "native call failed without an error code".to_string(),
        })),
    }
}

/// Swallow a best-effort native call's failure, releasing the error object.
///
/// Returns the value on success, `None` on failure. The failure is reported
/// at debug level only: "can't stop what isn't started" is not exceptional.
pub fn swallow<T>(service: &SharedMediator, result: NativeResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            let guard = NativeHandle::adopt(Arc::clone(service), error);
            debug!(
                code = service.error_code(guard.raw()),
                "best-effort native call failed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockMediator;

    #[test]
    fn translate_maps_known_codes() {
        let mock = MockMediator::new();
        let service = mock.shared();

        let error = mock.make_error(code::SESSION_ACTIVE, None);
        assert!(matches!(
            translate(&service, error),
            Some(MediatorError::SessionActive)
        ));

        let error = mock.make_error(code::INVALID_INPUT, Some("bad port"));
        match translate(&service, error) {
            Some(MediatorError::InvalidInput(msg)) => assert_eq!(msg, "bad port"),
            other => panic!("unexpected translation: {other:?}"),
        }
    }

    #[test]
    fn translate_unknown_code_is_unrecognized() {
        let mock = MockMediator::new();
        let service = mock.shared();

        let error = mock.make_error(999, None);
        match translate(&service, error) {
            Some(MediatorError::Unrecognized { code, .. }) => assert_eq!(code, 999),
            other => panic!("unexpected translation: {other:?}"),
        }
    }

    #[test]
    fn translate_none_code_is_no_op() {
        let mock = MockMediator::new();
        let service = mock.shared();

        let error = mock.make_error(code::NONE, None);
        assert!(translate(&service, error).is_none());
    }

    #[test]
    fn precondition_violations_are_distinguishable() {
        let mock = MockMediator::new();
        let service = mock.shared();

        let error = mock.make_error(code::SESSION_NOT_ACTIVE, None);
        let err = translate(&service, error).expect("known code");
        assert!(err.is_precondition());

        let error = mock.make_error(code::SESSION_ACTIVE, None);
        let err = translate(&service, error).expect("known code");
        assert!(err.is_precondition());

        let error = mock.make_error(code::FATAL, Some("boom"));
        let err = translate(&service, error).expect("known code");
        assert!(!err.is_precondition());
    }

    #[test]
    fn error_object_released_exactly_once_on_both_paths() {
        let mock = MockMediator::new();
        let service = mock.shared();

        let escalated = mock.make_error(code::FATAL, Some("boom"));
        let swallowed = mock.make_error(code::SESSION_NOT_ACTIVE, None);

        assert!(escalate(&service, Err(escalated)).is_err());
        assert!(swallow::<()>(&service, Err(swallowed)).is_none());

        assert!(!mock.is_live(escalated));
        assert!(!mock.is_live(swallowed));
    }
}
