//! Ownership wrappers for opaque native object references.

use std::sync::Arc;

use crate::service::SharedMediator;

/// An opaque native object reference, as carried across the boundary.
///
/// A bare `RawRef` confers no ownership; wrap it in a [`NativeHandle`] to
/// hold a retain count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawRef(u64);

impl RawRef {
    /// Reconstruct a reference from its wire representation.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The wire representation of this reference.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RawRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Owning wrapper around a native object reference.
///
/// Holds exactly one retain count on the native object: cloning retains,
/// dropping releases. Equality and hashing delegate to the native identity,
/// not to any cached value.
pub struct NativeHandle {
    raw: RawRef,
    service: SharedMediator,
}

impl NativeHandle {
    /// Take ownership of a native reference.
    ///
    /// The caller transfers one retain count to the handle; the handle
    /// releases it on drop.
    #[must_use]
    pub fn adopt(service: SharedMediator, raw: RawRef) -> Self {
        Self { raw, service }
    }

    /// The underlying native reference.
    #[must_use]
    pub fn raw(&self) -> RawRef {
        self.raw
    }

    /// The native service this handle belongs to.
    #[must_use]
    pub fn service(&self) -> &SharedMediator {
        &self.service
    }
}

impl Clone for NativeHandle {
    fn clone(&self) -> Self {
        self.service.object_retain(self.raw);
        Self {
            raw: self.raw,
            service: Arc::clone(&self.service),
        }
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.service.object_release(self.raw);
    }
}

impl PartialEq for NativeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw || self.service.object_eq(self.raw, other.raw)
    }
}

impl Eq for NativeHandle {}

impl std::hash::Hash for NativeHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.service.object_hash(self.raw).hash(state);
    }
}

impl std::fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NativeHandle").field(&self.raw).finish()
    }
}
