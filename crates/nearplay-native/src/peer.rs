//! Peer identity.

use std::sync::Arc;

use crate::handle::{NativeHandle, RawRef};
use crate::service::SharedMediator;

/// Uniquely identifies a remote participant of the session.
///
/// Immutable after construction. The display name and hash are cached at
/// marshal time; identity and equality delegate to the native object, not
/// to the name — two peers may share a display name.
#[derive(Clone)]
pub struct PeerIdentity {
    handle: NativeHandle,
    name: String,
    hash: u64,
}

impl PeerIdentity {
    /// Take ownership of a retained native peer reference, caching its
    /// display name and hash.
    #[must_use]
    pub fn adopt(service: &SharedMediator, raw: RawRef) -> Self {
        let name = service.peer_display_name(raw);
        let hash = service.object_hash(raw);
        Self {
            handle: NativeHandle::adopt(Arc::clone(service), raw),
            name,
            hash,
        }
    }

    /// Display name of the peer, at most 63 UTF-8 bytes by contract.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying native reference.
    #[must_use]
    pub fn raw(&self) -> RawRef {
        self.handle.raw()
    }
}

impl PartialEq for PeerIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for PeerIdentity {}

impl std::hash::Hash for PeerIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl std::fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::fmt::Debug for PeerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerIdentity")
            .field("raw", &self.raw())
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::mock::MockMediator;
    use crate::service::NativeMediator;

    #[test]
    fn caches_name_and_releases_on_drop() {
        let mock = MockMediator::new();
        let raw = mock.register_peer("Alice");
        mock.object_retain(raw);

        let peer = PeerIdentity::adopt(&mock.shared(), raw);
        assert_eq!(peer.name(), "Alice");
        assert_eq!(mock.refcount(raw), 2);

        drop(peer);
        assert_eq!(mock.refcount(raw), 1);
    }

    #[test]
    fn identity_is_native_not_name() {
        let mock = MockMediator::new();
        let a = mock.register_peer("Twin");
        let b = mock.register_peer("Twin");
        mock.object_retain(a);
        mock.object_retain(b);

        let service = mock.shared();
        let peer_a = PeerIdentity::adopt(&service, a);
        let peer_b = PeerIdentity::adopt(&service, b);

        assert_eq!(peer_a.name(), peer_b.name());
        assert_ne!(peer_a, peer_b);

        let set: HashSet<PeerIdentity> = [peer_a.clone(), peer_b, peer_a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
