//! One-shot invitation accept/decline continuation.

use tracing::warn;

use crate::handle::NativeHandle;

/// A received invitation's accept/decline continuation.
///
/// The native continuation behind this handle must be invoked at most once;
/// [`respond`](Self::respond) consumes the invitation to enforce that. The
/// native reference is released once invoked, or on drop if the invitation
/// was never answered — in which case the peer's invitation simply times
/// out on their side.
pub struct Invitation {
    handler: Option<NativeHandle>,
    peer_name: String,
}

impl Invitation {
    /// Wrap a retained native continuation received from `peer_name`.
    #[must_use]
    pub fn new(handler: NativeHandle, peer_name: impl Into<String>) -> Self {
        Self {
            handler: Some(handler),
            peer_name: peer_name.into(),
        }
    }

    /// Answer the invitation.
    pub fn respond(mut self, accept: bool) {
        if let Some(handler) = self.handler.take() {
            handler
                .service()
                .invoke_invitation_handler(handler.raw(), accept);
        }
    }

    /// Accept the invitation.
    pub fn accept(self) {
        self.respond(true);
    }

    /// Decline the invitation.
    pub fn decline(self) {
        self.respond(false);
    }
}

impl Drop for Invitation {
    fn drop(&mut self) {
        if self.handler.take().is_some() {
            warn!(
                peer = %self.peer_name,
                "invitation dropped without a response; it will time out on the inviting side"
            );
        }
    }
}

impl std::fmt::Debug for Invitation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invitation")
            .field("peer_name", &self.peer_name)
            .field("answered", &self.handler.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NativeHandle;
    use crate::mock::MockMediator;

    #[test]
    fn respond_invokes_and_releases_the_continuation() {
        let mock = MockMediator::new();
        let handler = mock.make_invitation_handler();

        let invitation = Invitation::new(NativeHandle::adopt(mock.shared(), handler), "Alice");
        invitation.respond(true);

        assert_eq!(mock.invitation_responses(), vec![(handler, true)]);
        assert!(!mock.is_live(handler));
    }

    #[test]
    fn decline_reaches_the_native_side() {
        let mock = MockMediator::new();
        let handler = mock.make_invitation_handler();

        Invitation::new(NativeHandle::adopt(mock.shared(), handler), "Bob").decline();
        assert_eq!(mock.invitation_responses(), vec![(handler, false)]);
    }

    #[test]
    fn drop_without_response_releases_without_invoking() {
        let mock = MockMediator::new();
        let handler = mock.make_invitation_handler();

        let invitation = Invitation::new(NativeHandle::adopt(mock.shared(), handler), "Carol");
        drop(invitation);

        assert!(mock.invitation_responses().is_empty());
        assert!(!mock.is_live(handler));
    }
}
