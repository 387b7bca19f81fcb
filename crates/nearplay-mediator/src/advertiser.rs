//! Advertising the local session to nearby browsers.

use nearplay_native::{escalate, swallow, MediatorError, SharedMediator};
use nearplay_types::DiscoveryInfo;
use tracing::info;

/// Headless advertiser: makes the local session discoverable and surfaces
/// incoming invitations as [`crate::MediatorEvent::InvitationReceived`], for
/// the consumer to answer programmatically.
pub struct Advertiser {
    service: SharedMediator,
}

impl Advertiser {
    pub(crate) fn new(service: SharedMediator) -> Self {
        Self { service }
    }

    /// Start advertising, optionally attaching `info` key/value pairs for
    /// browsing peers to read before inviting.
    pub fn start_advertising(
        &mut self,
        info: Option<&DiscoveryInfo>,
    ) -> Result<(), MediatorError> {
        escalate(&self.service, self.service.start_advertiser(info))?;
        info!(
            info_entries = info.map_or(0, DiscoveryInfo::len),
            "advertising started"
        );
        Ok(())
    }

    /// Stop advertising.
    ///
    /// Best-effort: returns `false` instead of failing when not advertising.
    pub fn stop_advertising(&mut self) -> bool {
        swallow(&self.service, self.service.stop_advertiser()).is_some()
    }

    /// Whether the advertiser is currently running.
    #[must_use]
    pub fn is_advertising(&self) -> bool {
        self.service.is_advertising()
    }
}

/// UI-assisted advertiser: like [`Advertiser`], but incoming invitations are
/// presented through the native invitation dialog instead of being surfaced
/// to the consumer. Outcomes arrive as
/// [`crate::MediatorEvent::InvitationPresenting`] and
/// [`crate::MediatorEvent::InvitationDismissed`].
pub struct AdvertiserAssistant {
    service: SharedMediator,
}

impl AdvertiserAssistant {
    pub(crate) fn new(service: SharedMediator) -> Self {
        Self { service }
    }

    /// Start the assistant, optionally attaching discovery `info`.
    pub fn start_advertising(
        &mut self,
        info: Option<&DiscoveryInfo>,
    ) -> Result<(), MediatorError> {
        escalate(&self.service, self.service.start_advertiser_assistant(info))?;
        info!("advertiser assistant started");
        Ok(())
    }

    /// Stop the assistant.
    ///
    /// Best-effort: returns `false` instead of failing when not running.
    pub fn stop_advertising(&mut self) -> bool {
        swallow(&self.service, self.service.stop_advertiser_assistant()).is_some()
    }

    /// Whether the assistant is currently advertising.
    #[must_use]
    pub fn is_advertising(&self) -> bool {
        self.service.is_assistant_advertising()
    }
}
