use crate::core::transport::{LinePort, LinkSettings, ReadOutcome};
use crate::domain::config::DeviceProfile;
use crate::domain::error::{RigError, RigResult};
use tracing::debug;

/// Connection state of a device link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "Disconnected"),
            LinkState::Connected => write!(f, "Connected"),
        }
    }
}

/// One physical device: static serial identity plus the exclusively-owned
/// transport handle for its connected lifetime.
///
/// The state/handle invariant is structural: `state()` is derived from
/// whether a port is attached, so a `Connected` link always has a handle
/// and a `Disconnected` link never does.
pub struct DeviceLink {
    settings: LinkSettings,
    port: Option<Box<dyn LinePort>>,
    heartbeat_seen: bool,
}

impl DeviceLink {
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            port: None,
            heartbeat_seen: false,
        }
    }

    pub fn from_profile(profile: &DeviceProfile) -> Self {
        Self::new(LinkSettings {
            name: profile.name.clone(),
            port_id: profile.port.clone(),
            baud_rate: profile.baud_rate,
            read_timeout: profile.read_timeout(),
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn state(&self) -> LinkState {
        if self.port.is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Take ownership of a freshly opened port
    pub fn attach(&mut self, port: Box<dyn LinePort>) {
        debug!(device = %self.settings.name, "link attached");
        self.port = Some(port);
    }

    /// Release the port, if any, and reset liveness so post-reconnect
    /// startup silence is not misread as a repeat failure
    pub fn detach(&mut self) -> Option<Box<dyn LinePort>> {
        self.heartbeat_seen = false;
        self.port.take()
    }

    /// Whether the liveness marker has been seen on this connection
    pub fn heartbeat_seen(&self) -> bool {
        self.heartbeat_seen
    }

    /// Record a liveness marker; returns true on the first one of this
    /// connection
    pub fn mark_heartbeat(&mut self) -> bool {
        let first = !self.heartbeat_seen;
        self.heartbeat_seen = true;
        first
    }

    pub async fn read_line(&mut self) -> RigResult<ReadOutcome> {
        match self.port.as_mut() {
            Some(port) => port.read_line().await,
            None => Err(RigError::NotConnected {
                device: self.settings.name.clone(),
            }),
        }
    }

    pub async fn write_line(&mut self, line: &str) -> RigResult<()> {
        match self.port.as_mut() {
            Some(port) => port.write_line(line).await,
            None => Err(RigError::NotConnected {
                device: self.settings.name.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("name", &self.settings.name)
            .field("port_id", &self.settings.port_id)
            .field("state", &self.state())
            .field("heartbeat_seen", &self.heartbeat_seen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct NullPort;

    #[async_trait]
    impl LinePort for NullPort {
        async fn read_line(&mut self) -> RigResult<ReadOutcome> {
            Ok(ReadOutcome::Timeout)
        }

        async fn write_line(&mut self, _line: &str) -> RigResult<()> {
            Ok(())
        }
    }

    fn test_link() -> DeviceLink {
        DeviceLink::new(LinkSettings {
            name: "TX2".to_string(),
            port_id: "COM7".to_string(),
            baud_rate: 9600,
            read_timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn test_state_follows_handle() {
        let mut link = test_link();
        assert_eq!(link.state(), LinkState::Disconnected);

        link.attach(Box::new(NullPort));
        assert_eq!(link.state(), LinkState::Connected);

        assert!(link.detach().is_some());
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(link.detach().is_none());
    }

    #[test]
    fn test_detach_resets_liveness() {
        let mut link = test_link();
        link.attach(Box::new(NullPort));

        assert!(link.mark_heartbeat());
        assert!(!link.mark_heartbeat());
        assert!(link.heartbeat_seen());

        link.detach();
        assert!(!link.heartbeat_seen());
    }

    #[tokio::test]
    async fn test_io_on_disconnected_link_fails() {
        let mut link = test_link();
        assert!(matches!(
            link.read_line().await,
            Err(RigError::NotConnected { .. })
        ));
        assert!(matches!(
            link.write_line("RAD").await,
            Err(RigError::NotConnected { .. })
        ));
    }
}
