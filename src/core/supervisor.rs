use crate::core::cancel::CancelToken;
use crate::core::keys::{KeyInputSource, Keystroke};
use crate::core::link::DeviceLink;
use crate::core::transport::PortOpener;
use crate::domain::error::{RigError, RigResult};
use crate::infrastructure::console;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How a connect attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    /// The operator pressed a non-escape key during the retry wait; the
    /// link is left Disconnected and the caller decides what that means
    Aborted,
}

/// Retry-until-connected semantics for device links, interruptible by
/// operator keystrokes.
pub struct ConnectionSupervisor {
    opener: Arc<dyn PortOpener>,
    cancel: CancelToken,
    backoff: Duration,
}

impl ConnectionSupervisor {
    pub fn new(opener: Arc<dyn PortOpener>, cancel: CancelToken, backoff: Duration) -> Self {
        Self {
            opener,
            cancel,
            backoff,
        }
    }

    /// Attempt to open the link until it succeeds or the operator
    /// intervenes.
    ///
    /// Each failed attempt prints a retry notice, sleeps the fixed backoff,
    /// then consumes at most one pending keystroke: escape cancels the run,
    /// any other key aborts this connect and returns with the link still
    /// Disconnected.
    pub async fn connect(
        &self,
        link: &mut DeviceLink,
        keys: &mut KeyInputSource,
    ) -> RigResult<ConnectOutcome> {
        if link.is_connected() {
            return Ok(ConnectOutcome::Connected);
        }

        console::message(&format!("Connecting to {}...", link.name()));

        loop {
            if self.cancel.is_cancelled() {
                return Err(RigError::Cancelled);
            }

            match self.opener.open(link.settings()).await {
                Ok(port) => {
                    link.attach(port);
                    info!(device = %link.name(), port = %link.settings().port_id, "connected");
                    console::message("Connected!");
                    return Ok(ConnectOutcome::Connected);
                }
                Err(e) => {
                    debug!(device = %link.name(), "open failed: {}", e);
                    console::message(&format!(
                        "ERROR: Unable to connect to {} at {}",
                        link.name(),
                        link.settings().port_id
                    ));
                    console::message("Retrying...");
                }
            }

            tokio::time::sleep(self.backoff).await;

            match keys.poll() {
                Some(Keystroke::Escape) => {
                    self.cancel.request();
                    return Err(RigError::Cancelled);
                }
                Some(key) => {
                    info!(?key, device = %link.name(), "connect aborted by operator");
                    return Ok(ConnectOutcome::Aborted);
                }
                None => {}
            }
        }
    }

    /// Close the link's transport handle if connected. Never fails; a
    /// no-op on an already-disconnected link. Also resets the link's
    /// liveness state (via detach).
    pub async fn disconnect(&self, link: &mut DeviceLink) {
        if let Some(mut port) = link.detach() {
            console::message(&format!("Disconnecting from {}...", link.name()));
            port.close().await;
            info!(device = %link.name(), "disconnected");
            console::message("Disconnected!");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::{LinePort, LinkSettings, ReadOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    /// Fails the first `failures` opens, then succeeds
    struct FlakyOpener {
        failures: usize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl PortOpener for FlakyOpener {
        async fn open(&self, settings: &LinkSettings) -> RigResult<Box<dyn LinePort>> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                Err(RigError::Connect {
                    device: settings.name.clone(),
                    port: settings.port_id.clone(),
                    reason: "busy".to_string(),
                })
            } else {
                Ok(Box::new(NullPort))
            }
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

    fn supervisor(failures: usize, cancel: CancelToken) -> ConnectionSupervisor {
        ConnectionSupervisor::new(
            Arc::new(FlakyOpener {
                failures,
                attempts: AtomicUsize::new(0),
            }),
            cancel,
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn test_connect_retries_until_success() {
        let (_tx, mut keys) = KeyInputSource::detached();
        let mut link = test_link();
        let supervisor = supervisor(3, CancelToken::new());

        let outcome = supervisor.connect(&mut link, &mut keys).await.unwrap();

        assert_eq!(outcome, ConnectOutcome::Connected);
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn test_escape_during_retry_cancels() {
        let (tx, mut keys) = KeyInputSource::detached();
        tx.send(Keystroke::Escape).unwrap();
        let mut link = test_link();
        let cancel = CancelToken::new();
        let supervisor = supervisor(usize::MAX, cancel.clone());

        let result = supervisor.connect(&mut link, &mut keys).await;

        assert!(matches!(result, Err(RigError::Cancelled)));
        assert!(cancel.is_cancelled());
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_other_key_aborts_connect_leaving_disconnected() {
        let (tx, mut keys) = KeyInputSource::detached();
        tx.send(Keystroke::Char('x')).unwrap();
        let mut link = test_link();
        let supervisor = supervisor(usize::MAX, CancelToken::new());

        let outcome = supervisor.connect(&mut link, &mut keys).await.unwrap();

        assert_eq!(outcome, ConnectOutcome::Aborted);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (_tx, mut keys) = KeyInputSource::detached();
        let mut link = test_link();
        let supervisor = supervisor(0, CancelToken::new());

        supervisor.connect(&mut link, &mut keys).await.unwrap();
        assert!(link.is_connected());

        supervisor.disconnect(&mut link).await;
        assert!(!link.is_connected());

        // No-op on an already-disconnected link
        supervisor.disconnect(&mut link).await;
        assert!(!link.is_connected());
    }
}
