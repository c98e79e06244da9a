use crate::core::cancel::CancelToken;
use crate::core::keys::KeyInputSource;
use crate::core::link::DeviceLink;
use crate::core::monitor::SessionController;
use crate::core::session::Session;
use crate::core::supervisor::{ConnectOutcome, ConnectionSupervisor};
use crate::core::transport::PortOpener;
use crate::domain::config::RigConfig;
use crate::domain::error::{RigError, RigResult};
use crate::infrastructure::console;
use crate::infrastructure::storage::ErrorLog;
use std::sync::Arc;
use tracing::{error, warn};

/// The outermost supervisor: connect everything, run a session, and on any
/// transport failure tear down and start over after a short delay.
///
/// This is the only layer that treats a broken link as recoverable.
/// `run` returns only on operator cancellation.
pub struct Rig {
    config: RigConfig,
    monitored: DeviceLink,
    power: Option<DeviceLink>,
    supervisor: ConnectionSupervisor,
    keys: KeyInputSource,
    cancel: CancelToken,
    errors: ErrorLog,
}

impl Rig {
    pub fn new(
        config: RigConfig,
        opener: Arc<dyn PortOpener>,
        keys: KeyInputSource,
        cancel: CancelToken,
    ) -> RigResult<Self> {
        let errors = ErrorLog::open(&config.global.output_dir)?;
        let monitored = DeviceLink::from_profile(&config.monitored);
        let power = config.power.as_ref().map(DeviceLink::from_profile);
        let supervisor =
            ConnectionSupervisor::new(opener, cancel.clone(), config.retry_backoff());

        Ok(Self {
            config,
            monitored,
            power,
            supervisor,
            keys,
            cancel,
            errors,
        })
    }

    pub async fn run(&mut self) -> RigResult<()> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(RigError::Cancelled);
            }

            tokio::time::sleep(self.config.restart_delay()).await;

            match self.cycle().await {
                Err(RigError::Cancelled) => {
                    self.disconnect_all().await;
                    return Err(RigError::Cancelled);
                }
                Err(e) => {
                    console::message(&format!("Error: Disconnected ({})", e));
                    error!("session ended: {}", e);
                    self.errors.record(&e.to_string());
                }
                Ok(()) => {}
            }

            self.disconnect_all().await;
        }
    }

    /// One connect-and-monitor cycle
    async fn cycle(&mut self) -> RigResult<()> {
        // The power controller must be ready to react to anything the
        // monitored device does, so the monitored link always connects
        // first
        match self
            .supervisor
            .connect(&mut self.monitored, &mut self.keys)
            .await?
        {
            ConnectOutcome::Connected => {}
            ConnectOutcome::Aborted => {
                warn!(device = %self.monitored.name(), "left disconnected by operator; restarting");
                return Ok(());
            }
        }

        if let Some(power) = self.power.as_mut() {
            if let ConnectOutcome::Aborted =
                self.supervisor.connect(power, &mut self.keys).await?
            {
                // Monitoring still works without the power controller;
                // recovery writes will fail and restart the cycle
                warn!(device = %power.name(), "power controller left disconnected by operator");
            }
        }

        let capture = self.config.global.capture_diagnostics && self.power.is_some();
        let session = Session::open(&self.config.global.output_dir, capture)?;

        let controller = SessionController::new(
            &mut self.monitored,
            self.power.as_mut(),
            &mut self.keys,
            &self.supervisor,
            self.cancel.clone(),
            session,
            &mut self.errors,
        );
        controller.run().await
    }

    /// Ask the key reader to terminate; it exits after its next terminal
    /// event
    pub fn shutdown(&self) {
        self.keys.stop();
    }

    /// Monitored link first, power link second, matching connect order
    async fn disconnect_all(&mut self) {
        self.supervisor.disconnect(&mut self.monitored).await;
        if let Some(power) = self.power.as_mut() {
            self.supervisor.disconnect(power).await;
        }
    }
}
