use crate::core::cancel::CancelToken;
use crate::core::keys::{KeyInputSource, Keystroke};
use crate::core::link::DeviceLink;
use crate::core::protocol::{self, Inbound};
use crate::core::session::Session;
use crate::core::supervisor::{ConnectOutcome, ConnectionSupervisor};
use crate::core::transport::ReadOutcome;
use crate::domain::error::{RigError, RigResult};
use crate::infrastructure::console;
use crate::infrastructure::storage::ErrorLog;
use tracing::{debug, info, trace, warn};

/// The monitor run loop: a single-threaded cooperative state machine over
/// operator keystrokes and device line I/O.
///
/// Liveness starts in the awaiting-heartbeat state (silence expected and
/// ignored) and becomes active on the first marker line; from then on a
/// timed-out read is a real failure and triggers recovery. The loop never
/// sleeps on its own; the bounded line read is the scheduling tick.
///
/// Returns only by error: `Cancelled` for a clean operator exit, a
/// transport error when the session must be torn down and restarted.
pub struct SessionController<'a> {
    monitored: &'a mut DeviceLink,
    power: Option<&'a mut DeviceLink>,
    keys: &'a mut KeyInputSource,
    supervisor: &'a ConnectionSupervisor,
    cancel: CancelToken,
    session: Session,
    errors: &'a mut ErrorLog,
}

impl<'a> SessionController<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        monitored: &'a mut DeviceLink,
        power: Option<&'a mut DeviceLink>,
        keys: &'a mut KeyInputSource,
        supervisor: &'a ConnectionSupervisor,
        cancel: CancelToken,
        session: Session,
        errors: &'a mut ErrorLog,
    ) -> Self {
        Self {
            monitored,
            power,
            keys,
            supervisor,
            cancel,
            session,
            errors,
        }
    }

    /// Automatic recovery requires a power controller to command
    fn recovery_enabled(&self) -> bool {
        self.power.is_some()
    }

    pub async fn run(mut self) -> RigResult<()> {
        console::message("Monitoring. ESC cancels, ENTER forces a power cycle.");

        loop {
            if self.cancel.is_cancelled() {
                return Err(RigError::Cancelled);
            }
            self.handle_keystroke().await?;
            self.service_monitored().await?;
            self.service_diagnostics().await;
        }
    }

    /// Consume at most one pending keystroke so a burst of input cannot
    /// starve device I/O
    async fn handle_keystroke(&mut self) -> RigResult<()> {
        match self.keys.poll() {
            Some(Keystroke::Escape) => {
                self.cancel.request();
                Err(RigError::Cancelled)
            }
            Some(Keystroke::Enter) => {
                console::message("Manual power cycle requested");
                self.cycle_power().await
            }
            Some(Keystroke::Char('p')) | Some(Keystroke::Char('P')) => {
                match self.power.as_deref_mut() {
                    Some(power) => {
                        console::message("Sending POWER_ON signal...");
                        power.write_line(protocol::POWER_ON).await
                    }
                    None => {
                        warn!("no power controller configured; POWER_ON ignored");
                        Ok(())
                    }
                }
            }
            Some(Keystroke::Char('r')) | Some(Keystroke::Char('R')) => {
                console::message("Sending RAD signal...");
                self.monitored.write_line(protocol::RAD).await
            }
            Some(key) => {
                trace!(?key, "ignored keystroke");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// One bounded read from the monitored device and the state transition
    /// it implies
    async fn service_monitored(&mut self) -> RigResult<()> {
        let outcome = match self.monitored.read_line().await {
            Ok(outcome) => outcome,
            // One unreadable line must not kill a multi-hour run: record it
            // and keep going
            Err(RigError::Garbled { device, reason }) => {
                warn!(device = %device, "unreadable line: {}", reason);
                self.errors
                    .record(&format!("unreadable data from {}: {}", device, reason));
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let inbound = match outcome {
            ReadOutcome::Timeout => Inbound::Silence,
            ReadOutcome::Line(raw) => protocol::classify(&raw),
        };

        match inbound {
            Inbound::Silence => self.handle_silence().await,
            Inbound::Marker => {
                if self.monitored.mark_heartbeat() {
                    info!(device = %self.monitored.name(), "first heartbeat received");
                    console::message(&format!(
                        "{} heartbeat established",
                        self.monitored.name()
                    ));
                }
                Ok(())
            }
            Inbound::Payload(line) => {
                console::message(&format!("RECEIVED: {}", line));
                self.session.record(&line)?;
                Ok(())
            }
        }
    }

    /// Silence is expected before the first heartbeat and a liveness
    /// failure after it
    async fn handle_silence(&mut self) -> RigResult<()> {
        if self.recovery_enabled() && self.monitored.heartbeat_seen() {
            console::alert(&format!("{} Not Responding", self.monitored.name()));
            self.errors
                .record(&format!("{} not responding", self.monitored.name()));
            self.cycle_power().await
        } else {
            trace!(device = %self.monitored.name(), "no data within read window");
            Ok(())
        }
    }

    /// Power-cycle the monitored device: disconnect, command the power
    /// controller, reconnect. Liveness resets with the disconnect, so
    /// post-cycle startup silence is tolerated again.
    async fn cycle_power(&mut self) -> RigResult<()> {
        let Some(power) = self.power.as_deref_mut() else {
            warn!("no power controller configured; cannot power cycle");
            console::message("No power controller configured; power cycle skipped");
            return Ok(());
        };

        self.supervisor.disconnect(self.monitored).await;

        console::message("Sending POWER_CYCLE signal...");
        power.write_line(protocol::POWER_CYCLE).await?;

        match self.supervisor.connect(self.monitored, self.keys).await? {
            ConnectOutcome::Connected => Ok(()),
            // Operator skipped the reconnect; let the outer supervisor
            // restart the whole cycle
            ConnectOutcome::Aborted => Err(RigError::NotConnected {
                device: self.monitored.name().to_string(),
            }),
        }
    }

    /// Best-effort read of the power controller's console output into the
    /// kernel log. This channel is non-critical: failures are surfaced at
    /// debug level and never propagated.
    async fn service_diagnostics(&mut self) {
        if !self.session.captures_diagnostics() {
            return;
        }
        let Some(power) = self.power.as_deref_mut() else {
            return;
        };
        if !power.is_connected() {
            return;
        }

        match power.read_line().await {
            Ok(ReadOutcome::Line(raw)) => {
                if let Inbound::Payload(line) = protocol::classify(&raw) {
                    if let Err(e) = self.session.record_kernel(&line) {
                        debug!("kernel log write failed: {}", e);
                    }
                }
            }
            Ok(ReadOutcome::Timeout) => {}
            Err(e) => debug!("diagnostic channel read failed: {}", e),
        }
    }
}
