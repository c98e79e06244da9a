use crate::core::transport::{LinePort, LinkSettings, PortOpener, ReadOutcome};
use crate::domain::error::{RigError, RigResult};
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Short hardware read timeout; the reader task polls at this cadence so
/// shutdown is observed promptly. The per-link read timeout is enforced
/// separately in `read_line`.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Opens real serial ports via the `serialport` crate
pub struct SerialPortOpener;

#[async_trait]
impl PortOpener for SerialPortOpener {
    async fn open(&self, settings: &LinkSettings) -> RigResult<Box<dyn LinePort>> {
        let port = serialport::new(&settings.port_id, settings.baud_rate)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| RigError::Connect {
                device: settings.name.clone(),
                port: settings.port_id.clone(),
                reason: e.to_string(),
            })?;

        debug!(device = %settings.name, port = %settings.port_id, "serial port opened");
        Ok(Box::new(SerialLinePort::start(settings, port)))
    }
}

/// Line-framing wrapper over one open serial port.
///
/// A blocking reader task accumulates bytes into newline-delimited frames
/// and hands them over a channel; `read_line` applies the link's bounded
/// read window on the consumer side. Writes lock the port directly so
/// their errors surface synchronously.
pub struct SerialLinePort {
    name: String,
    read_timeout: Duration,
    port: Arc<Mutex<Box<dyn SerialPort>>>,
    lines: mpsc::UnboundedReceiver<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialLinePort {
    fn start(settings: &LinkSettings, port: Box<dyn SerialPort>) -> Self {
        let port = Arc::new(Mutex::new(port));
        let (tx, lines) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader = tokio::task::spawn_blocking({
            let port = Arc::clone(&port);
            let shutdown = Arc::clone(&shutdown);
            let name = settings.name.clone();
            move || read_loop(&name, &port, &tx, &shutdown)
        });

        Self {
            name: settings.name.clone(),
            read_timeout: settings.read_timeout,
            port,
            lines,
            shutdown,
            reader: Some(reader),
        }
    }
}

fn read_loop(
    name: &str,
    port: &Mutex<Box<dyn SerialPort>>,
    tx: &mpsc::UnboundedSender<Vec<u8>>,
    shutdown: &AtomicBool,
) {
    let mut buf = [0u8; 1024];
    let mut pending: Vec<u8> = Vec::new();

    while !shutdown.load(Ordering::SeqCst) {
        let n = {
            let mut port = port.blocking_lock();
            match port.read(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => 0,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => 0,
                Err(e) => {
                    // Dropping the sender closes the channel; the consumer
                    // sees it as a transport failure
                    debug!(device = %name, "serial read failed: {}", e);
                    break;
                }
            }
        };
        if n == 0 {
            continue;
        }

        for &byte in &buf[..n] {
            if byte == b'\n' {
                if tx.send(std::mem::take(&mut pending)).is_err() {
                    return;
                }
            } else {
                pending.push(byte);
            }
        }
    }
}

#[async_trait]
impl LinePort for SerialLinePort {
    async fn read_line(&mut self) -> RigResult<ReadOutcome> {
        match tokio::time::timeout(self.read_timeout, self.lines.recv()).await {
            Err(_) => Ok(ReadOutcome::Timeout),
            Ok(None) => Err(RigError::Transport {
                device: self.name.clone(),
                reason: "serial reader stopped".to_string(),
            }),
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(raw) => {
                    trace!(device = %self.name, line = %raw.trim(), "line received");
                    Ok(ReadOutcome::Line(raw.trim().to_string()))
                }
                Err(e) => Err(RigError::Garbled {
                    device: self.name.clone(),
                    reason: e.to_string(),
                }),
            },
        }
    }

    async fn write_line(&mut self, line: &str) -> RigResult<()> {
        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');

        let mut port = self.port.lock().await;
        port.write_all(&framed)
            .and_then(|_| port.flush())
            .map_err(|e| RigError::Transport {
                device: self.name.clone(),
                reason: e.to_string(),
            })?;
        trace!(device = %self.name, line = %line, "line sent");
        Ok(())
    }

    /// Stop the reader and wait for it so the port handle is released
    /// before a reopen of the same path
    async fn close(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            let _ = reader.await;
        }
    }
}

impl Drop for SerialLinePort {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_invalid_port_fails_gracefully() {
        let opener = SerialPortOpener;
        let settings = LinkSettings {
            name: "TX2".to_string(),
            port_id: "/dev/nonexistent-test-port".to_string(),
            baud_rate: 9600,
            read_timeout: Duration::from_secs(5),
        };

        let result = opener.open(&settings).await;
        assert!(matches!(result, Err(RigError::Connect { .. })));
    }
}
