use crate::domain::error::RigResult;
use async_trait::async_trait;
use std::time::Duration;

/// Identity and timing for one logical serial connection
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Human label used in logs and prompts
    pub name: String,
    /// Transport address (serial port path)
    pub port_id: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Bounded window for a single line read
    pub read_timeout: Duration,
}

/// Result of one bounded line read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, trimmed of the trailing newline/CR and surrounding
    /// whitespace; may be empty when the wire carried a blank line
    Line(String),
    /// The read window elapsed with no complete line
    Timeout,
}

/// One open line-oriented connection to a device.
///
/// Implementations own their I/O exclusively; the monitor loop is the only
/// caller for the connected lifetime of a link.
#[async_trait]
pub trait LinePort: Send {
    /// Read one line, waiting at most the configured read timeout.
    ///
    /// Errors are kind-tagged: `Transport` means the link is dead and the
    /// session must restart, `Garbled` means one unreadable line that the
    /// caller may log and survive.
    async fn read_line(&mut self) -> RigResult<ReadOutcome>;

    /// Write one line; the implementation appends the newline terminator.
    async fn write_line(&mut self, line: &str) -> RigResult<()>;

    /// Release the underlying handle. Never fails; called once before drop
    /// so the port is free for an immediate reopen.
    async fn close(&mut self) {}
}

/// Factory for opening line-oriented connections
#[async_trait]
pub trait PortOpener: Send + Sync {
    async fn open(&self, settings: &LinkSettings) -> RigResult<Box<dyn LinePort>>;
}
