//! The fixed line-oriented message set exchanged with the rig.
//!
//! Incoming tokens are compared after trimming so the monitor is agnostic
//! to the device's newline convention (`\r\n` vs `\n` vs `\r`). Outgoing
//! tokens are newline-terminated by the transport's `write_line`.

/// Liveness marker emitted periodically by the monitored device
pub const HEARTBEAT: &str = "HEARTBEAT";
/// Alias for the liveness marker used by older device firmware
pub const START: &str = "START";
/// Request a power cycle of the monitored device
pub const POWER_CYCLE: &str = "POWER_CYCLE";
/// Request power-on without a cycle
pub const POWER_ON: &str = "POWER_ON";
/// Test-specific command signal for the monitored device
pub const RAD: &str = "RAD";

/// Classification of one received line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Nothing usable: a timed-out read or a blank line on the wire
    Silence,
    /// The liveness marker
    Marker,
    /// Ordinary protocol/log output, already trimmed
    Payload(String),
}

/// Classify one received line after trimming surrounding whitespace
pub fn classify(raw: &str) -> Inbound {
    let line = raw.trim();
    if line.is_empty() {
        Inbound::Silence
    } else if line == HEARTBEAT || line == START {
        Inbound::Marker
    } else {
        Inbound::Payload(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_requires_exact_match() {
        assert_eq!(classify("HEARTBEAT"), Inbound::Marker);
        assert_eq!(classify("START"), Inbound::Marker);
        assert_eq!(
            classify("HEARTBEATS"),
            Inbound::Payload("HEARTBEATS".to_string())
        );
        assert_eq!(
            classify("heartbeat"),
            Inbound::Payload("heartbeat".to_string())
        );
    }

    #[test]
    fn test_newline_conventions_are_trimmed() {
        assert_eq!(classify("HEARTBEAT\r\n"), Inbound::Marker);
        assert_eq!(classify("HEARTBEAT\r"), Inbound::Marker);
        assert_eq!(classify("  HEARTBEAT  "), Inbound::Marker);
    }

    #[test]
    fn test_blank_lines_are_silence() {
        assert_eq!(classify(""), Inbound::Silence);
        assert_eq!(classify("\r\n"), Inbound::Silence);
        assert_eq!(classify("   "), Inbound::Silence);
    }

    #[test]
    fn test_payload_is_trimmed_verbatim() {
        assert_eq!(
            classify("kernel: boot ok\r\n"),
            Inbound::Payload("kernel: boot ok".to_string())
        );
    }
}
