use thiserror::Error;

/// RadRig unified error type
///
/// Transport-level failures are split into distinct kinds because each one
/// has a different recovery path: `Connect` is retried with backoff,
/// `Transport` tears the session down for a full restart, `Garbled` is
/// logged and survived, and `Cancelled` unwinds every loop.
#[derive(Error, Debug)]
pub enum RigError {
    #[error("unable to connect to {device} at {port}: {reason}")]
    Connect {
        device: String,
        port: String,
        reason: String,
    },

    #[error("transport failure on {device}: {reason}")]
    Transport { device: String, reason: String },

    #[error("unreadable data from {device}: {reason}")]
    Garbled { device: String, reason: String },

    #[error("{device} is not connected")]
    NotConnected { device: String },

    #[error("cancelled by operator")]
    Cancelled,

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("output file error: {0}")]
    Output(#[from] std::io::Error),
}

impl RigError {
    /// True for errors the process supervisor recovers from by tearing the
    /// session down and reconnecting. `Cancelled` is excluded: it always
    /// wins and unwinds the process.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RigError::Cancelled)
    }
}

pub type RigResult<T> = Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RigError::Connect {
            device: "TX2".to_string(),
            port: "/dev/ttyUSB0".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(error.to_string().contains("TX2"));
        assert!(error.to_string().contains("/dev/ttyUSB0"));

        let error = RigError::NotConnected {
            device: "Arduino".to_string(),
        };
        assert_eq!(error.to_string(), "Arduino is not connected");
    }

    #[test]
    fn test_cancellation_is_not_recoverable() {
        assert!(!RigError::Cancelled.is_recoverable());
        assert!(RigError::Transport {
            device: "TX2".to_string(),
            reason: "read failed".to_string(),
        }
        .is_recoverable());
    }
}
