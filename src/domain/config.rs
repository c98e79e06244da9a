use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// RadRig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// The monitored compute module (heartbeat source, power-cycle target)
    pub monitored: DeviceProfile,
    /// The power-control microcontroller; absent in single-device logging
    /// setups, which also disables automatic recovery
    #[serde(default)]
    pub power: Option<DeviceProfile>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for session output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Delay between failed connection attempts in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Delay before each session restart in milliseconds
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,
    /// Capture the power controller's console output into a kernel log
    #[serde(default = "default_capture_diagnostics")]
    pub capture_diagnostics: bool,
}

/// Serial identity and timing for one device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Human label used in logs and prompts
    pub name: String,
    /// Serial port path or identifier
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Bounded line-read window in milliseconds; this is also the monitor
    /// loop's scheduling tick
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_retry_backoff() -> u64 {
    1000
}

fn default_restart_delay() -> u64 {
    1000
}

fn default_capture_diagnostics() -> bool {
    true
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout() -> u64 {
    5000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
            retry_backoff_ms: default_retry_backoff(),
            restart_delay_ms: default_restart_delay(),
            capture_diagnostics: default_capture_diagnostics(),
        }
    }
}

impl DeviceProfile {
    /// Profile for a monitored compute module on the given port
    pub fn monitored(port: impl Into<String>) -> Self {
        Self {
            name: "TX2".to_string(),
            port: port.into(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout(),
        }
    }

    /// Profile for a power controller on the given port; the shorter read
    /// timeout keeps the diagnostic read from dominating the loop tick
    pub fn power(port: impl Into<String>) -> Self {
        Self {
            name: "Arduino".to_string(),
            port: port.into(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: 1000,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl RigConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.global.retry_backoff_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.global.restart_delay_ms)
    }

    /// Example configuration written by `radrig config init`
    pub fn example() -> Self {
        Self {
            global: GlobalConfig::default(),
            monitored: DeviceProfile::monitored("/dev/ttyUSB0"),
            power: Some(DeviceProfile::power("/dev/ttyUSB1")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = RigConfig::example();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: RigConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(deserialized.monitored.name, "TX2");
        assert_eq!(deserialized.monitored.baud_rate, 9600);
        assert_eq!(deserialized.power.unwrap().read_timeout_ms, 1000);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let toml_str = r#"
            [monitored]
            name = "TX2"
            port = "/dev/ttyUSB0"
        "#;
        let config: RigConfig = toml::from_str(toml_str).unwrap();

        assert!(config.power.is_none());
        assert_eq!(config.global.retry_backoff_ms, 1000);
        assert_eq!(config.global.output_dir, PathBuf::from("output"));
        assert_eq!(config.monitored.read_timeout_ms, 5000);
        assert!(config.global.capture_diagnostics);
    }

    #[test]
    fn test_device_profile_timeouts() {
        let monitored = DeviceProfile::monitored("COM7");
        let power = DeviceProfile::power("COM8");

        assert_eq!(monitored.read_timeout(), Duration::from_secs(5));
        assert_eq!(power.read_timeout(), Duration::from_secs(1));
    }
}
