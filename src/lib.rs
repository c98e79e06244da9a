//! RadRig Library
//!
//! Supervisory serial monitor for hardware test rigs providing
//! heartbeat-based liveness detection, automatic power-cycle recovery,
//! and single-keystroke operator control.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::cancel::CancelToken;
pub use crate::core::keys::{KeyInputSource, Keystroke};
pub use crate::core::link::{DeviceLink, LinkState};
pub use crate::core::monitor::SessionController;
pub use crate::core::protocol;
pub use crate::core::rig::Rig;
pub use crate::core::session::Session;
pub use crate::core::supervisor::{ConnectOutcome, ConnectionSupervisor};
pub use crate::core::transport::{LinePort, LinkSettings, PortOpener, ReadOutcome};
pub use crate::domain::config::{DeviceProfile, RigConfig};
pub use crate::domain::error::{RigError, RigResult};
