use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments for RadRig
#[derive(Parser, Debug)]
#[command(
    name = "radrig",
    version = env!("CARGO_PKG_VERSION"),
    about = "Supervisory serial monitor for hardware test rigs",
    long_about = "Watches an embedded device over a serial link, detects liveness failures from its heartbeat marker, and power-cycles it through a second serial-attached power controller, unattended for hours to days."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress diagnostic logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the monitor
    Run(RunArgs),
    /// List available serial ports
    Ports,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Monitor run arguments; each flag overrides the configuration file
#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Serial port of the monitored device
    #[arg(short = 'm', long)]
    pub monitored_port: Option<String>,

    /// Serial port of the power controller; omit for log-only mode with
    /// no automatic recovery
    #[arg(short = 'p', long)]
    pub power_port: Option<String>,

    /// Baud rate for both links
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Directory for session output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not capture the power controller's console output
    #[arg(long)]
    pub no_kernel_log: bool,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Create a starter configuration
    Init {
        /// Destination path (defaults to the global config location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the loaded configuration
    Show,
}
