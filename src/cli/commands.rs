use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, RunArgs};
use crate::core::cancel::CancelToken;
use crate::core::keys::KeyInputSource;
use crate::core::rig::Rig;
use crate::core::transport::PortOpener;
use crate::domain::config::{DeviceProfile, RigConfig};
use crate::domain::error::{RigError, RigResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::console;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::SerialPortOpener;
use crate::infrastructure::terminal::RawModeGuard;
use std::path::Path;
use std::sync::Arc;

/// Execute CLI command
pub async fn execute_command(args: Args) -> RigResult<()> {
    match args.command {
        Command::Run(run_args) => {
            run_monitor(args.config.as_deref(), run_args, args.verbose, args.quiet).await
        }
        Command::Ports => list_ports(),
        Command::Config(config_args) => execute_config_command(args.config.as_deref(), config_args),
        Command::Version => {
            console::message(&format!("radrig {}", env!("CARGO_PKG_VERSION")));
            Ok(())
        }
    }
}

/// Merge the configuration file (if any) with command-line overrides
fn resolve_config(explicit: Option<&Path>, run_args: &RunArgs) -> RigResult<RigConfig> {
    let manager = ConfigManager::new()?;

    let mut config = match manager.load(explicit)? {
        Some(config) => config,
        None => {
            let port = run_args
                .monitored_port
                .clone()
                .ok_or_else(|| RigError::Config {
                    message: "monitored device port required (--monitored-port or a config file)"
                        .to_string(),
                })?;
            RigConfig {
                global: Default::default(),
                monitored: DeviceProfile::monitored(port),
                power: None,
            }
        }
    };

    if let Some(port) = &run_args.monitored_port {
        config.monitored.port = port.clone();
    }
    if let Some(port) = &run_args.power_port {
        match config.power.as_mut() {
            Some(power) => power.port = port.clone(),
            None => config.power = Some(DeviceProfile::power(port.clone())),
        }
    }
    if let Some(baud) = run_args.baud {
        config.monitored.baud_rate = baud;
        if let Some(power) = config.power.as_mut() {
            power.baud_rate = baud;
        }
    }
    if let Some(dir) = &run_args.output_dir {
        config.global.output_dir = dir.clone();
    }
    if run_args.no_kernel_log {
        config.global.capture_diagnostics = false;
    }

    Ok(config)
}

async fn run_monitor(
    explicit: Option<&Path>,
    run_args: RunArgs,
    verbose: bool,
    quiet: bool,
) -> RigResult<()> {
    let config = resolve_config(explicit, &run_args)?;
    if !quiet {
        init_logging(&config.global.log_level, verbose)?;
    }

    let cancel = CancelToken::new();
    let mut terminal = RawModeGuard::enter()?;
    let keys = KeyInputSource::spawn(cancel.clone());
    let opener: Arc<dyn PortOpener> = Arc::new(SerialPortOpener);

    let result = match Rig::new(config, opener, keys, cancel) {
        Ok(mut rig) => {
            let result = rig.run().await;
            rig.shutdown();
            result
        }
        Err(e) => Err(e),
    };

    terminal.restore();
    result
}

fn list_ports() -> RigResult<()> {
    let ports = serialport::available_ports()?;

    if ports.is_empty() {
        console::message("No serial ports found");
        return Ok(());
    }

    console::message("Available serial ports:");
    for port in ports {
        console::message(&format!("  {}", port.port_name));
    }
    Ok(())
}

fn execute_config_command(explicit: Option<&Path>, args: ConfigArgs) -> RigResult<()> {
    let manager = ConfigManager::new()?;

    match args.command {
        ConfigCommand::Init { output } => {
            let path = manager.init(output)?;
            console::message(&format!(
                "Wrote starter configuration to {}",
                path.display()
            ));
            Ok(())
        }
        ConfigCommand::Show => match manager.load(explicit)? {
            Some(config) => {
                let rendered = toml::to_string_pretty(&config).map_err(|e| RigError::Config {
                    message: format!("failed to render config: {}", e),
                })?;
                for line in rendered.lines() {
                    console::message(line);
                }
                Ok(())
            }
            None => {
                console::message(&format!(
                    "No configuration found (looked in {})",
                    manager.global_path().display()
                ));
                Ok(())
            }
        },
    }
}
