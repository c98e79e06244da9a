// RadRig - Supervisory Serial Monitor for Hardware Test Rigs
use clap::Parser;
use radrig::cli::args::Args;
use radrig::cli::commands::execute_command;
use radrig::domain::error::RigError;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match execute_command(args).await {
        Ok(()) => {}
        Err(RigError::Cancelled) => {
            println!("Exiting...");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
