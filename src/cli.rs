use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;

use crate::{config::Config, device, error::Error};

/// The command line interface for the CNC loopback simulator.
///
/// Lines read from stdin are sent to the simulator as commands,
/// and its responses are written to stdout.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration string, for example `loopback://grbl`.
    /// Overrides the one from a configuration file.
    pub uri: Option<String>,

    /// Emulated latency per command in milliseconds.
    /// Overrides the one from a configuration file.
    #[arg(long, allow_negative_numbers = true)]
    pub delay: Option<i64>,

    /// Path to a configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// How long to keep answering after stdin ends, in milliseconds.
    /// Commands still queued after this are dropped.
    #[arg(long, default_value_t = 500)]
    pub linger: u64,

    /// Also log to a daily rotated file in this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Commands available in the command line interface.
#[derive(Subcommand)]
pub enum Commands {
    /// List the simulated devices.
    Devices,

    /// Examples for user convenience.
    #[command(subcommand)]
    Examples(Examples),
}

/// Helpful examples for users.
#[derive(Subcommand, Clone)]
pub enum Examples {
    /// Show an example of a configuration file's contents.
    Config,
}

/// Print whatever the command asks for.
pub fn handle_command(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Devices => {
            println!("{}", device::list_devices().iter().join("\n"));
        }
        Commands::Examples(Examples::Config) => {
            println!("{}", Config::example().serialize_pretty()?);
        }
    }

    Ok(())
}
