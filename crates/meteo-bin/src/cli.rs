//! Command-line surface. `run` exercises the render loop core; the
//! `service` subcommands manage the systemd unit and are out of scope for
//! this crate's implementation depth, but the CLI shape is preserved.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meteo-station", version, about = "E-paper meteo station dashboard")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the dashboard in the foreground.
    Run(RunArgs),
    /// Manage the systemd service lifecycle.
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Panel VCOM voltage, in millivolts (negative), printed on the panel's flex cable.
    #[arg(short = 'v', long)]
    pub vcom: i32,
    /// Disable the (out-of-scope) companion web UI.
    #[arg(short = 'n', long)]
    pub no_web_server: bool,
    /// Interface the web UI listens on.
    #[arg(short = 'i', long, default_value = "0.0.0.0")]
    pub interface: String,
    /// Port the web UI listens on.
    #[arg(short = 'p', long, default_value_t = 8080)]
    pub port: u16,
    /// Override the discovered configuration file path.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ServiceAction {
    Install,
    Start,
    Stop,
    IsRunning,
    IsInstalled,
}
