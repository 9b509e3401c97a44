//! Command-line interface of the `user-service` binary.

use std::path::PathBuf;

use clap::Parser;

use user_service_core::{SERVICE_NAME, VERSION};
use user_service_infra::config::DEFAULT_CONFIG_PATH;

/// Users API service.
#[derive(Parser, Debug)]
#[command(name = SERVICE_NAME, version = VERSION, about = "Users API service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Start the service over HTTP.
    Start(StartArgs),
}

/// Arguments for the `start` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct StartArgs {
    /// Host to listen on (overrides APIContext.Host).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides APIContext.Port).
    #[arg(long)]
    pub port: Option<String>,

    /// Path to the JSON configuration file.
    #[arg(long, env = "USER_SERVICE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
