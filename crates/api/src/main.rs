use clap::Parser;

use user_service_api::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    user_service_observability::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Start(args) => user_service_api::server::start(args).await,
    }
}
