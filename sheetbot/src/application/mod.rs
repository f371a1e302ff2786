pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use sheetbot_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    let chat = cli.chat;
    match cli.command {
        Commands::Daily { date } => handlers::handle_daily(config, chat, date).await,
        Commands::Period { range, preset } => {
            handlers::handle_period(config, chat, range, preset).await
        }
        Commands::Project { tag, range } => {
            handlers::handle_project(config, chat, tag, range).await
        }
        Commands::Secondary { date } => handlers::handle_secondary(config, chat, date).await,
        Commands::Projects => handlers::handle_projects(config, chat).await,
        Commands::TestDelivery => handlers::handle_test_delivery(config, chat).await,
        Commands::Serve => handlers::handle_serve(config, chat).await,
    }
}
