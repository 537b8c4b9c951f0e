use agentstats::cli::{Cli, Commands, PlayersCommands};
use agentstats::config::AppConfig;
use agentstats::error::Result;
use clap::Parser;

mod main_modes;
mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    match &cli.command {
        Commands::Run { no_post } => {
            main_runtime::init_logging(&config.logging);
            main_modes::run_report_mode(&config, !*no_post).await?;
        }
        Commands::Serve { port } => {
            main_runtime::init_logging(&config.logging);
            let port = port.unwrap_or(config.server.port);
            main_modes::run_serve_mode(&config, port).await?;
        }
        Commands::Replay { snapshot } => {
            main_runtime::init_logging(&config.logging);
            main_modes::run_replay_mode(&config, snapshot.as_deref()).await?;
        }
        Commands::Players(PlayersCommands::List { json }) => {
            main_runtime::init_logging_simple();
            main_modes::run_players_list(&config, *json).await?;
        }
        Commands::Players(PlayersCommands::Add { name, tag }) => {
            main_runtime::init_logging_simple();
            main_modes::run_players_add(&config, name, tag).await?;
        }
        Commands::Agents { player, json } => {
            main_runtime::init_logging_simple();
            main_modes::run_agents_mode(&config, player, *json).await?;
        }
    }

    Ok(())
}
