//! agentstats CLI
//!
//! Commands:
//! - `agentstats run` - one report pass over the roster
//! - `agentstats serve` - HTTP API for the roster and on-demand passes
//! - `agentstats replay` - re-post the last snapshot
//! - `agentstats players` - roster management
//! - `agentstats agents` - aggregate a single player

pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agentstats")]
#[command(author, version, about = "Weekly per-agent Valorant stats collector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, {AGENTSTATS_ENV}.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the weekly report for every roster player
    Run {
        /// Write the snapshot only, do not post to the webhook
        #[arg(long)]
        no_post: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: from config, usually 5000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Post a previously written snapshot to the webhook
    Replay {
        /// Snapshot file (default: report.snapshot_path)
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Roster management
    #[command(subcommand)]
    Players(PlayersCommands),

    /// Aggregate one player's week and print it
    Agents {
        /// Riot ID, e.g. master#bsu
        player: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlayersCommands {
    /// List roster entries
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add or update a roster entry
    Add {
        name: String,
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_no_post() {
        let cli = Cli::try_parse_from(["agentstats", "run", "--no-post"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { no_post: true }));
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_parse_players_add_with_config() {
        let cli = Cli::try_parse_from([
            "agentstats",
            "players",
            "add",
            "master",
            "bsu",
            "--config",
            "/etc/agentstats",
        ])
        .unwrap();
        assert_eq!(cli.config, "/etc/agentstats");
        match cli.command {
            Commands::Players(PlayersCommands::Add { name, tag }) => {
                assert_eq!(name, "master");
                assert_eq!(tag, "bsu");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_agents() {
        let cli = Cli::try_parse_from(["agentstats", "agents", "Skelesis#folk", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Agents { json: true, .. }));
    }
}
