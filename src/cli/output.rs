//! Output formatting for one-shot commands.
//!
//! Human-readable tables by default, JSON with `--json`.

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::domain::{AggregationResult, PlayerIdentity};
use crate::persistence::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// One agent line of a player's week
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AgentRow {
    #[tabled(rename = "Agent")]
    pub agent: String,
    #[tabled(rename = "Games")]
    pub games: u32,
    #[tabled(rename = "ACS")]
    pub avg_acs: String,
    #[tabled(rename = "K/D")]
    pub avg_kd: String,
    #[tabled(rename = "Win %")]
    pub win_rate: String,
}

impl AgentRow {
    /// Rows sorted by games played, most first
    pub fn from_result(result: &AggregationResult) -> Vec<Self> {
        let mut rows: Vec<Self> = result
            .iter()
            .map(|(agent, stats)| Self {
                agent: agent.clone(),
                games: stats.games,
                avg_acs: format!("{:.1}", stats.avg_acs),
                avg_kd: format!("{:.2}", stats.avg_kd),
                win_rate: format!("{:.1}", stats.win_rate),
            })
            .collect();
        rows.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.agent.cmp(&b.agent)));
        rows
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PlayerRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Tag")]
    pub tag: String,
}

impl PlayerRow {
    pub fn from_roster(roster: &Roster) -> Vec<Self> {
        roster
            .players()
            .into_iter()
            .map(|PlayerIdentity { name, tag }| Self { name, tag })
            .collect()
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("\x1b[32m✓ {msg}\x1b[0m");
}

pub fn print_warn(msg: &str) {
    println!("\x1b[33m! {msg}\x1b[0m");
}
