use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::pager::MatchPager;
use super::policy::{ZeroDeathsPolicy, ZeroRoundsPolicy};
use super::window::WindowZone;
use crate::config::AggregationConfig;
use crate::coordination::ShutdownListener;
use crate::domain::{
    AgentTally, AggregationResult, GameMode, MatchPage, MatchRecord, PlayerIdentity,
};
use crate::error::{Result, StatsError};
use crate::source::MatchSource;

/// Knobs for one aggregation pass
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub page_size: u32,
    pub window_days: u32,
    pub max_pages: Option<u32>,
    /// Zone for midnight truncation and custom-game weekdays
    pub zone: WindowZone,
    pub zero_rounds: ZeroRoundsPolicy,
    pub zero_deaths: ZeroDeathsPolicy,
}

impl AggregatorSettings {
    pub fn from_config(config: &AggregationConfig, zone: WindowZone) -> Self {
        Self {
            page_size: config.page_size,
            window_days: config.window_days,
            max_pages: config.max_pages,
            zone,
            zero_rounds: config.zero_rounds,
            zero_deaths: config.zero_deaths,
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from_config(&AggregationConfig::default(), WindowZone::default())
    }
}

/// Per-agent weekly aggregation over a player's match history
#[derive(Debug, Clone, Default)]
pub struct AgentAggregator {
    settings: AggregatorSettings,
}

impl AgentAggregator {
    pub fn new(settings: AggregatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Start of the competitive window relative to `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.settings.zone.cutoff(now, self.settings.window_days)
    }

    /// Competitive games inside the window, plus custom games played on a
    /// Friday or Saturday no matter how old.
    pub fn is_included(&self, record: &MatchRecord, cutoff: DateTime<Utc>) -> bool {
        match record.mode {
            GameMode::Competitive => record.start_timestamp >= cutoff.timestamp(),
            GameMode::Custom => self.settings.zone.is_custom_game_day(record.start_timestamp),
            GameMode::Other(_) => false,
        }
    }

    /// Fetch the player's history page by page and aggregate it.
    ///
    /// A fetch failure on any page aborts the whole call. Shutdown is checked
    /// before every page request.
    pub async fn aggregate_agent_stats(
        &self,
        source: &dyn MatchSource,
        player: &PlayerIdentity,
        cutoff: DateTime<Utc>,
        shutdown: &ShutdownListener,
    ) -> Result<AggregationResult> {
        let mut pager = MatchPager::new(
            source,
            player,
            self.settings.page_size,
            self.settings.max_pages,
        );
        let mut accumulator = Accumulator::new(self, player, cutoff);

        loop {
            if shutdown.is_shutdown() {
                info!("Shutdown requested, abandoning match history for {}", player);
                return Err(StatsError::Cancelled);
            }
            match pager.next_page().await? {
                Some(page) => accumulator.absorb(&page),
                None => break,
            }
        }

        let result = accumulator.finish();
        info!(
            "Aggregated {} agent(s) for {} over {} page(s)",
            result.len(),
            player,
            pager.pages_fetched()
        );
        Ok(result)
    }

    /// Aggregate already-fetched pages. Pure: same pages, same cutoff, same
    /// settings give the same result.
    pub fn aggregate_pages<'p, I>(
        &self,
        player: &PlayerIdentity,
        cutoff: DateTime<Utc>,
        pages: I,
    ) -> AggregationResult
    where
        I: IntoIterator<Item = &'p MatchPage>,
    {
        let mut accumulator = Accumulator::new(self, player, cutoff);
        for page in pages {
            accumulator.absorb(page);
        }
        accumulator.finish()
    }
}

/// Running tallies for one player's pass. Never outlives the call that made it.
struct Accumulator<'a> {
    aggregator: &'a AgentAggregator,
    player: &'a PlayerIdentity,
    cutoff: DateTime<Utc>,
    tallies: HashMap<String, AgentTally>,
}

impl<'a> Accumulator<'a> {
    fn new(
        aggregator: &'a AgentAggregator,
        player: &'a PlayerIdentity,
        cutoff: DateTime<Utc>,
    ) -> Self {
        Self {
            aggregator,
            player,
            cutoff,
            tallies: HashMap::new(),
        }
    }

    fn absorb(&mut self, page: &MatchPage) {
        for (index, entry) in page.entries.iter().enumerate() {
            match entry {
                Ok(record) => {
                    if let Err(e) = self.absorb_match(page.number, index, record) {
                        warn!("Skipping match: {}", e);
                    }
                }
                Err(malformed) => {
                    let e = StatsError::MalformedRecord {
                        player: self.player.to_string(),
                        page: page.number,
                        index: malformed.index,
                        reason: malformed.reason.clone(),
                    };
                    warn!("Skipping match: {}", e);
                }
            }
        }
    }

    fn absorb_match(&mut self, page: u32, index: usize, record: &MatchRecord) -> Result<()> {
        if !self.aggregator.is_included(record, self.cutoff) {
            return Ok(());
        }

        let Some(stats) = record
            .players
            .iter()
            .find(|p| self.player.matches(&p.name, &p.tag))
        else {
            debug!(
                "{} not on the scoreboard of page {} entry {}, skipping",
                self.player, page, index
            );
            return Ok(());
        };

        let settings = &self.aggregator.settings;
        let acs = settings
            .zero_rounds
            .combat_score_rate(stats.score, record.rounds_played)
            .ok_or_else(|| StatsError::MalformedRecord {
                player: self.player.to_string(),
                page,
                index,
                reason: "match reports zero rounds played".to_string(),
            })?;
        if record.rounds_played == 0 {
            warn!(
                "Match on page {} entry {} for {} reports zero rounds; counting ACS as 0",
                page, index, self.player
            );
        }
        let kd = settings
            .zero_deaths
            .kill_death_ratio(stats.kills, stats.deaths);
        let won = record.side_won(&stats.team_side);

        self.tallies
            .entry(stats.agent.clone())
            .or_default()
            .record(acs, kd, won);
        Ok(())
    }

    fn finish(self) -> AggregationResult {
        self.tallies
            .into_iter()
            .filter_map(|(agent, tally)| tally.finalize().map(|stats| (agent, stats)))
            .collect()
    }
}
