//! Weekly aggregation driven through an in-memory match history.

use agentstats::aggregator::{AgentAggregator, AggregatorSettings, WindowZone};
use agentstats::coordination::ShutdownListener;
use agentstats::domain::{
    GameMode, MatchPage, MatchRecord, PlayerIdentity, PlayerMatchStats, TeamResult,
};
use agentstats::error::{Result, StatsError};
use agentstats::source::MatchSource;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Serves pre-built pages; anything past the end is an empty page
struct FrozenHistory {
    pages: Vec<MatchPage>,
    fail_on: Option<u32>,
    calls: AtomicU32,
}

impl FrozenHistory {
    fn new(pages: Vec<MatchPage>) -> Self {
        Self {
            pages,
            fail_on: None,
            calls: AtomicU32::new(0),
        }
    }

    fn failing_on(mut self, page: u32) -> Self {
        self.fail_on = Some(page);
        self
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchSource for FrozenHistory {
    async fn fetch_page(
        &self,
        player: &PlayerIdentity,
        page: u32,
        _page_size: u32,
    ) -> Result<MatchPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(page) {
            return Err(StatsError::source_unavailable(player, "HTTP 503"));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

fn player() -> PlayerIdentity {
    PlayerIdentity::new("master", "bsu")
}

fn thursday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 16, 12, 0, 0).unwrap()
}

fn utc_aggregator() -> AgentAggregator {
    AgentAggregator::new(AggregatorSettings {
        zone: FixedOffset::east_opt(0).unwrap().into(),
        ..AggregatorSettings::default()
    })
}

struct Game {
    at: DateTime<Utc>,
    mode: GameMode,
    agent: &'static str,
    score: i64,
    rounds: u32,
    kills: u32,
    deaths: u32,
    won: bool,
}

impl Game {
    fn competitive(at: DateTime<Utc>, agent: &'static str) -> Self {
        Self {
            at,
            mode: GameMode::Competitive,
            agent,
            score: 5000,
            rounds: 20,
            kills: 15,
            deaths: 15,
            won: true,
        }
    }

    fn custom(at: DateTime<Utc>, agent: &'static str) -> Self {
        Self {
            mode: GameMode::Custom,
            ..Self::competitive(at, agent)
        }
    }

    fn record(self) -> MatchRecord {
        let mut team_results = HashMap::new();
        team_results.insert("blue".to_string(), TeamResult { has_won: self.won });
        team_results.insert("red".to_string(), TeamResult { has_won: !self.won });
        MatchRecord {
            start_timestamp: self.at.timestamp(),
            mode: self.mode,
            rounds_played: self.rounds,
            players: vec![
                PlayerMatchStats {
                    name: "Master".to_string(),
                    tag: "BSU".to_string(),
                    agent: self.agent.to_string(),
                    score: self.score,
                    kills: self.kills,
                    deaths: self.deaths,
                    team_side: "Blue".to_string(),
                },
                PlayerMatchStats {
                    name: "someone".to_string(),
                    tag: "else".to_string(),
                    agent: "Brimstone".to_string(),
                    score: 1000,
                    kills: 1,
                    deaths: 20,
                    team_side: "Red".to_string(),
                },
            ],
            team_results,
        }
    }
}

fn page(number: u32, games: Vec<Game>) -> MatchPage {
    MatchPage::from_records(number, games.into_iter().map(Game::record).collect())
}

fn aggregate(aggregator: &AgentAggregator, pages: &[MatchPage]) -> agentstats::AggregationResult {
    aggregator.aggregate_pages(&player(), aggregator.cutoff(thursday_noon()), pages)
}

#[test]
fn test_competitive_window_boundary() {
    let aggregator = utc_aggregator();
    let cutoff = aggregator.cutoff(thursday_noon());
    assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap());

    let pages = [page(
        1,
        vec![
            Game::competitive(cutoff, "Jett"),
            Game::competitive(cutoff - chrono::Duration::seconds(1), "Omen"),
        ],
    )];
    let result = aggregate(&aggregator, &pages);

    assert_eq!(result.len(), 1);
    assert_eq!(result["Jett"].games, 1);
    assert!(!result.contains_key("Omen"));
}

#[test]
fn test_custom_games_only_on_friday_and_saturday() {
    let aggregator = utc_aggregator();
    let friday = Utc.with_ymd_and_hms(2024, 4, 26, 20, 0, 0).unwrap();
    let saturday = Utc.with_ymd_and_hms(2024, 4, 27, 20, 0, 0).unwrap();
    let sunday = Utc.with_ymd_and_hms(2024, 4, 28, 20, 0, 0).unwrap();
    let recent_wednesday = Utc.with_ymd_and_hms(2024, 5, 15, 20, 0, 0).unwrap();

    let pages = [page(
        1,
        vec![
            Game::custom(friday, "Killjoy"),
            Game::custom(saturday, "Killjoy"),
            Game::custom(sunday, "Cypher"),
            Game::custom(recent_wednesday, "Cypher"),
        ],
    )];
    let result = aggregate(&aggregator, &pages);

    assert_eq!(result["Killjoy"].games, 2);
    assert!(!result.contains_key("Cypher"));
}

#[test]
fn test_custom_game_weekday_follows_zone() {
    let plus_two = AgentAggregator::new(AggregatorSettings {
        zone: FixedOffset::east_opt(2 * 3600).unwrap().into(),
        ..AggregatorSettings::default()
    });
    // Saturday 23:30 UTC is already Sunday at +02:00
    let late_saturday = Utc.with_ymd_and_hms(2024, 4, 27, 23, 30, 0).unwrap();
    let pages = [page(1, vec![Game::custom(late_saturday, "Sage")])];

    assert_eq!(aggregate(&utc_aggregator(), &pages)["Sage"].games, 1);
    assert!(aggregate(&plus_two, &pages).is_empty());
}

#[test]
fn test_named_zone_follows_dst_for_old_custom_games() {
    let chicago = AgentAggregator::new(AggregatorSettings {
        zone: WindowZone::Named(chrono_tz::America::Chicago),
        ..AggregatorSettings::default()
    });
    // Offset pinned while the host was on CDT
    let pinned_summer = AgentAggregator::new(AggregatorSettings {
        zone: FixedOffset::west_opt(5 * 3600).unwrap().into(),
        ..AggregatorSettings::default()
    });
    // Saturday 2024-01-13 23:30 CST
    let late_saturday = Utc.with_ymd_and_hms(2024, 1, 14, 5, 30, 0).unwrap();
    let pages = [page(1, vec![Game::custom(late_saturday, "Viper")])];
    let july = Utc.with_ymd_and_hms(2024, 7, 18, 17, 0, 0).unwrap();

    let result = chicago.aggregate_pages(&player(), chicago.cutoff(july), &pages);
    assert_eq!(result["Viper"].games, 1);

    let result = pinned_summer.aggregate_pages(&player(), pinned_summer.cutoff(july), &pages);
    assert!(result.is_empty());
}

#[test]
fn test_zero_deaths_counts_kills() {
    let aggregator = utc_aggregator();
    let pages = [page(
        1,
        vec![Game {
            kills: 10,
            deaths: 0,
            ..Game::competitive(thursday_noon(), "Reyna")
        }],
    )];
    assert_eq!(aggregate(&aggregator, &pages)["Reyna"].avg_kd, 10.0);
}

#[test]
fn test_combat_score_is_per_round() {
    let aggregator = utc_aggregator();
    let pages = [page(
        1,
        vec![Game {
            score: 140,
            rounds: 7,
            ..Game::competitive(thursday_noon(), "Sova")
        }],
    )];
    assert_eq!(aggregate(&aggregator, &pages)["Sova"].avg_acs, 20.0);
}

#[test]
fn test_win_rate_is_a_percentage() {
    let aggregator = utc_aggregator();
    let at = thursday_noon();
    let pages = [page(
        1,
        vec![
            Game::competitive(at, "Jett"),
            Game {
                won: false,
                ..Game::competitive(at, "Jett")
            },
            Game {
                won: false,
                ..Game::competitive(at, "Jett")
            },
        ],
    )];
    let jett = &aggregate(&aggregator, &pages)["Jett"];

    assert_eq!(jett.games, 3);
    assert!((jett.win_rate - 100.0 / 3.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&jett.win_rate));
}

#[test]
fn test_agent_only_in_excluded_matches_is_absent() {
    let aggregator = utc_aggregator();
    let old_tuesday = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
    let pages = [page(
        1,
        vec![
            Game::competitive(old_tuesday, "Astra"),
            Game {
                mode: GameMode::Other("unrated".to_string()),
                ..Game::competitive(thursday_noon(), "Harbor")
            },
        ],
    )];
    assert!(aggregate(&aggregator, &pages).is_empty());
}

#[tokio::test]
async fn test_empty_history_is_empty_result() {
    let aggregator = utc_aggregator();
    let source = FrozenHistory::new(Vec::new());

    let result = aggregator
        .aggregate_agent_stats(
            &source,
            &player(),
            aggregator.cutoff(thursday_noon()),
            &ShutdownListener::detached(),
        )
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_page_loop_stops_after_short_page() {
    let aggregator = utc_aggregator();
    let full = page(1, (0..70).map(|_| Game::competitive(thursday_noon(), "Jett")).collect());
    let short = page(2, (0..3).map(|_| Game::competitive(thursday_noon(), "Omen")).collect());
    let source = FrozenHistory::new(vec![full, short]);

    let result = aggregator
        .aggregate_agent_stats(
            &source,
            &player(),
            aggregator.cutoff(thursday_noon()),
            &ShutdownListener::detached(),
        )
        .await
        .unwrap();

    assert_eq!(source.calls(), 2);
    assert_eq!(result["Jett"].games, 70);
    assert_eq!(result["Omen"].games, 3);
}

#[tokio::test]
async fn test_page_failure_propagates() {
    let aggregator = utc_aggregator();
    let full = page(1, (0..70).map(|_| Game::competitive(thursday_noon(), "Jett")).collect());
    let source = FrozenHistory::new(vec![full.clone(), full]).failing_on(2);

    let result = aggregator
        .aggregate_agent_stats(
            &source,
            &player(),
            aggregator.cutoff(thursday_noon()),
            &ShutdownListener::detached(),
        )
        .await;

    assert!(matches!(result, Err(StatsError::SourceUnavailable { .. })));
    assert_eq!(source.calls(), 2);
}

#[test]
fn test_same_pages_same_result() {
    let aggregator = utc_aggregator();
    let at = thursday_noon();
    let pages = [
        page(1, vec![Game::competitive(at, "Jett"), Game::competitive(at, "Sova")]),
        page(
            2,
            vec![Game {
                won: false,
                kills: 3,
                ..Game::competitive(at, "Jett")
            }],
        ),
    ];

    assert_eq!(aggregate(&aggregator, &pages), aggregate(&aggregator, &pages));
}
