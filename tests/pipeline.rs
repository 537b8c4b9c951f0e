//! Report passes over a small roster with fake upstreams and sinks.

use agentstats::adapters::{DeliveryOutcome, ReportSink};
use agentstats::aggregator::{AgentAggregator, AggregatorSettings};
use agentstats::domain::{
    GameMode, MatchPage, MatchRecord, PlayerIdentity, PlayerMatchStats, PlayerReport,
    RankSnapshot, TeamResult,
};
use agentstats::error::{Result, StatsError};
use agentstats::persistence::{RosterFile, SnapshotStore};
use agentstats::services::{DeliveryStatus, ReportPipeline};
use agentstats::source::{MatchSource, RankSource};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn thursday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 16, 12, 0, 0).unwrap()
}

/// Every known player has one recent competitive Jett win; others 404
struct FakeHenrik {
    known: Vec<&'static str>,
}

impl FakeHenrik {
    fn knows(&self, player: &PlayerIdentity) -> bool {
        self.known.iter().any(|n| n.eq_ignore_ascii_case(&player.name))
    }
}

#[async_trait]
impl RankSource for FakeHenrik {
    async fn fetch_rank(&self, player: &PlayerIdentity) -> Result<RankSnapshot> {
        if !self.knows(player) {
            return Err(StatsError::source_unavailable(
                player,
                "player not found or profile hidden",
            ));
        }
        Ok(RankSnapshot {
            tier: "Diamond 2".to_string(),
            image: Some("https://media.valorant-api.com/diamond2.png".to_string()),
            rr: Some(41),
        })
    }
}

#[async_trait]
impl MatchSource for FakeHenrik {
    async fn fetch_page(
        &self,
        player: &PlayerIdentity,
        page: u32,
        _page_size: u32,
    ) -> Result<MatchPage> {
        if !self.knows(player) {
            return Err(StatsError::source_unavailable(player, "HTTP 404"));
        }
        if page > 1 {
            return Ok(MatchPage::default());
        }
        let mut team_results = HashMap::new();
        team_results.insert("red".to_string(), TeamResult { has_won: true });
        let record = MatchRecord {
            start_timestamp: thursday_noon().timestamp() - 3600,
            mode: GameMode::Competitive,
            rounds_played: 24,
            players: vec![PlayerMatchStats {
                name: player.name.clone(),
                tag: player.tag.clone(),
                agent: "Jett".to_string(),
                score: 6000,
                kills: 24,
                deaths: 12,
                team_side: "Red".to_string(),
            }],
            team_results,
        };
        Ok(MatchPage::from_records(page, vec![record]))
    }
}

/// Records what it was handed, answers with a fixed outcome
struct RecordingSink {
    received: Mutex<Vec<Vec<PlayerReport>>>,
    reply: fn() -> Result<DeliveryOutcome>,
}

impl RecordingSink {
    fn new(reply: fn() -> Result<DeliveryOutcome>) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            reply,
        }
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn deliver(&self, reports: &[PlayerReport]) -> Result<DeliveryOutcome> {
        self.received.lock().unwrap().push(reports.to_vec());
        (self.reply)()
    }
}

fn pipeline(known: Vec<&'static str>) -> ReportPipeline {
    let henrik = Arc::new(FakeHenrik { known });
    let aggregator = AgentAggregator::new(AggregatorSettings {
        zone: FixedOffset::east_opt(0).unwrap().into(),
        ..AggregatorSettings::default()
    });
    ReportPipeline::new(henrik.clone(), henrik, aggregator)
        .with_player_timeout(Duration::from_secs(5))
}

fn roster() -> Vec<PlayerIdentity> {
    vec![
        PlayerIdentity::new("master", "bsu"),
        PlayerIdentity::new("ghost", "0000"),
        PlayerIdentity::new("Skelesis", "folk"),
    ]
}

#[tokio::test]
async fn test_one_failure_does_not_block_others() {
    let sink = Arc::new(RecordingSink::new(|| Ok(DeliveryOutcome::Accepted)));
    let pipeline = pipeline(vec!["master", "skelesis"]).with_sink(sink.clone());

    let run = pipeline.run(&roster(), thursday_noon(), true).await;

    assert_eq!(run.reports.len(), 3);
    assert_eq!(run.failed_players(), 1);
    assert_eq!(run.delivery, DeliveryStatus::Accepted);

    let ghost = &run.reports[1];
    assert_eq!(ghost.player, "ghost#0000");
    assert!(ghost.rank.is_none());
    assert!(ghost.error.as_deref().unwrap().contains("not found"));

    let master = &run.reports[0];
    assert_eq!(master.rank.as_ref().unwrap().rr, Some(41));
    assert_eq!(master.agents["Jett"].games, 1);
    assert_eq!(master.agents["Jett"].avg_acs, 250.0);
    assert_eq!(master.agents["Jett"].avg_kd, 2.0);
    assert_eq!(master.agents["Jett"].win_rate, 100.0);

    let received = sink.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], run.reports);
}

#[tokio::test]
async fn test_snapshot_survives_delivery_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("out").join("weeklyStats.json"));
    let sink = Arc::new(RecordingSink::new(|| {
        Err(StatsError::Delivery("HTTP 500: script crashed".to_string()))
    }));
    let pipeline = pipeline(vec!["master"])
        .with_sink(sink)
        .with_snapshot(store.clone());

    let run = pipeline.run(&roster()[..1], thursday_noon(), true).await;

    assert!(run.snapshot_written);
    assert!(matches!(run.delivery, DeliveryStatus::Failed(_)));
    let saved = store.load().await.unwrap();
    assert_eq!(saved, run.reports);
}

#[tokio::test]
async fn test_rejected_reply_is_a_warning_outcome() {
    let sink = Arc::new(RecordingSink::new(|| {
        Ok(DeliveryOutcome::Rejected {
            message: "sheet is protected".to_string(),
        })
    }));
    let pipeline = pipeline(vec!["master"]).with_sink(sink);

    let run = pipeline.run(&roster()[..1], thursday_noon(), true).await;
    assert_eq!(
        run.delivery,
        DeliveryStatus::Rejected("sheet is protected".to_string())
    );
    assert_eq!(run.failed_players(), 0);
}

#[tokio::test]
async fn test_roster_file_drives_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let file = RosterFile::new(dir.path().join("players.json"));
    file.add_player(PlayerIdentity::new("master", "bsu")).await.unwrap();
    file.add_player(PlayerIdentity::new("ghost", "0000")).await.unwrap();

    let roster = file.load().await.unwrap();
    assert_eq!(roster.len(), 2);

    let run = pipeline(vec!["master"])
        .run(&roster.players(), thursday_noon(), false)
        .await;
    assert_eq!(run.delivery, DeliveryStatus::Skipped);
    assert_eq!(run.failed_players(), 1);
}
