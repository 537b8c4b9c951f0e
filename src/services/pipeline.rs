//! Weekly report pipeline
//!
//! For every roster entry: rank lookup, then match aggregation, merged into a
//! `PlayerReport`. A player that fails gets an error entry and the pass moves
//! on. The finished array is written to the local snapshot and then posted to
//! the report sink; neither step blocks the other.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::adapters::{DeliveryOutcome, ReportSink};
use crate::aggregator::AgentAggregator;
use crate::coordination::ShutdownListener;
use crate::domain::{PlayerIdentity, PlayerReport};
use crate::error::{Result, StatsError};
use crate::persistence::SnapshotStore;
use crate::source::{MatchSource, RankSource};

/// What happened to the report after collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// No sink configured or posting disabled
    Skipped,
    Accepted,
    /// Endpoint replied with a script-side error
    Rejected(String),
    Failed(String),
}

/// Result of one full pass
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub reports: Vec<PlayerReport>,
    pub snapshot_written: bool,
    pub delivery: DeliveryStatus,
}

impl PipelineRun {
    pub fn failed_players(&self) -> usize {
        self.reports.iter().filter(|r| r.is_error()).count()
    }

    /// At least one player was attempted and none succeeded
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.failed_players() == self.reports.len()
    }
}

pub struct ReportPipeline {
    rank_source: Arc<dyn RankSource>,
    match_source: Arc<dyn MatchSource>,
    aggregator: AgentAggregator,
    sink: Option<Arc<dyn ReportSink>>,
    snapshot: Option<SnapshotStore>,
    player_timeout: Duration,
    shutdown: ShutdownListener,
}

impl ReportPipeline {
    pub fn new(
        rank_source: Arc<dyn RankSource>,
        match_source: Arc<dyn MatchSource>,
        aggregator: AgentAggregator,
    ) -> Self {
        Self {
            rank_source,
            match_source,
            aggregator,
            sink: None,
            snapshot: None,
            player_timeout: Duration::from_secs(300),
            shutdown: ShutdownListener::detached(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotStore) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_player_timeout(mut self, timeout: Duration) -> Self {
        self.player_timeout = timeout;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownListener) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn aggregator(&self) -> &AgentAggregator {
        &self.aggregator
    }

    /// Rank plus agent stats for one player, no timeout applied
    pub async fn collect_player(
        &self,
        player: &PlayerIdentity,
        cutoff: DateTime<Utc>,
    ) -> Result<PlayerReport> {
        let rank = self.rank_source.fetch_rank(player).await?;
        info!("Rank for {}: {} ({:?} RR)", player, rank.tier, rank.rr);

        let agents = self
            .aggregator
            .aggregate_agent_stats(self.match_source.as_ref(), player, cutoff, &self.shutdown)
            .await?;

        Ok(PlayerReport::success(player, rank, agents))
    }

    /// Collect every player in order. Never fails as a whole.
    ///
    /// The cutoff is derived once from `now` so every player shares the same
    /// window. Players not yet started when shutdown is requested are left out.
    pub async fn collect(
        &self,
        players: &[PlayerIdentity],
        now: DateTime<Utc>,
    ) -> Vec<PlayerReport> {
        let cutoff = self.aggregator.cutoff(now);
        info!(
            "Collecting {} player(s), competitive cutoff {}",
            players.len(),
            cutoff
        );

        let mut reports = Vec::with_capacity(players.len());
        for player in players {
            if self.shutdown.is_shutdown() {
                warn!(
                    "Shutdown requested, skipping remaining {} player(s)",
                    players.len() - reports.len()
                );
                break;
            }

            let attempt = self.collect_player(player, cutoff);
            let outcome = tokio::time::timeout(self.player_timeout, attempt)
                .await
                .unwrap_or_else(|_| {
                    Err(StatsError::Timeout(format!(
                        "fetching {} took longer than {}s",
                        player,
                        self.player_timeout.as_secs()
                    )))
                });

            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Failed for {}: {}", player, e);
                    reports.push(PlayerReport::failure(player, e.to_string()));
                }
            }
        }
        reports
    }

    /// Write the snapshot, then hand the reports to the sink
    pub async fn publish(&self, reports: &[PlayerReport], post: bool) -> (bool, DeliveryStatus) {
        let snapshot_written = match &self.snapshot {
            Some(store) => match store.write(reports).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Could not write snapshot {}: {}", store.path().display(), e);
                    false
                }
            },
            None => false,
        };

        let delivery = match (&self.sink, post) {
            (Some(sink), true) => match sink.deliver(reports).await {
                Ok(DeliveryOutcome::Accepted) => {
                    info!("Posted {} report(s)", reports.len());
                    DeliveryStatus::Accepted
                }
                Ok(DeliveryOutcome::Rejected { message }) => {
                    warn!("Report endpoint returned an error: {}", message);
                    DeliveryStatus::Rejected(message)
                }
                Err(e) => {
                    error!("Report delivery failed: {}", e);
                    DeliveryStatus::Failed(e.to_string())
                }
            },
            _ => DeliveryStatus::Skipped,
        };

        (snapshot_written, delivery)
    }

    /// One full pass: collect, snapshot, deliver
    pub async fn run(
        &self,
        players: &[PlayerIdentity],
        now: DateTime<Utc>,
        post: bool,
    ) -> PipelineRun {
        let reports = self.collect(players, now).await;
        let (snapshot_written, delivery) = self.publish(&reports, post).await;

        let run = PipelineRun {
            reports,
            snapshot_written,
            delivery,
        };
        info!(
            "Pass finished: {} report(s), {} failed, delivery {:?}",
            run.reports.len(),
            run.failed_players(),
            run.delivery
        );
        run
    }
}
