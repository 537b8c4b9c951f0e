use agentstats::adapters::{DeliveryOutcome, HenrikClient, ReportSink, WebhookSink};
use agentstats::aggregator::{AgentAggregator, AggregatorSettings};
use agentstats::cli::output::{
    print_items, print_success, print_warn, AgentRow, OutputMode, PlayerRow,
};
use agentstats::config::AppConfig;
use agentstats::coordination::{install_signal_handlers, GracefulShutdown, ShutdownListener};
use agentstats::domain::PlayerIdentity;
use agentstats::error::{Result, StatsError};
use agentstats::persistence::{RosterFile, SnapshotStore};
use agentstats::services::{ApiServer, ApiState, DeliveryStatus, ReportPipeline};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::main_runtime::resolve_zone;

fn build_aggregator(config: &AppConfig) -> Result<AgentAggregator> {
    let zone = resolve_zone(config.aggregation.zone()?);
    info!("Using zone {} for the weekly window", zone);
    Ok(AgentAggregator::new(AggregatorSettings::from_config(
        &config.aggregation,
        zone,
    )))
}

fn build_sink(config: &AppConfig) -> Result<Option<WebhookSink>> {
    match config.report.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(Some(WebhookSink::new(
            url,
            Duration::from_secs(config.report.timeout_secs),
        )?)),
        _ => Ok(None),
    }
}

fn build_pipeline(config: &AppConfig, shutdown: ShutdownListener) -> Result<ReportPipeline> {
    let client = Arc::new(HenrikClient::new(&config.api)?);
    let mut pipeline = ReportPipeline::new(client.clone(), client, build_aggregator(config)?)
        .with_snapshot(SnapshotStore::new(&config.report.snapshot_path))
        .with_player_timeout(Duration::from_secs(config.pipeline.player_timeout_secs))
        .with_shutdown(shutdown);

    match build_sink(config)? {
        Some(sink) => pipeline = pipeline.with_sink(Arc::new(sink)),
        None => warn!("No report.webhook_url configured, reports will only be written locally"),
    }
    Ok(pipeline)
}

pub async fn run_report_mode(config: &AppConfig, post: bool) -> Result<()> {
    let shutdown = Arc::new(GracefulShutdown::new());
    install_signal_handlers(Arc::clone(&shutdown));

    let pipeline = build_pipeline(config, shutdown.listener())?;
    let roster = RosterFile::new(&config.roster.path).load().await?;
    if roster.is_empty() {
        warn!("Roster {} is empty, nothing to collect", config.roster.path.display());
    }

    let run = pipeline.run(&roster.players(), Utc::now(), post).await;
    if run.snapshot_written {
        info!("Snapshot written to {}", config.report.snapshot_path.display());
    }
    if let DeliveryStatus::Failed(reason) = &run.delivery {
        warn!("Report was not delivered: {}", reason);
    }
    if run.all_failed() {
        return Err(StatsError::Internal(format!(
            "all {} roster player(s) failed",
            run.reports.len()
        )));
    }
    Ok(())
}

pub async fn run_serve_mode(config: &AppConfig, port: u16) -> Result<()> {
    let shutdown = Arc::new(GracefulShutdown::new());
    install_signal_handlers(Arc::clone(&shutdown));

    let pipeline = Arc::new(build_pipeline(config, shutdown.listener())?);
    let state = Arc::new(ApiState::new(
        RosterFile::new(&config.roster.path),
        pipeline,
        true,
    ));
    ApiServer::new(state, port).run(shutdown.listener()).await
}

pub async fn run_replay_mode(config: &AppConfig, snapshot: Option<&str>) -> Result<()> {
    let store = match snapshot {
        Some(path) => SnapshotStore::new(path),
        None => SnapshotStore::new(&config.report.snapshot_path),
    };
    let reports = store.load().await?;
    info!("Loaded {} report(s) from {}", reports.len(), store.path().display());

    let sink = build_sink(config)?.ok_or_else(|| {
        StatsError::Validation("report.webhook_url is not configured".to_string())
    })?;
    match sink.deliver(&reports).await? {
        DeliveryOutcome::Accepted => {
            info!("Replayed {} report(s) to {}", reports.len(), sink.url())
        }
        DeliveryOutcome::Rejected { message } => {
            warn!("Report endpoint returned an error: {}", message)
        }
    }
    Ok(())
}

pub async fn run_players_list(config: &AppConfig, json: bool) -> Result<()> {
    let roster = RosterFile::new(&config.roster.path).load().await?;
    print_items(&PlayerRow::from_roster(&roster), OutputMode::from_json_flag(json))?;
    Ok(())
}

pub async fn run_players_add(config: &AppConfig, name: &str, tag: &str) -> Result<()> {
    let file = RosterFile::new(&config.roster.path);
    let roster = file.add_player(PlayerIdentity::new(name, tag)).await?;
    print_success(&format!(
        "{}#{} saved ({} player(s) in {})",
        name.trim(),
        tag.trim(),
        roster.len(),
        file.path().display()
    ));
    Ok(())
}

pub async fn run_agents_mode(config: &AppConfig, player: &str, json: bool) -> Result<()> {
    let player: PlayerIdentity = player.parse()?;
    let client = HenrikClient::new(&config.api)?;
    let aggregator = build_aggregator(config)?;
    let cutoff = aggregator.cutoff(Utc::now());

    let result = aggregator
        .aggregate_agent_stats(&client, &player, cutoff, &ShutdownListener::detached())
        .await?;
    if result.is_empty() {
        print_warn(&format!("No included matches for {} since {}", player, cutoff));
    }
    print_items(&AgentRow::from_result(&result), OutputMode::from_json_flag(json))?;
    Ok(())
}
