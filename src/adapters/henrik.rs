//! HenrikDev stats API adapter
//!
//! Serves both match history (v3 matches) and current rank (v2 mmr). Wire
//! payloads are normalized into the domain types here so the aggregator never
//! sees upstream field names.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::domain::{
    GameMode, MalformedRecord, MatchEntry, MatchPage, MatchRecord, PlayerIdentity,
    PlayerMatchStats, RankSnapshot, TeamResult,
};
use crate::error::{Result, StatsError};
use crate::source::{MatchSource, RankSource};

#[derive(Clone)]
pub struct HenrikClient {
    http: Client,
    base_url: String,
    region: String,
}

impl HenrikClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.key.as_deref().filter(|k| !k.trim().is_empty()) {
            let mut value = HeaderValue::from_str(key.trim()).map_err(|e| {
                StatsError::Validation(format!("api key is not a valid header value: {}", e))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StatsError::Internal(format!("failed to build stats HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            region: config.region.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn player_path(&self, player: &PlayerIdentity) -> String {
        format!(
            "{}/{}/{}",
            self.region,
            urlencoding::encode(&player.name),
            urlencoding::encode(&player.tag)
        )
    }

    fn matches_url(&self, player: &PlayerIdentity, page: u32, page_size: u32) -> String {
        format!(
            "{}/v3/matches/{}?filter=all&size={}&page={}",
            self.base_url,
            self.player_path(player),
            page_size,
            page
        )
    }

    fn rank_url(&self, player: &PlayerIdentity) -> String {
        format!("{}/v2/mmr/{}", self.base_url, self.player_path(player))
    }

    async fn get_json(&self, player: &PlayerIdentity, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StatsError::source_unavailable(player, format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StatsError::source_unavailable(
                player,
                "player not found or profile hidden",
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StatsError::source_unavailable(player, "rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::source_unavailable(
                player,
                format!("HTTP {}: {}", status, truncate(&body, 200)),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                StatsError::source_unavailable(player, format!("invalid JSON body: {}", e))
            })
    }
}

#[async_trait]
impl MatchSource for HenrikClient {
    async fn fetch_page(
        &self,
        player: &PlayerIdentity,
        page: u32,
        page_size: u32,
    ) -> Result<MatchPage> {
        let url = self.matches_url(player, page, page_size);
        let body = self.get_json(player, &url).await?;
        let page = parse_match_page(page, body)
            .map_err(|reason| StatsError::source_unavailable(player, reason))?;
        debug!("Page {} for {}: {} match(es)", page.number, player, page.len());
        Ok(page)
    }
}

#[async_trait]
impl RankSource for HenrikClient {
    async fn fetch_rank(&self, player: &PlayerIdentity) -> Result<RankSnapshot> {
        let url = self.rank_url(player);
        let body = self.get_json(player, &url).await?;
        Ok(parse_rank(&body))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// === Wire format ===

#[derive(Debug, Deserialize)]
struct WireMatch {
    metadata: WireMetadata,
    players: WirePlayers,
    #[serde(default)]
    teams: Option<HashMap<String, Option<WireTeam>>>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    game_start: i64,
    mode: String,
    /// Stable lowercase id ("competitive", "custom"); display names vary
    #[serde(default)]
    mode_id: Option<String>,
    rounds_played: u32,
}

#[derive(Debug, Deserialize)]
struct WirePlayers {
    all_players: Vec<WirePlayer>,
}

#[derive(Debug, Deserialize)]
struct WirePlayer {
    name: String,
    tag: String,
    team: String,
    character: String,
    stats: WireStats,
}

#[derive(Debug, Deserialize)]
struct WireStats {
    score: i64,
    kills: u32,
    deaths: u32,
}

#[derive(Debug, Deserialize)]
struct WireTeam {
    #[serde(default)]
    has_won: Option<bool>,
}

impl From<WireMatch> for MatchRecord {
    fn from(wire: WireMatch) -> Self {
        let team_results = wire
            .teams
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(side, team)| {
                team.map(|t| {
                    (
                        side.to_lowercase(),
                        TeamResult {
                            has_won: t.has_won.unwrap_or(false),
                        },
                    )
                })
            })
            .collect();

        let players = wire
            .players
            .all_players
            .into_iter()
            .map(|p| PlayerMatchStats {
                name: p.name,
                tag: p.tag,
                agent: p.character,
                score: p.stats.score,
                kills: p.stats.kills,
                deaths: p.stats.deaths,
                team_side: p.team,
            })
            .collect();

        MatchRecord {
            start_timestamp: wire.metadata.game_start,
            mode: GameMode::parse(
                wire.metadata
                    .mode_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .unwrap_or(&wire.metadata.mode),
            ),
            rounds_played: wire.metadata.rounds_played,
            players,
            team_results,
        }
    }
}

/// Decode one element of the `data` array. Failures stay inside the page.
fn decode_match(index: usize, value: Value) -> MatchEntry {
    serde_json::from_value::<WireMatch>(value)
        .map(MatchRecord::from)
        .map_err(|e| MalformedRecord {
            index,
            reason: e.to_string(),
        })
}

/// Split a matches response into entries. A body without a `data` list is
/// not a page at all.
fn parse_match_page(number: u32, body: Value) -> std::result::Result<MatchPage, String> {
    let data = match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    };
    match data {
        Some(Value::Array(items)) => Ok(MatchPage::new(
            number,
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| decode_match(index, item))
                .collect(),
        )),
        Some(Value::Null) | None => Err("response has no match list".to_string()),
        Some(other) => Err(format!("match list is not an array: {}", type_name(&other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the current-rank block, defaulting every missing field
fn parse_rank(body: &Value) -> RankSnapshot {
    let data = &body["data"];
    let current = [&data["current_data"], &data["current"]]
        .into_iter()
        .find(|v| v.is_object())
        .unwrap_or(&Value::Null);

    let tier = ["currenttierpatched", "current_tier_patched"]
        .iter()
        .find_map(|k| current[*k].as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(RankSnapshot::UNRANKED)
        .to_string();

    let image = [&current["images"], &data["images"]]
        .into_iter()
        .find_map(|images| images["large"].as_str())
        .map(str::to_string);

    RankSnapshot {
        tier,
        image,
        rr: current["ranking_in_tier"].as_i64(),
    }
}
