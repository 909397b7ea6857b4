use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::http_client::http_client;
use crate::lineup::{LineupEntry, LineupOracle, Matchup};

const FFL_BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";
const BENCH_SLOT_ID: u32 = 20;
const IR_SLOT_ID: u32 = 21;

#[derive(Debug, Clone)]
pub struct EspnCredentials {
    pub espn_s2: String,
    pub swid: String,
}

/// Weekly starting lineups of one ESPN fantasy league.
#[derive(Debug)]
pub struct EspnLineupOracle {
    season: u16,
    league_id: u64,
    credentials: EspnCredentials,
    team_names: OnceCell<HashMap<u32, String>>,
}

impl EspnLineupOracle {
    pub fn new(season: u16, league_id: u64, credentials: EspnCredentials) -> Self {
        Self {
            season,
            league_id,
            credentials,
            team_names: OnceCell::new(),
        }
    }

    fn league_url(&self) -> String {
        format!(
            "{FFL_BASE_URL}/seasons/{}/segments/0/leagues/{}",
            self.season, self.league_id
        )
    }

    fn cookie(&self) -> String {
        format!(
            "espn_s2={}; SWID={}",
            self.credentials.espn_s2, self.credentials.swid
        )
    }

    fn team_names(&self) -> Result<&HashMap<u32, String>> {
        self.team_names.get_or_try_init(|| {
            let body = self
                .get(&[("view", "mTeam".to_string())], None)?
                .ok_or_else(|| anyhow!("league {} not found", self.league_id))?;
            let names = parse_team_names_json(&body)?;
            info!(league_id = self.league_id, teams = names.len(), "loaded fantasy teams");
            Ok(names)
        })
    }

    /// `Ok(None)` on 404 so a missing league or week reads as "no data".
    fn get(&self, query: &[(&str, String)], filter: Option<String>) -> Result<Option<String>> {
        let client = http_client()?;
        let mut req = client
            .get(self.league_url())
            .query(query)
            .header(COOKIE, self.cookie());
        if let Some(filter) = filter {
            req = req.header("x-fantasy-filter", filter);
        }
        let resp = req.send().context("espn request failed")?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text().context("failed reading espn body")?;
        if !status.is_success() {
            return Err(anyhow!("espn http {}: {}", status, truncate(&body, 200)));
        }
        Ok(Some(body))
    }
}

impl LineupOracle for EspnLineupOracle {
    fn weekly_matchups(&self, week: u32) -> Result<Option<Vec<Matchup>>> {
        let names = self.team_names()?;
        let query = [
            ("view", "mMatchupScore".to_string()),
            ("view", "mScoreboard".to_string()),
            ("scoringPeriodId", week.to_string()),
        ];
        let filter = json!({
            "schedule": { "filterMatchupPeriodIds": { "value": [week] } }
        })
        .to_string();
        let Some(body) = self.get(&query, Some(filter))? else {
            debug!(week, "espn has no box scores for week");
            return Ok(None);
        };
        parse_matchups_json(&body, week, names)
    }
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<EspnTeam>,
}

#[derive(Debug, Deserialize)]
struct EspnTeam {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
}

impl EspnTeam {
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let joined = [self.location.as_deref(), self.nickname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            format!("Team {}", self.id)
        } else {
            joined
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    schedule: Vec<ScheduleItem>,
}

#[derive(Debug, Deserialize)]
struct ScheduleItem {
    #[serde(rename = "matchupPeriodId")]
    matchup_period_id: Option<u32>,
    home: Option<ScheduleSide>,
    away: Option<ScheduleSide>,
}

#[derive(Debug, Deserialize)]
struct ScheduleSide {
    #[serde(rename = "teamId")]
    team_id: u32,
    #[serde(rename = "rosterForCurrentScoringPeriod")]
    current_roster: Option<Roster>,
    #[serde(rename = "rosterForMatchupPeriod")]
    matchup_roster: Option<Roster>,
}

#[derive(Debug, Deserialize)]
struct Roster {
    #[serde(default)]
    entries: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    #[serde(rename = "playerId")]
    player_id: Option<i64>,
    #[serde(rename = "lineupSlotId")]
    lineup_slot_id: Option<u32>,
    #[serde(rename = "playerPoolEntry")]
    pool_entry: Option<PoolEntry>,
}

#[derive(Debug, Deserialize)]
struct PoolEntry {
    player: Option<PoolPlayer>,
}

#[derive(Debug, Deserialize)]
struct PoolPlayer {
    #[serde(rename = "fullName")]
    full_name: Option<String>,
}

pub fn parse_team_names_json(raw: &str) -> Result<HashMap<u32, String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HashMap::new());
    }
    let data: TeamsResponse = serde_json::from_str(trimmed).context("invalid espn teams json")?;
    Ok(data
        .teams
        .iter()
        .map(|t| (t.id, t.display_name()))
        .collect())
}

/// Started lineups for `week`; `None` when the payload carries no matchups for it.
pub fn parse_matchups_json(
    raw: &str,
    week: u32,
    team_names: &HashMap<u32, String>,
) -> Result<Option<Vec<Matchup>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let data: ScheduleResponse =
        serde_json::from_str(trimmed).context("invalid espn schedule json")?;

    let mut matchups = Vec::new();
    for item in data.schedule {
        if item.matchup_period_id.is_some_and(|p| p != week) {
            continue;
        }
        // Bye weeks come through with only a home side.
        let Some(home) = item.home else {
            continue;
        };
        let home_team_name = team_name(team_names, home.team_id);
        let home_lineup = started_entries(&home, &home_team_name);
        let (away_team_name, away_lineup) = match item.away {
            Some(away) => {
                let name = team_name(team_names, away.team_id);
                let lineup = started_entries(&away, &name);
                (name, lineup)
            }
            None => (String::new(), Vec::new()),
        };
        matchups.push(Matchup {
            home_team_name,
            away_team_name,
            home_lineup,
            away_lineup,
        });
    }

    if matchups.is_empty() {
        return Ok(None);
    }
    Ok(Some(matchups))
}

fn team_name(names: &HashMap<u32, String>, id: u32) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| format!("Team {id}"))
}

fn started_entries(side: &ScheduleSide, team_name: &str) -> Vec<LineupEntry> {
    let Some(roster) = side
        .current_roster
        .as_ref()
        .or(side.matchup_roster.as_ref())
    else {
        return Vec::new();
    };
    roster
        .entries
        .iter()
        .filter(|e| is_started_slot(e.lineup_slot_id))
        .map(|e| LineupEntry {
            player_id: e.player_id.map(|id| id.to_string()),
            display_name: e
                .pool_entry
                .as_ref()
                .and_then(|p| p.player.as_ref())
                .and_then(|p| p.full_name.clone())
                .unwrap_or_default(),
            team_name: team_name.to_string(),
        })
        .collect()
}

pub fn is_started_slot(slot: Option<u32>) -> bool {
    matches!(slot, Some(id) if id != BENCH_SLOT_ID && id != IR_SLOT_ID)
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
