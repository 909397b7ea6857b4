use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::identity::{NameKey, normalize_player_id};
use crate::plays::TouchdownPlay;

/// One started (non-bench) roster slot for a fantasy team in a given week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub player_id: Option<String>,
    pub display_name: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_lineup: Vec<LineupEntry>,
    pub away_lineup: Vec<LineupEntry>,
}

/// Source of weekly starting lineups.
///
/// `Ok(None)` means the provider has nothing for that week; `Err` is a transport
/// or provider failure. Callers treat both as "nobody started".
pub trait LineupOracle: Send + Sync {
    fn weekly_matchups(&self, week: u32) -> Result<Option<Vec<Matchup>>>;
}

/// Precomputed identity of a touchdown scorer, reused across every lineup it is tested against.
#[derive(Debug, Clone)]
pub struct CandidateIdentity {
    pub player_id: Option<String>,
    pub name_key: NameKey,
}

impl CandidateIdentity {
    pub fn of(play: &TouchdownPlay) -> Self {
        Self {
            player_id: normalize_player_id(play.player_id.as_deref()),
            name_key: NameKey::from_display_name(&play.player_display_name),
        }
    }

    pub fn matches_entry(&self, entry: &LineupEntry) -> bool {
        if let (Some(target), Some(entry_id)) = (
            self.player_id.as_deref(),
            normalize_player_id(entry.player_id.as_deref()),
        ) {
            if target == entry_id {
                return true;
            }
        }
        if self.name_key.last_name.is_none() {
            return false;
        }
        self.name_key
            .matches(&NameKey::from_display_name(&entry.display_name))
    }
}

pub fn is_started(candidate: &TouchdownPlay, lineup: &[LineupEntry]) -> bool {
    let identity = CandidateIdentity::of(candidate);
    lineup.iter().any(|entry| identity.matches_entry(entry))
}

/// Team name of the first lineup (home before away, matchup by matchup) that started the scorer.
pub fn owner_in_matchups(candidate: &TouchdownPlay, matchups: &[Matchup]) -> Option<String> {
    let identity = CandidateIdentity::of(candidate);
    for matchup in matchups {
        if matchup.home_lineup.iter().any(|e| identity.matches_entry(e)) {
            return Some(matchup.home_team_name.clone());
        }
        if matchup.away_lineup.iter().any(|e| identity.matches_entry(e)) {
            return Some(matchup.away_team_name.clone());
        }
    }
    None
}

/// Oracle used when ESPN credentials are not configured; never reports a lineup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingCredentials;

impl LineupOracle for MissingCredentials {
    fn weekly_matchups(&self, week: u32) -> Result<Option<Vec<Matchup>>> {
        tracing::debug!(week, "skipping lineup lookup, espn credentials missing");
        Ok(None)
    }
}
