use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::lineup::{LineupOracle, Matchup, owner_in_matchups};
use crate::plays::{TouchdownPlay, sort_by_yards};

/// Candidate pool sizes tried in order before giving up on a category.
pub const POOL_SIZES: [usize; 3] = [1, 3, 5];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTouchdown {
    pub player: String,
    pub yards: u32,
    pub week: u32,
    pub fantasy_owner: Option<String>,
    pub player_id: Option<String>,
}

impl ResolvedTouchdown {
    pub fn from_play(play: &TouchdownPlay, fantasy_owner: Option<String>) -> Self {
        Self {
            player: play.player_display_name.clone(),
            yards: play.yards,
            week: play.week,
            fantasy_owner,
            player_id: play.player_id.clone(),
        }
    }
}

/// Request-scoped memo of weekly matchups so each week hits the oracle at most once.
pub struct WeekLineups<'a> {
    oracle: &'a dyn LineupOracle,
    weeks: HashMap<u32, Vec<Matchup>>,
}

impl<'a> WeekLineups<'a> {
    pub fn new(oracle: &'a dyn LineupOracle) -> Self {
        Self {
            oracle,
            weeks: HashMap::new(),
        }
    }

    pub fn matchups(&mut self, week: u32) -> &[Matchup] {
        let oracle = self.oracle;
        self.weeks.entry(week).or_insert_with(|| {
            match oracle.weekly_matchups(week) {
                Ok(Some(matchups)) => matchups,
                Ok(None) => {
                    info!(week, "no box scores available for week");
                    Vec::new()
                }
                Err(err) => {
                    warn!(week, "lineup lookup failed: {err:#}");
                    Vec::new()
                }
            }
        })
    }

    pub fn owner_of(&mut self, play: &TouchdownPlay) -> Option<String> {
        debug!(player = %play.player_display_name, week = play.week, "checking lineups");
        owner_in_matchups(play, self.matchups(play.week))
    }

    pub fn weeks_fetched(&self) -> usize {
        self.weeks.len()
    }
}

/// Longest touchdown whose scorer sat in a starting lineup that week.
///
/// Widens the pool through [`POOL_SIZES`]; a candidate already checked by a
/// smaller pool is not checked again. Anything ranked below the largest pool is
/// never considered.
pub fn find_longest_started(
    candidates: &[TouchdownPlay],
    lineups: &mut WeekLineups<'_>,
) -> Option<ResolvedTouchdown> {
    if candidates.is_empty() {
        return None;
    }
    let mut ranked = candidates.to_vec();
    sort_by_yards(&mut ranked);

    let mut checked = HashSet::new();
    for size in POOL_SIZES {
        for (rank, play) in ranked.iter().take(size).enumerate() {
            if !checked.insert(rank) {
                continue;
            }
            if let Some(owner) = lineups.owner_of(play) {
                info!(
                    category = play.category.label(),
                    player = %play.player_display_name,
                    yards = play.yards,
                    owner = %owner,
                    "found started touchdown"
                );
                return Some(ResolvedTouchdown::from_play(play, Some(owner)));
            }
        }
        if size >= ranked.len() {
            break;
        }
        info!("no started players found in top {size} touchdowns, checking more");
    }

    info!("no started players found in any checked touchdowns");
    None
}

/// Top `limit` touchdowns by yardage, each annotated with its fantasy owner if started.
pub fn top_with_ownership(
    candidates: &[TouchdownPlay],
    limit: usize,
    lineups: &mut WeekLineups<'_>,
) -> Vec<ResolvedTouchdown> {
    let mut ranked = candidates.to_vec();
    sort_by_yards(&mut ranked);
    ranked
        .iter()
        .take(limit)
        .map(|play| {
            let owner = lineups.owner_of(play);
            ResolvedTouchdown::from_play(play, owner)
        })
        .collect()
}
