use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::plays::{PlayRecord, TouchdownCategory, touchdown_count, touchdowns};
use crate::resolver::{ResolvedTouchdown, WeekLineups, find_longest_started, top_with_ownership};

pub const DISPLAY_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Longest first, at most [`DISPLAY_LIMIT`] entries.
    pub top: Vec<ResolvedTouchdown>,
    pub longest_started: Option<ResolvedTouchdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub total_rushing_tds: usize,
    pub total_receiving_tds: usize,
    pub total_passing_tds: usize,
    pub league_id: u64,
    pub has_espn_s2: bool,
    pub has_swid: bool,
    pub year_used: u16,
    /// Unix seconds; zero until the snapshot is stored.
    pub cached_at: f64,
}

/// Configuration echoed back in [`DebugInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub league_id: u64,
    pub has_espn_s2: bool,
    pub has_swid: bool,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    /// Categories with no touchdowns at all are absent.
    pub categories: BTreeMap<TouchdownCategory, CategorySummary>,
    pub debug_info: DebugInfo,
}

impl ResponseSnapshot {
    pub fn category(&self, category: TouchdownCategory) -> Option<&CategorySummary> {
        self.categories.get(&category)
    }
}

// Flat layout: `rushing_tds`, `longest_started_rushing_td`, ..., `debug_info`.
impl Serialize for ResponseSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (category, summary) in &self.categories {
            map.serialize_entry(&format!("{}_tds", category.label()), &summary.top)?;
            if let Some(started) = summary.longest_started.as_ref() {
                map.serialize_entry(
                    &format!("longest_started_{}_td", category.label()),
                    started,
                )?;
            }
        }
        map.serialize_entry("debug_info", &self.debug_info)?;
        map.end()
    }
}

pub fn summarize_category(
    records: &[PlayRecord],
    category: TouchdownCategory,
    lineups: &mut WeekLineups<'_>,
) -> Option<CategorySummary> {
    let candidates = touchdowns(records, category);
    if candidates.is_empty() {
        return None;
    }
    // Two independent passes: the started one may rank below the display list.
    let top = top_with_ownership(&candidates, DISPLAY_LIMIT, lineups);
    let longest_started = find_longest_started(&candidates, lineups);
    Some(CategorySummary {
        top,
        longest_started,
    })
}

pub fn assemble_snapshot(
    records: &[PlayRecord],
    lineups: &mut WeekLineups<'_>,
    meta: SnapshotMeta,
) -> ResponseSnapshot {
    let mut categories = BTreeMap::new();
    for category in TouchdownCategory::ALL {
        if let Some(summary) = summarize_category(records, category, lineups) {
            categories.insert(category, summary);
        }
    }

    ResponseSnapshot {
        categories,
        debug_info: DebugInfo {
            total_rushing_tds: touchdown_count(records, TouchdownCategory::Rushing),
            total_receiving_tds: touchdown_count(records, TouchdownCategory::Receiving),
            total_passing_tds: touchdown_count(records, TouchdownCategory::Passing),
            league_id: meta.league_id,
            has_espn_s2: meta.has_espn_s2,
            has_swid: meta.has_swid,
            year_used: meta.year,
            cached_at: 0.0,
        },
    }
}
