use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::espn::EspnLineupOracle;
use crate::lineup::{LineupOracle, MissingCredentials};
use crate::plays::{NflversePlaySource, PlaySource};
use crate::resolver::WeekLineups;
use crate::snapshot::{ResponseSnapshot, SnapshotMeta, assemble_snapshot};

pub struct LongestTdService {
    meta: SnapshotMeta,
    plays: Box<dyn PlaySource>,
    oracle: Box<dyn LineupOracle>,
    cache: SnapshotCache,
}

impl LongestTdService {
    pub fn new(
        meta: SnapshotMeta,
        plays: Box<dyn PlaySource>,
        oracle: Box<dyn LineupOracle>,
        cache: SnapshotCache,
    ) -> Self {
        Self {
            meta,
            plays,
            oracle,
            cache,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let meta = SnapshotMeta {
            league_id: config.league_id,
            has_espn_s2: config.espn_s2.is_some(),
            has_swid: config.swid.is_some(),
            year: config.season,
        };
        let oracle: Box<dyn LineupOracle> = match config.espn_credentials() {
            Some(credentials) => Box::new(EspnLineupOracle::new(
                config.season,
                config.league_id,
                credentials,
            )),
            None => {
                warn!(
                    has_espn_s2 = meta.has_espn_s2,
                    has_swid = meta.has_swid,
                    "espn credentials missing, fantasy owners will be empty"
                );
                Box::new(MissingCredentials)
            }
        };
        let plays = Box::new(NflversePlaySource::new(config.pbp_url_template.clone()));
        Self::new(meta, plays, oracle, SnapshotCache::new(config.cache_ttl))
    }

    /// Cached snapshot if fresh, otherwise a full recompute.
    ///
    /// Only a failure to load play data is an error; lineup trouble degrades to
    /// missing owners.
    pub fn snapshot(&self) -> Result<Arc<ResponseSnapshot>> {
        if let Some((snapshot, age)) = self.cache.get() {
            info!(age_secs = age.as_secs(), "returning cached result");
            return Ok(snapshot);
        }

        let records = self
            .plays
            .load_season(self.meta.year)
            .context("failed to load play-by-play data")?;

        let mut lineups = WeekLineups::new(&*self.oracle);
        let mut snapshot = assemble_snapshot(&records, &mut lineups, self.meta);
        snapshot.debug_info.cached_at = unix_seconds_now();
        info!(
            year = self.meta.year,
            weeks_fetched = lineups.weeks_fetched(),
            "computed longest touchdowns"
        );

        let snapshot = Arc::new(snapshot);
        self.cache.set(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("snapshot cache cleared");
    }
}

fn unix_seconds_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
