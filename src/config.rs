use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::espn::EspnCredentials;
use crate::plays::DEFAULT_PBP_URL_TEMPLATE;

pub const DEFAULT_SEASON: u16 = 2025;
pub const DEFAULT_LEAGUE_ID: u64 = 1_918_224_288;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CACHE_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub season: u16,
    pub league_id: u64,
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
    pub bind_addr: SocketAddr,
    pub cache_ttl: Duration,
    pub pbp_url_template: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let season = match get("NFL_YEAR") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("NFL_YEAR is not a year: {raw}"))?,
            None => DEFAULT_SEASON,
        };
        let league_id = match get("LEAGUE_ID") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("LEAGUE_ID is not numeric: {raw}"))?,
            None => DEFAULT_LEAGUE_ID,
        };
        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| anyhow!("BIND_ADDR is not a socket address: {err}"))?;
        let cache_secs = get("CACHE_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_SECS);

        Ok(Self {
            season,
            league_id,
            espn_s2: get("espn_s2"),
            swid: get("SWID"),
            bind_addr,
            cache_ttl: Duration::from_secs(cache_secs),
            pbp_url_template: get("PBP_URL_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_PBP_URL_TEMPLATE.to_string()),
        })
    }

    /// Both cookies are needed; either one missing disables lineup lookups.
    pub fn espn_credentials(&self) -> Option<EspnCredentials> {
        Some(EspnCredentials {
            espn_s2: self.espn_s2.clone()?,
            swid: self.swid.clone()?,
        })
    }
}
