use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use longest_tds::config::Config;
use longest_tds::server::serve;
use longest_tds::service::LongestTdService;

const DEFAULT_LOG_FILTER: &str = "longest_tds=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        season = config.season,
        league_id = config.league_id,
        cache_secs = config.cache_ttl.as_secs(),
        "starting longest touchdowns service"
    );
    let service = Arc::new(LongestTdService::from_config(&config));
    serve(config.bind_addr, service).await
}
