use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 20;
// Season play-by-play files run to tens of megabytes.
const DOWNLOAD_TIMEOUT_SECS: u64 = 180;
const USER_AGENT: &str = "longest-tds/0.1";

static CLIENT: OnceCell<Client> = OnceCell::new();
static DOWNLOAD_CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| build_client(REQUEST_TIMEOUT_SECS))
}

pub fn download_client() -> Result<&'static Client> {
    DOWNLOAD_CLIENT.get_or_try_init(|| build_client(DOWNLOAD_TIMEOUT_SECS))
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build http client")
}
