use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "longest_tds";
const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Validators stored next to a downloaded file so the next fetch can be conditional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedFileMeta {
    pub version: u32,
    pub url: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetched_at: u64,
}

/// Fetches `url` into `path`, reusing the existing file when the server answers 304.
///
/// A stale copy is served when the network fails but a previous download exists.
pub fn fetch_file_cached(client: &Client, url: &str, path: &Path) -> Result<PathBuf> {
    let meta_path = meta_path_for(path);
    let cached = load_meta(&meta_path)
        .filter(|meta| meta.url == url)
        .filter(|_| path.exists());

    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 1..=DOWNLOAD_ATTEMPTS {
        match fetch_once(client, url, path, cached.as_ref()) {
            Ok(()) => return Ok(path.to_path_buf()),
            Err(err) => {
                warn!(attempt, url, "download failed: {err:#}");
                last_err = Some(err);
                if attempt < DOWNLOAD_ATTEMPTS {
                    let sleep_ms = 500_u64.saturating_mul(attempt as u64);
                    std::thread::sleep(std::time::Duration::from_millis(sleep_ms));
                }
            }
        }
    }

    if cached.is_some() {
        warn!(url, "serving stale copy from {}", path.display());
        return Ok(path.to_path_buf());
    }
    Err(last_err.unwrap_or_else(|| anyhow!("download failed for {url}")))
}

fn fetch_once(
    client: &Client,
    url: &str,
    path: &Path,
    cached: Option<&CachedFileMeta>,
) -> Result<()> {
    let mut req = client.get(url);
    if let Some(meta) = cached {
        if let Some(etag) = meta.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = meta.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request {url}"))?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        if cached.is_some() {
            debug!(url, "not modified, reusing {}", path.display());
            return Ok(());
        }
        return Err(anyhow!("received 304 without cached file"));
    }
    if !status.is_success() {
        return Err(anyhow!("http {status} for {url}"));
    }

    let headers = resp.headers().clone();
    let bytes = resp.bytes().with_context(|| format!("read body {url}"))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("part");
    fs::write(&tmp, &bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;

    let meta = CachedFileMeta {
        version: CACHE_VERSION,
        url: url.to_string(),
        etag: header_string(&headers, ETAG),
        last_modified: header_string(&headers, LAST_MODIFIED),
        fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
    };
    if let Err(err) = save_meta(&meta_path_for(path), &meta) {
        warn!("failed to persist download metadata: {err:#}");
    }
    info!(url, bytes = bytes.len(), "downloaded {}", path.display());
    Ok(())
}

fn header_string(
    headers: &reqwest::header::HeaderMap,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub fn meta_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".meta.json");
    path.with_file_name(name)
}

pub fn load_meta(path: &Path) -> Option<CachedFileMeta> {
    let raw = fs::read_to_string(path).ok()?;
    let meta = serde_json::from_str::<CachedFileMeta>(&raw).ok()?;
    if meta.version != CACHE_VERSION {
        return None;
    }
    Some(meta)
}

pub fn save_meta(path: &Path, meta: &CachedFileMeta) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(meta).context("serialize download metadata")?;
    fs::write(&tmp, json).context("write download metadata")?;
    fs::rename(&tmp, path).context("swap download metadata")?;
    Ok(())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
