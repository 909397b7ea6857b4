use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};

use longest_tds::cache::SnapshotCache;
use longest_tds::lineup::MissingCredentials;
use longest_tds::plays::{PlayRecord, PlaySource, TouchdownCategory};
use longest_tds::service::LongestTdService;
use longest_tds::snapshot::SnapshotMeta;

struct CountingSource {
    loads: Arc<AtomicUsize>,
    fail: bool,
}

impl PlaySource for CountingSource {
    fn load_season(&self, year: u16) -> Result<Vec<PlayRecord>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("no play data for {year}"));
        }
        Ok(vec![PlayRecord {
            receiver_player_name: Some("K.Shakir".to_string()),
            passer_player_name: Some("J.Allen".to_string()),
            yards_gained: 64.0,
            pass_touchdown: true,
            week: 5,
            ..PlayRecord::default()
        }])
    }
}

fn meta() -> SnapshotMeta {
    SnapshotMeta {
        league_id: 7,
        has_espn_s2: false,
        has_swid: false,
        year: 2024,
    }
}

fn service(ttl: Duration, fail: bool) -> (LongestTdService, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        loads: Arc::clone(&loads),
        fail,
    };
    let svc = LongestTdService::new(
        meta(),
        Box::new(source),
        Box::new(MissingCredentials),
        SnapshotCache::new(ttl),
    );
    (svc, loads)
}

#[test]
fn second_request_served_from_cache() {
    let (svc, loads) = service(Duration::from_secs(3600), false);
    let first = svc.snapshot().expect("first snapshot");
    let second = svc.snapshot().expect("second snapshot");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.debug_info.cached_at > 0.0);
}

#[test]
fn clearing_forces_recompute() {
    let (svc, loads) = service(Duration::from_secs(3600), false);
    let first = svc.snapshot().expect("first snapshot");
    svc.clear_cache();
    let second = svc.snapshot().expect("second snapshot");
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn zero_ttl_never_serves_cached() {
    let (svc, loads) = service(Duration::ZERO, false);
    svc.snapshot().expect("first snapshot");
    svc.snapshot().expect("second snapshot");
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_credentials_still_succeed_without_owners() {
    let (svc, _) = service(Duration::from_secs(60), false);
    let snapshot = svc.snapshot().expect("snapshot without lineups");
    let receiving = snapshot
        .category(TouchdownCategory::Receiving)
        .expect("receiving touchdown present");
    assert_eq!(receiving.top.len(), 1);
    assert_eq!(receiving.top[0].fantasy_owner, None);
    assert!(receiving.longest_started.is_none());
    assert!(!snapshot.debug_info.has_espn_s2);
    assert_eq!(snapshot.debug_info.year_used, 2024);
}

#[test]
fn play_data_failure_is_an_error_and_not_cached() {
    let (svc, loads) = service(Duration::from_secs(3600), true);
    let err = svc.snapshot().expect_err("load failure surfaces");
    assert!(format!("{err:#}").contains("no play data for 2024"));
    assert!(svc.snapshot().is_err());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn cache_reports_age_and_clears() {
    let cache = SnapshotCache::new(Duration::from_secs(60));
    assert!(cache.get().is_none());

    let (svc, _) = service(Duration::from_secs(60), false);
    let snapshot = svc.snapshot().expect("snapshot");
    cache.set(Arc::clone(&snapshot));
    let (cached, age) = cache.get().expect("fresh entry");
    assert!(Arc::ptr_eq(&cached, &snapshot));
    assert!(age < Duration::from_secs(60));

    cache.clear();
    assert!(cache.get().is_none());
}
