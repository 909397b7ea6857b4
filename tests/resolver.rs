use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use longest_tds::lineup::{LineupEntry, LineupOracle, Matchup, MissingCredentials};
use longest_tds::plays::{TouchdownCategory, TouchdownPlay};
use longest_tds::resolver::{WeekLineups, find_longest_started, top_with_ownership};

#[derive(Default)]
struct ScriptedOracle {
    weeks: HashMap<u32, Vec<Matchup>>,
    failing: HashSet<u32>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedOracle {
    fn with_week(mut self, week: u32, home: &str, lineup: Vec<LineupEntry>) -> Self {
        self.weeks.insert(
            week,
            vec![Matchup {
                home_team_name: home.to_string(),
                away_team_name: "Opponent".to_string(),
                home_lineup: lineup,
                away_lineup: Vec::new(),
            }],
        );
        self
    }

    fn failing(mut self, week: u32) -> Self {
        self.failing.insert(week);
        self
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl LineupOracle for ScriptedOracle {
    fn weekly_matchups(&self, week: u32) -> Result<Option<Vec<Matchup>>> {
        self.calls.lock().expect("calls lock").push(week);
        if self.failing.contains(&week) {
            return Err(anyhow!("provider unavailable"));
        }
        Ok(self.weeks.get(&week).cloned())
    }
}

fn td(name: &str, yards: u32, week: u32, id: Option<&str>) -> TouchdownPlay {
    TouchdownPlay {
        player_display_name: name.to_string(),
        player_id: id.map(|s| s.to_string()),
        yards,
        week,
        category: TouchdownCategory::Rushing,
    }
}

fn starter(name: &str, id: Option<&str>) -> LineupEntry {
    LineupEntry {
        player_id: id.map(|s| s.to_string()),
        display_name: name.to_string(),
        team_name: "ignored".to_string(),
    }
}

/// Six touchdowns, each in its own week, longest first.
fn ladder() -> Vec<TouchdownPlay> {
    vec![
        td("A.Alpha", 90, 1, None),
        td("B.Bravo", 80, 2, None),
        td("C.Charlie", 70, 3, None),
        td("D.Delta", 60, 4, None),
        td("E.Echo", 50, 5, None),
        td("F.Foxtrot", 40, 6, None),
    ]
}

#[test]
fn longer_unstarted_touchdown_is_passed_over() {
    let candidates = vec![
        td("A", 80, 1, Some("77")),
        td("B", 75, 1, None),
        td("C", 60, 2, Some("99")),
    ];
    let oracle = ScriptedOracle::default().with_week(
        1,
        "Team B",
        vec![starter("Someone Else", Some("99")), starter("B", None)],
    );
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&candidates, &mut lineups).expect("B was started");
    assert_eq!(found.player, "B");
    assert_eq!(found.yards, 75);
    assert_eq!(found.week, 1);
    assert_eq!(found.fantasy_owner.as_deref(), Some("Team B"));
    assert_eq!(found.player_id, None);
    // Week 1 is fetched once and reused for B; week 2 is never needed.
    assert_eq!(oracle.calls(), vec![1]);
}

#[test]
fn hit_in_first_pool_stops_the_search() {
    let oracle = ScriptedOracle::default().with_week(1, "Owner", vec![starter("Al Alpha", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&ladder(), &mut lineups).expect("top play started");
    assert_eq!(found.player, "A.Alpha");
    assert_eq!(oracle.calls(), vec![1]);
}

#[test]
fn fourth_ranked_found_in_largest_pool() {
    let oracle =
        ScriptedOracle::default().with_week(4, "Owner", vec![starter("Dan Delta", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&ladder(), &mut lineups).expect("rank 4 is reachable");
    assert_eq!(found.player, "D.Delta");
    assert_eq!(found.yards, 60);
    // Each candidate is checked once even though pools overlap.
    assert_eq!(oracle.calls(), vec![1, 2, 3, 4]);
}

#[test]
fn sixth_ranked_is_out_of_reach() {
    let oracle =
        ScriptedOracle::default().with_week(6, "Owner", vec![starter("Fred Foxtrot", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    assert_eq!(find_longest_started(&ladder(), &mut lineups), None);
    assert_eq!(oracle.calls(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn failed_week_lookup_does_not_abort() {
    let oracle = ScriptedOracle::default()
        .failing(1)
        .with_week(2, "Owner", vec![starter("Bo Bravo", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&ladder(), &mut lineups).expect("rank 2 started");
    assert_eq!(found.player, "B.Bravo");
    assert_eq!(oracle.calls(), vec![1, 2]);
}

#[test]
fn missing_credentials_resolve_nothing() {
    let mut lineups = WeekLineups::new(&MissingCredentials);
    assert_eq!(find_longest_started(&ladder(), &mut lineups), None);
    assert!(
        top_with_ownership(&ladder(), 3, &mut lineups)
            .iter()
            .all(|t| t.fantasy_owner.is_none())
    );
}

#[test]
fn same_week_candidates_share_one_lookup() {
    let candidates = vec![
        td("A.Alpha", 90, 7, None),
        td("B.Bravo", 80, 7, None),
        td("C.Charlie", 70, 7, None),
    ];
    let oracle = ScriptedOracle::default().with_week(7, "Owner", Vec::new());
    let mut lineups = WeekLineups::new(&oracle);

    assert_eq!(find_longest_started(&candidates, &mut lineups), None);
    assert_eq!(oracle.calls(), vec![7]);
    assert_eq!(lineups.weeks_fetched(), 1);
}

#[test]
fn empty_candidates_make_no_calls() {
    let oracle = ScriptedOracle::default();
    let mut lineups = WeekLineups::new(&oracle);
    assert_eq!(find_longest_started(&[], &mut lineups), None);
    assert!(oracle.calls().is_empty());
}

#[test]
fn input_order_does_not_matter() {
    let mut shuffled = ladder();
    shuffled.reverse();
    let oracle =
        ScriptedOracle::default().with_week(3, "Owner", vec![starter("Cy Charlie", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&shuffled, &mut lineups).expect("rank 3 started");
    assert_eq!(found.player, "C.Charlie");
    assert_eq!(oracle.calls(), vec![1, 2, 3]);
}

#[test]
fn equal_yardage_checks_earlier_week_first() {
    let candidates = vec![td("Late.Player", 66, 9, None), td("Early.Player", 66, 2, None)];
    let oracle = ScriptedOracle::default()
        .with_week(2, "Early Owner", vec![starter("E Player", None)])
        .with_week(9, "Late Owner", vec![starter("L Player", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let found = find_longest_started(&candidates, &mut lineups).expect("both started");
    assert_eq!(found.fantasy_owner.as_deref(), Some("Early Owner"));
}

#[test]
fn top_list_is_sorted_and_annotated() {
    let mut candidates = ladder();
    candidates.swap(0, 4);
    let oracle =
        ScriptedOracle::default().with_week(2, "Bravo Owner", vec![starter("Bo Bravo", None)]);
    let mut lineups = WeekLineups::new(&oracle);

    let top = top_with_ownership(&candidates, 3, &mut lineups);
    let yards: Vec<u32> = top.iter().map(|t| t.yards).collect();
    assert_eq!(yards, vec![90, 80, 70]);
    assert_eq!(top[0].fantasy_owner, None);
    assert_eq!(top[1].fantasy_owner.as_deref(), Some("Bravo Owner"));
    assert_eq!(top[2].fantasy_owner, None);
}
