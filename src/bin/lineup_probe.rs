use anyhow::{Result, anyhow};

use longest_tds::config::Config;
use longest_tds::espn::EspnLineupOracle;
use longest_tds::plays::{TouchdownCategory, TouchdownPlay};
use longest_tds::resolver::WeekLineups;

// Usage: lineup_probe --week 3 --player "T.J. Hockenson" [--id 3915416]
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let week = parse_arg("--week")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(|| anyhow!("--week <n> is required"))?;
    let player = parse_arg("--player").ok_or_else(|| anyhow!("--player <name> is required"))?;
    let player_id = parse_arg("--id");

    let config = Config::from_env()?;
    let Some(credentials) = config.espn_credentials() else {
        return Err(anyhow!("espn_s2 and SWID must both be set"));
    };
    let oracle = EspnLineupOracle::new(config.season, config.league_id, credentials);

    let mut lineups = WeekLineups::new(&oracle);
    let matchups = lineups.matchups(week);
    let started: usize = matchups
        .iter()
        .map(|m| m.home_lineup.len() + m.away_lineup.len())
        .sum();
    println!(
        "week {week}: {} matchups, {started} started slots",
        matchups.len()
    );

    let play = TouchdownPlay {
        player_display_name: player.clone(),
        player_id,
        yards: 0,
        week,
        category: TouchdownCategory::Rushing,
    };
    match lineups.owner_of(&play) {
        Some(owner) => println!("{player} started for {owner}"),
        None => println!("{player} was not in any starting lineup"),
    }
    Ok(())
}

fn parse_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if arg == name {
            return args.get(idx + 1).cloned();
        }
        if let Some(rest) = arg.strip_prefix(&format!("{name}=")) {
            return Some(rest.to_string());
        }
    }
    None
}
