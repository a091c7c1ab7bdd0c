//! JSON import of team snapshots and the game schedule.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::db::models::{ScheduledGame, TeamStats};
use crate::db::Database;

pub fn parse_teams(raw: &str) -> Result<Vec<TeamStats>> {
    let teams: Vec<TeamStats> = serde_json::from_str(raw).context("invalid team snapshot JSON")?;
    Ok(teams.into_iter().map(TeamStats::canonicalize).collect())
}

pub fn parse_games(raw: &str) -> Result<Vec<ScheduledGame>> {
    serde_json::from_str(raw).context("invalid game schedule JSON")
}

/// Upsert every named team in the file; returns how many were stored.
pub fn import_teams(db: &Database, path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut stored = 0;
    for team in parse_teams(&raw)? {
        if team.name.trim().is_empty() {
            warn!("Skipping team snapshot without a name");
            continue;
        }
        db.upsert_team(&team)?;
        stored += 1;
    }
    info!("Imported {} team snapshot(s) from {}", stored, path.display());
    Ok(stored)
}

pub fn import_games(db: &Database, path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let games = parse_games(&raw)?;
    for game in &games {
        db.insert_game(game)?;
    }
    info!("Scheduled {} game(s) from {}", games.len(), path.display());
    Ok(games.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn teams_arrive_on_fraction_scale() {
        let teams = parse_teams(
            r#"[{"name":"Vegas Golden Knights","wins":9,"powerplay_percentage":24.1,
                 "penalty_kill_percentage":0.83,"save_percentage":0.911}]"#,
        )
        .unwrap();
        assert_eq!(teams.len(), 1);
        assert!((teams[0].powerplay_percentage - 0.241).abs() < 1e-12);
        assert!((teams[0].save_percentage - 0.911).abs() < 1e-12);
    }

    #[test]
    fn games_parse_iso_dates() {
        let games = parse_games(
            r#"[{"date":"2025-11-04","home_team":"Boston Bruins","away_team":"Florida Panthers"}]"#,
        )
        .unwrap();
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2025, 11, 4).unwrap());
        assert_eq!(games[0].away_team, "Florida Panthers");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_teams("{not json").is_err());
        assert!(parse_games(r#"[{"date":"11-04-2025","home_team":"A","away_team":"B"}]"#).is_err());
    }

    #[test]
    fn import_skips_unnamed_teams() {
        let db = Database::open_in_memory().unwrap();
        let path = std::env::temp_dir().join(format!("hockey-teams-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"name":"Utah Hockey Club","wins":4},{"wins":2}]"#).unwrap();

        assert_eq!(import_teams(&db, &path).unwrap(), 1);
        assert!(db.get_team("Utah Hockey Club").unwrap().is_some());
        let _ = std::fs::remove_file(&path);
    }
}
