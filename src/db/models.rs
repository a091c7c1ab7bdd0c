use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Season-to-date counting statistics for one team.
///
/// Percentage fields are fractions in `[0, 1]` once a snapshot has passed
/// through [`TeamStats::canonicalize`]; the rating engine assumes that scale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStats {
    pub name: String,
    pub wins: i32,
    pub losses: i32,
    pub overtime_losses: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub shots_for: i32,
    pub shots_against: i32,
    pub hits: i32,
    pub powerplays: i32,
    pub penalties: i32,
    /// Power-play conversion (0.0–1.0)
    pub powerplay_percentage: f64,
    /// Penalty-kill success (0.0–1.0)
    pub penalty_kill_percentage: f64,
    /// Goaltending save fraction (0.0–1.0)
    pub save_percentage: f64,
    pub giveaways: i32,
    pub takeaways: i32,
    pub corsi_for: i32,
    pub corsi_against: i32,
    pub fenwick_for: i32,
    pub fenwick_against: i32,
    pub opponents_corsi_for: i32,
    pub opponents_fenwick_for: i32,
}

impl TeamStats {
    /// Raw games played (may be zero early in the season).
    /// Summed in i64, so any i32 counters fit.
    pub fn games_played(&self) -> i64 {
        i64::from(self.wins) + i64::from(self.losses) + i64::from(self.overtime_losses)
    }

    pub fn goal_differential(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Bring every percentage field onto the fraction scale.
    ///
    /// Feeds disagree on whether 91.2% arrives as `0.912` or `91.2`; anything
    /// above 1.0 is read as a 0–100 value.
    pub fn canonicalize(mut self) -> Self {
        self.powerplay_percentage = to_fraction(self.powerplay_percentage);
        self.penalty_kill_percentage = to_fraction(self.penalty_kill_percentage);
        self.save_percentage = to_fraction(self.save_percentage);
        self
    }
}

fn to_fraction(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// A scheduled game with whatever team snapshots could be resolved for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: i64,
    pub date: NaiveDate,
    pub home: Option<TeamStats>,
    pub away: Option<TeamStats>,
}

/// A game as stored in the schedule table (team references by name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

/// A schedule row together with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: i64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn canonicalize_converts_percent_scale() {
        let team = TeamStats {
            powerplay_percentage: 22.5,
            penalty_kill_percentage: 0.81,
            save_percentage: 91.2,
            ..Default::default()
        }
        .canonicalize();

        assert_relative_eq!(team.powerplay_percentage, 0.225, epsilon = 1e-12);
        assert_relative_eq!(team.penalty_kill_percentage, 0.81, epsilon = 1e-12);
        assert_relative_eq!(team.save_percentage, 0.912, epsilon = 1e-12);
    }

    #[test]
    fn derived_counters() {
        let team = TeamStats {
            wins: 10,
            losses: 5,
            overtime_losses: 2,
            goals_for: 50,
            goals_against: 41,
            ..Default::default()
        };
        assert_eq!(team.games_played(), 17);
        assert_eq!(team.goal_differential(), 9);
    }

    #[test]
    fn extreme_counters_do_not_overflow() {
        let team = TeamStats {
            wins: i32::MAX,
            losses: i32::MAX,
            overtime_losses: 1,
            goals_for: i32::MAX,
            goals_against: i32::MIN,
            ..Default::default()
        };
        assert_eq!(team.games_played(), 2 * i64::from(i32::MAX) + 1);
        assert_eq!(team.goal_differential(), i64::from(i32::MAX) - i64::from(i32::MIN));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let team: TeamStats =
            serde_json::from_str(r#"{"name":"Colorado Avalanche","wins":3}"#).unwrap();
        assert_eq!(team.name, "Colorado Avalanche");
        assert_eq!(team.wins, 3);
        assert_eq!(team.losses, 0);
    }
}
