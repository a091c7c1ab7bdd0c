//! Season counters → per-game, league-relative features.
//!
//! Every feature is dimensionless. "Multiple of league average" features sit
//! near 1.0 for an average team; differential features sit near 0.0.

use serde::{Deserialize, Serialize};

use crate::db::models::TeamStats;

/// Neutral value for any ratio whose denominator is empty.
pub const NEUTRAL_RATIO: f64 = 0.5;

/// League reference values the per-game rates are scaled against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueAverages {
    /// Goal differential per game of a good-but-not-elite team
    pub goal_differential: f64,
    /// Shots per game
    pub shots: f64,
    /// League save fraction
    pub save_fraction: f64,
    /// Distance from the league save fraction that counts as one unit
    pub save_fraction_spread: f64,
    /// Divisor for per-game corsi/fenwick/turnover differentials
    pub possession_scale: f64,
    /// Divisor for the hits-per-penalty ratio
    pub physicality_scale: f64,
}

impl Default for LeagueAverages {
    fn default() -> Self {
        Self {
            goal_differential: 0.6,
            shots: 35.0,
            save_fraction: 0.900,
            save_fraction_spread: 0.04,
            possession_scale: 10.0,
            physicality_scale: 5.0,
        }
    }
}

impl LeagueAverages {
    pub(crate) fn all_positive(&self) -> bool {
        [
            self.goal_differential,
            self.shots,
            self.save_fraction_spread,
            self.possession_scale,
            self.physicality_scale,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedStats {
    /// Games played, floored at 1
    pub games_played: i64,
    pub win_pct: f64,
    pub goal_diff: f64,
    pub save: f64,
    pub special_teams: f64,
    pub shots_for: f64,
    pub shots_against: f64,
    pub corsi_diff: f64,
    pub fenwick_diff: f64,
    pub hits_penalties: f64,
    pub turnovers: f64,
}

/// `num / denom`, or [`NEUTRAL_RATIO`] when there is nothing to divide by.
pub fn safe_ratio(num: i64, denom: i64) -> f64 {
    if denom == 0 {
        NEUTRAL_RATIO
    } else {
        num as f64 / denom as f64
    }
}

/// Games played with a floor of 1 so per-game rates never divide by zero.
pub fn games_played(team: &TeamStats) -> i64 {
    team.games_played().max(1)
}

pub fn normalize(team: &TeamStats, league: &LeagueAverages) -> NormalizedStats {
    let gp = games_played(team);
    let per_game = |v: f64| v / gp as f64;
    // Differences are taken in f64 so extreme counters cannot overflow
    let diff = |a: i32, b: i32| f64::from(a) - f64::from(b);

    let shots_against_per_game = per_game(f64::from(team.shots_against));
    let penalties_per_game = per_game(f64::from(team.penalties));

    NormalizedStats {
        games_played: gp,
        win_pct: safe_ratio(i64::from(team.wins), team.games_played()),
        goal_diff: per_game(team.goal_differential() as f64) / league.goal_differential,
        save: (team.save_percentage - league.save_fraction) / league.save_fraction_spread,
        special_teams: (team.powerplay_percentage + team.penalty_kill_percentage) / 2.0,
        shots_for: per_game(f64::from(team.shots_for)) / league.shots,
        // An average defensive team earns half a point here
        shots_against: (1.5 * league.shots - shots_against_per_game) / league.shots,
        corsi_diff: per_game(diff(team.corsi_for, team.corsi_against)) / league.possession_scale,
        fenwick_diff: per_game(diff(team.fenwick_for, team.fenwick_against))
            / league.possession_scale,
        hits_penalties: (per_game(f64::from(team.hits)) / (penalties_per_game + 1.0))
            / league.physicality_scale,
        turnovers: per_game(diff(team.takeaways, team.giveaways)) / league.possession_scale,
    }
}
