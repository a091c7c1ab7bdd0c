//! Team power rating.
//!
//! A weighted blend of the normalized features, nudged for home ice and
//! muted early in the season while the sample is small:
//!
//!   rating = clamp(dampening(gp) · (Σ wᵢ·fᵢ + home_bonus), −2, +2)
//!
//! Home-minus-away ratings feed the logistic in [`super::probability`].

use serde::{Deserialize, Serialize};

use super::normalizer::{normalize, LeagueAverages};
use crate::db::models::TeamStats;

/// Ratings are clamped to ±this value.
pub const RATING_BOUND: f64 = 2.0;

/// Category weights. Defaults sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingWeights {
    /// Overall success rate
    pub win_pct: f64,
    pub goal_diff: f64,
    /// Goaltending
    pub save: f64,
    /// Power play and penalty kill
    pub special_teams: f64,
    pub shots_for: f64,
    pub shots_against: f64,
    /// Possession control
    pub corsi_diff: f64,
    /// Unblocked shot share
    pub fenwick_diff: f64,
    /// Physicality vs. discipline
    pub hits_penalties: f64,
    /// Puck management
    pub turnovers: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            win_pct: 0.30,
            goal_diff: 0.16,
            save: 0.08,
            special_teams: 0.14,
            shots_for: 0.03,
            shots_against: 0.03,
            corsi_diff: 0.06,
            fenwick_diff: 0.06,
            hits_penalties: 0.06,
            turnovers: 0.08,
        }
    }
}

impl RatingWeights {
    fn as_array(&self) -> [f64; 10] {
        [
            self.win_pct,
            self.goal_diff,
            self.save,
            self.special_teams,
            self.shots_for,
            self.shots_against,
            self.corsi_diff,
            self.fenwick_diff,
            self.hits_penalties,
            self.turnovers,
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub(crate) fn all_non_negative(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Everything the rating calculation reads besides the team itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub weights: RatingWeights,
    pub league: LeagueAverages,
    /// Added to the home team's raw rating (~5% edge)
    pub home_advantage: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            weights: RatingWeights::default(),
            league: LeagueAverages::default(),
            home_advantage: 0.06,
        }
    }
}

/// Early-season multiplier: 1/3 for the first ten games, 2/3 for the next
/// ten, full weight from game 20 on.
pub fn dampening(games_played: i64) -> f64 {
    ((1 + games_played / 10) as f64 / 3.0).min(1.0)
}

/// Power rating for one team, always finite and within ±[`RATING_BOUND`].
pub fn rating(team: &TeamStats, is_home: bool, config: &RatingConfig) -> f64 {
    let n = normalize(team, &config.league);
    let w = &config.weights;

    let mut rating = w.win_pct * n.win_pct
        + w.goal_diff * n.goal_diff
        + w.save * n.save
        + w.special_teams * n.special_teams
        + w.shots_for * n.shots_for
        + w.shots_against * n.shots_against
        + w.corsi_diff * n.corsi_diff
        + w.fenwick_diff * n.fenwick_diff
        + w.hits_penalties * n.hits_penalties
        + w.turnovers * n.turnovers;

    if is_home {
        rating += config.home_advantage;
    }
    rating *= dampening(n.games_played);

    // Infinite strength clamps to the bound; only an undefined sum is neutral
    if rating.is_nan() {
        return 0.0;
    }
    rating.clamp(-RATING_BOUND, RATING_BOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn team(wins: i32, losses: i32, otl: i32) -> TeamStats {
        TeamStats {
            name: "Test".into(),
            wins,
            losses,
            overtime_losses: otl,
            save_percentage: 0.905,
            powerplay_percentage: 0.21,
            penalty_kill_percentage: 0.79,
            ..Default::default()
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert_relative_eq!(RatingWeights::default().total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn dampening_steps_by_decade() {
        assert_relative_eq!(dampening(1), 1.0 / 3.0);
        assert_relative_eq!(dampening(9), 1.0 / 3.0);
        assert_relative_eq!(dampening(10), 2.0 / 3.0);
        assert_relative_eq!(dampening(19), 2.0 / 3.0);
        assert_relative_eq!(dampening(20), 1.0);
        assert_relative_eq!(dampening(82), 1.0);
    }

    #[test]
    fn home_bonus_is_dampened_like_everything_else() {
        let cfg = RatingConfig::default();
        let t = team(12, 6, 2);
        let diff = rating(&t, true, &cfg) - rating(&t, false, &cfg);
        assert_relative_eq!(diff, cfg.home_advantage, epsilon = 1e-12);

        let early = team(3, 2, 0);
        let diff = rating(&early, true, &cfg) - rating(&early, false, &cfg);
        assert_relative_eq!(diff, cfg.home_advantage / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn better_record_rates_higher() {
        let cfg = RatingConfig::default();
        assert!(rating(&team(14, 4, 2), false, &cfg) > rating(&team(6, 12, 2), false, &cfg));
    }

    #[test]
    fn zero_games_uses_minimum_dampening() {
        let cfg = RatingConfig::default();
        let r = rating(&TeamStats::default(), false, &cfg);
        // Blank team: neutral win%, no shots against, and a zero save fraction
        let raw = 0.30 * 0.5 + 0.03 * 1.5 + 0.08 * (-0.9 / 0.04);
        assert_relative_eq!(r, raw / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn pathological_input_is_clamped() {
        let cfg = RatingConfig::default();
        let blowout = TeamStats {
            wins: 40,
            goals_for: 2_000,
            corsi_for: 50_000,
            ..Default::default()
        };
        assert_relative_eq!(rating(&blowout, true, &cfg), RATING_BOUND);

        let collapse = TeamStats {
            losses: 40,
            goals_against: 2_000,
            corsi_against: 50_000,
            ..Default::default()
        };
        assert_relative_eq!(rating(&collapse, false, &cfg), -RATING_BOUND);
    }

    #[test]
    fn infinite_strength_clamps_instead_of_going_neutral() {
        let cfg = RatingConfig::default();
        let absurd = TeamStats {
            wins: 30,
            powerplay_percentage: 1e308,
            penalty_kill_percentage: 1e308,
            save_percentage: 1e308,
            ..Default::default()
        };
        assert_relative_eq!(rating(&absurd, false, &cfg), RATING_BOUND);

        let hopeless = TeamStats {
            losses: 30,
            save_percentage: -1e308,
            ..Default::default()
        };
        assert_relative_eq!(rating(&hopeless, false, &cfg), -RATING_BOUND);
    }

    #[test]
    fn undefined_sum_is_neutral() {
        let cfg = RatingConfig::default();
        // +inf special teams against -inf goaltending
        let contradictory = TeamStats {
            wins: 30,
            powerplay_percentage: 1e308,
            penalty_kill_percentage: 1e308,
            save_percentage: -1e308,
            ..Default::default()
        };
        assert_eq!(rating(&contradictory, false, &cfg), 0.0);
    }

    #[test]
    fn counters_near_i32_max_rate_within_bounds() {
        let cfg = RatingConfig::default();
        let giant = TeamStats {
            wins: i32::MAX,
            losses: i32::MAX,
            overtime_losses: i32::MAX,
            goals_for: i32::MAX,
            goals_against: i32::MIN,
            corsi_for: i32::MAX,
            corsi_against: i32::MIN,
            fenwick_for: i32::MIN,
            fenwick_against: i32::MAX,
            takeaways: i32::MAX,
            giveaways: i32::MIN,
            ..Default::default()
        };
        for is_home in [true, false] {
            let r = rating(&giant, is_home, &cfg);
            assert!(r.is_finite());
            assert!((-RATING_BOUND..=RATING_BOUND).contains(&r));
        }
    }

    #[test]
    fn ratings_stay_finite_and_bounded() {
        let cfg = RatingConfig::default();
        for wins in [0, 1, 15, 60] {
            for losses in [0, 3, 40] {
                for gf in [0, 100, 400] {
                    let t = TeamStats {
                        wins,
                        losses,
                        goals_for: gf,
                        goals_against: 150,
                        shots_for: gf * 9,
                        shots_against: 1_500,
                        hits: 900,
                        penalties: 0,
                        ..Default::default()
                    };
                    for is_home in [true, false] {
                        let r = rating(&t, is_home, &cfg);
                        assert!(r.is_finite());
                        assert!((-RATING_BOUND..=RATING_BOUND).contains(&r));
                    }
                }
            }
        }
    }

    #[test]
    fn partial_weights_file_keeps_other_defaults() {
        let cfg: RatingConfig =
            serde_json::from_str(r#"{"weights":{"win_pct":0.25},"home_advantage":0.05}"#).unwrap();
        assert_relative_eq!(cfg.weights.win_pct, 0.25);
        assert_relative_eq!(cfg.weights.goal_diff, 0.16);
        assert_relative_eq!(cfg.home_advantage, 0.05);
        assert_eq!(cfg.league, LeagueAverages::default());
    }
}
