pub mod normalizer;
pub mod odds;
pub mod probability;
pub mod rating;
pub mod report;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::models::{Matchup, TeamStats};
use probability::Verdict;
use rating::RatingConfig;
use report::{PredictionResult, ReportWriter, TOO_CLOSE_TO_CALL};

/// Tunable model parameters. Loaded from a JSON weights file; any field left
/// out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub rating: RatingConfig,
    /// Logistic steepness applied to the rating gap
    pub logistic_k: f64,
    /// Rating gap above which a prediction is flagged high-confidence
    pub confidence_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rating: RatingConfig::default(),
            logistic_k: 1.25,
            confidence_threshold: 0.30,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("rating weights must be finite and non-negative")]
    NegativeWeight,
    #[error("league reference values must be positive")]
    NonPositiveReference,
    #[error("logistic steepness must be positive, got {0}")]
    NonPositiveSteepness(f64),
    #[error("confidence threshold must be non-negative, got {0}")]
    NegativeThreshold(f64),
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rating.weights.all_non_negative() {
            return Err(ConfigError::NegativeWeight);
        }
        if !self.rating.league.all_positive() {
            return Err(ConfigError::NonPositiveReference);
        }
        if !(self.logistic_k.is_finite() && self.logistic_k > 0.0) {
            return Err(ConfigError::NonPositiveSteepness(self.logistic_k));
        }
        if self.confidence_threshold.is_nan() || self.confidence_threshold < 0.0 {
            return Err(ConfigError::NegativeThreshold(self.confidence_threshold));
        }
        let total = self.rating.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            warn!("Rating weights sum to {:.4}, not 1.0", total);
        }
        Ok(())
    }
}

/// Stateless matchup evaluator.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: ModelConfig,
}

impl Predictor {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Score one game. Pure: identical inputs give an identical result.
    pub fn evaluate(&self, game_id: i64, home: &TeamStats, away: &TeamStats) -> PredictionResult {
        let cfg = &self.config;
        let rating_home = rating::rating(home, true, &cfg.rating);
        let rating_away = rating::rating(away, false, &cfg.rating);

        let prob_home = probability::home_win_probability(rating_home, rating_away, cfg.logistic_k);
        let prob_away = 1.0 - prob_home;

        let (winner, winner_prob) = match probability::verdict(prob_home) {
            Verdict::Home => (home.name.clone(), prob_home),
            Verdict::Away => (away.name.clone(), prob_away),
            Verdict::TooClose => (TOO_CLOSE_TO_CALL.to_string(), 0.5),
        };

        debug!(
            game_id,
            home = %home.name,
            away = %away.name,
            rating_home,
            rating_away,
            prob_home,
            "Evaluated matchup"
        );

        PredictionResult {
            game_id,
            home_team: home.name.clone(),
            away_team: away.name.clone(),
            predicted_winner: winner,
            probability: report::round3(winner_prob),
            american_odds: odds::to_american_odds(winner_prob),
            notes: report::build_notes(
                rating_home,
                rating_away,
                prob_home,
                prob_away,
                cfg.confidence_threshold,
            ),
        }
    }

    /// Evaluate every matchup that has both teams; others are skipped.
    pub fn predict_batch(&self, matchups: &[Matchup]) -> Vec<PredictionResult> {
        matchups
            .iter()
            .filter_map(|m| match (&m.home, &m.away) {
                (Some(home), Some(away)) => Some(self.evaluate(m.id, home, away)),
                _ => {
                    warn!(
                        game_id = m.id,
                        home_missing = m.home.is_none(),
                        away_missing = m.away.is_none(),
                        "Skipping game without both teams"
                    );
                    None
                }
            })
            .collect()
    }

    /// Evaluate a day's games and write the day's report. Report failures are
    /// logged; the results are returned either way.
    pub fn predict_for_date(
        &self,
        date: NaiveDate,
        matchups: &[Matchup],
        writer: &ReportWriter,
    ) -> Vec<PredictionResult> {
        let results = self.predict_batch(matchups);
        info!(
            "Predicted {}/{} game(s) for {}",
            results.len(),
            matchups.len(),
            date
        );
        writer.write_logged(date, &results);
        results
    }
}
