use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info};

/// Winner name used when neither side is favoured.
pub const TOO_CLOSE_TO_CALL: &str = "Too close to call";

/// One evaluated matchup. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub game_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    /// Winner's probability, rounded to 3 decimals (0.0–1.0)
    pub probability: f64,
    /// e.g. "-155" or "+210"
    pub american_odds: String,
    pub notes: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report lock poisoned for {0}")]
    LockPoisoned(NaiveDate),
}

pub fn round3(p: f64) -> f64 {
    (p * 1000.0).round() / 1000.0
}

/// Explanatory line attached to each prediction.
pub fn build_notes(
    rating_home: f64,
    rating_away: f64,
    prob_home: f64,
    prob_away: f64,
    confidence_threshold: f64,
) -> String {
    let mut notes = format!(
        "Home rating: {:.3}, Away rating: {:.3}. HomeProb: {:.3}, AwayProb: {:.3}.",
        rating_home, rating_away, prob_home, prob_away
    );
    let gap = (rating_home - rating_away).abs();
    if gap > confidence_threshold {
        let _ = write!(notes, " High confidence: rating gap {:.3}.", gap);
    }
    notes
}

/// Daily report text, one block per matchup.
pub fn render(results: &[PredictionResult]) -> String {
    let mut out = String::new();
    for r in results {
        let _ = writeln!(out, "{} Vs. {}", r.home_team, r.away_team);
        let _ = writeln!(out, "Winner: {} ({})", r.predicted_winner, r.american_odds);
        if !r.notes.is_empty() {
            let _ = writeln!(out, "Notes: {}", r.notes);
        }
        out.push('\n');
    }
    out
}

/// `<folder>/<MM-dd-yyyy>.txt`
pub fn report_path(folder: &Path, date: NaiveDate) -> PathBuf {
    folder.join(format!("{}.txt", date.format("%m-%d-%Y")))
}

/// Writes daily reports, serializing writers that target the same date.
#[derive(Clone)]
pub struct ReportWriter {
    folder: PathBuf,
    locks: Arc<Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>>,
}

impl ReportWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn date_lock(&self, date: NaiveDate) -> Result<Arc<Mutex<()>>, ReportError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| ReportError::LockPoisoned(date))?;
        Ok(locks.entry(date).or_default().clone())
    }

    /// Drop the date's entry once no other writer holds or awaits it.
    fn release(&self, date: NaiveDate, lock: &Arc<Mutex<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            // One reference in the map, one held by the caller
            if Arc::strong_count(lock) == 2 {
                locks.remove(&date);
            }
        }
    }

    #[cfg(test)]
    fn tracked_dates(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }

    /// Overwrite the report for `date` with `results`.
    pub fn write(&self, date: NaiveDate, results: &[PredictionResult]) -> Result<PathBuf, ReportError> {
        let lock = self.date_lock(date)?;
        let written = lock
            .lock()
            .map_err(|_| ReportError::LockPoisoned(date))
            .and_then(|_guard| self.write_unlocked(date, results));
        self.release(date, &lock);
        written
    }

    fn write_unlocked(&self, date: NaiveDate, results: &[PredictionResult]) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.folder).map_err(|source| ReportError::CreateFolder {
            path: self.folder.clone(),
            source,
        })?;
        let path = report_path(&self.folder, date);
        fs::write(&path, render(results)).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Like [`write`](Self::write), but a failure only produces an error event.
    pub fn write_logged(&self, date: NaiveDate, results: &[PredictionResult]) -> Option<PathBuf> {
        match self.write(date, results) {
            Ok(path) => {
                info!(
                    "Wrote {} prediction(s) to {}",
                    results.len(),
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                error!(date = %date, error = %e, "Failed to write prediction report");
                None
            }
        }
    }
}
