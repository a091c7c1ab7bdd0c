use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::engine::ModelConfig;

/// NHL matchup predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "hockey-predictor", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "hockey.db")]
    pub database_path: String,

    /// Folder daily prediction reports are written to
    #[arg(long, env = "REPORT_FOLDER", default_value = "GamePredictions")]
    pub report_folder: PathBuf,

    /// HTTP API listen address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8080")]
    pub api_addr: String,

    /// JSON file overriding model weights and league references
    #[arg(long, env = "WEIGHTS_FILE")]
    pub weights_file: Option<PathBuf>,

    /// Logistic steepness for rating gap → probability
    #[arg(long, env = "LOGISTIC_K")]
    pub logistic_k: Option<f64>,

    /// Rating bonus for the home team
    #[arg(long, env = "HOME_ADVANTAGE")]
    pub home_advantage: Option<f64>,

    /// Rating gap flagged as high confidence in report notes
    #[arg(long, env = "CONFIDENCE_THRESHOLD")]
    pub confidence_threshold: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the prediction API
    Serve,
    /// Predict stored games for a date and write the daily report
    Predict {
        /// Game date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Upsert team snapshots from a JSON array
    ImportTeams { path: PathBuf },
    /// Schedule games from a JSON array of {date, home_team, away_team}
    ImportGames { path: PathBuf },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if matches!(self.command, Command::Serve) {
            self.api_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("invalid api_addr {}", self.api_addr))?;
        }
        self.model_config()?;
        Ok(())
    }

    /// Defaults, then the weights file, then individual flags.
    pub fn model_config(&self) -> anyhow::Result<ModelConfig> {
        let mut model = match &self.weights_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read weights file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse weights file {}", path.display()))?
            }
            None => ModelConfig::default(),
        };
        if let Some(k) = self.logistic_k {
            model.logistic_k = k;
        }
        if let Some(bonus) = self.home_advantage {
            model.rating.home_advantage = bonus;
        }
        if let Some(threshold) = self.confidence_threshold {
            model.confidence_threshold = threshold;
        }
        model.validate()?;
        Ok(model)
    }
}
