use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

mod api;
mod config;
mod db;
mod engine;
mod ingest;

use api::AppState;
use config::{Command, Config};
use db::Database;
use engine::report::{render, ReportWriter};
use engine::Predictor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    match &config.command {
        Command::ImportTeams { path } => {
            ingest::import_teams(&db, path)?;
        }
        Command::ImportGames { path } => {
            ingest::import_games(&db, path)?;
        }
        Command::Predict { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let predictor = Predictor::new(config.model_config()?);
            let writer = ReportWriter::new(&config.report_folder);
            let matchups = db.matchups_for_date(date)?;
            let results = predictor.predict_for_date(date, &matchups, &writer);
            print!("{}", render(&results));
        }
        Command::Serve => {
            let model = config.model_config()?;
            info!(
                "Model: k={}, home advantage={}, weights total={:.2}",
                model.logistic_k,
                model.rating.home_advantage,
                model.rating.weights.total()
            );
            let writer = ReportWriter::new(&config.report_folder);
            let addr: SocketAddr = config.api_addr.parse()?;
            info!(
                "Prediction API listening on http://{} (reports in {})",
                addr,
                writer.folder().display()
            );
            let app = api::router(AppState {
                db,
                predictor: Predictor::new(model),
                writer,
            });
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
