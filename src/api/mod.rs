use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::db::models::{Matchup, ScheduledGame, StoredGame, TeamStats};
use crate::db::Database;
use crate::engine::report::{PredictionResult, ReportWriter};
use crate::engine::Predictor;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub predictor: Predictor,
    pub writer: ReportWriter,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/teams", get(teams_handler).post(upsert_team_handler))
        .route(
            "/api/teams/:name",
            get(team_handler).delete(delete_team_handler),
        )
        .route("/api/games", get(games_handler).post(schedule_game_handler))
        .route("/api/games/:id", get(game_handler).delete(delete_game_handler))
        .route("/api/predict", get(predict_stored_handler).post(predict_posted_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Body of `POST /api/predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub date: Option<NaiveDate>,
    pub matchups: Vec<MatchupRequest>,
}

#[derive(Debug, Deserialize)]
pub struct MatchupRequest {
    pub id: Option<i64>,
    pub home: Option<TeamStats>,
    pub away: Option<TeamStats>,
}

impl PredictRequest {
    /// Posted matchups without an id are numbered by position (1-based).
    fn into_matchups(self, date: NaiveDate) -> Vec<Matchup> {
        self.matchups
            .into_iter()
            .enumerate()
            .map(|(i, m)| Matchup {
                id: m.id.unwrap_or(i as i64 + 1),
                date,
                home: m.home.map(TeamStats::canonicalize),
                away: m.away.map(TeamStats::canonicalize),
            })
            .collect()
    }
}

fn internal(e: impl ToString) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found(what: String) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn bad_request(msg: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

fn deleted(removed: bool, what: String) -> Result<StatusCode, (StatusCode, String)> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(what))
    }
}

/// GET /api/health
async fn health_handler() -> &'static str {
    "ok"
}

/// GET /api/teams
async fn teams_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TeamStats>> {
    state.db.list_teams().map(Json).map_err(internal)
}

/// GET /api/teams/:name
async fn team_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<TeamStats> {
    match state.db.get_team(&name).map_err(internal)? {
        Some(team) => Ok(Json(team)),
        None => Err(not_found(format!("team {name}"))),
    }
}

/// POST /api/teams (insert or replace by name)
async fn upsert_team_handler(
    State(state): State<Arc<AppState>>,
    Json(team): Json<TeamStats>,
) -> ApiResult<TeamStats> {
    if team.name.trim().is_empty() {
        return Err(bad_request("team name is required"));
    }
    let team = team.canonicalize();
    state.db.upsert_team(&team).map_err(internal)?;
    info!("Stored team snapshot: {}", team.name);
    Ok(Json(team))
}

/// DELETE /api/teams/:name
async fn delete_team_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.db.delete_team(&name).map_err(internal)?;
    deleted(removed, format!("team {name}"))
}

/// GET /api/games[?date=YYYY-MM-DD]
async fn games_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Vec<StoredGame>> {
    state.db.list_games(query.date).map(Json).map_err(internal)
}

/// GET /api/games/:id
async fn game_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StoredGame> {
    match state.db.get_game(id).map_err(internal)? {
        Some(game) => Ok(Json(game)),
        None => Err(not_found(format!("game {id}"))),
    }
}

/// POST /api/games
async fn schedule_game_handler(
    State(state): State<Arc<AppState>>,
    Json(game): Json<ScheduledGame>,
) -> ApiResult<StoredGame> {
    if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
        return Err(bad_request("both home_team and away_team are required"));
    }
    let id = state.db.insert_game(&game).map_err(internal)?;
    info!(
        "Scheduled game {}: {} vs {} on {}",
        id, game.home_team, game.away_team, game.date
    );
    Ok(Json(StoredGame {
        id,
        date: game.date,
        home_team: game.home_team,
        away_team: game.away_team,
    }))
}

/// DELETE /api/games/:id
async fn delete_game_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.db.delete_game(id).map_err(internal)?;
    deleted(removed, format!("game {id}"))
}

/// GET /api/predict?date=YYYY-MM-DD
async fn predict_stored_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Vec<PredictionResult>> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    tokio::task::spawn_blocking(move || {
        let matchups = state.db.matchups_for_date(date)?;
        Ok::<_, anyhow::Error>(state.predictor.predict_for_date(date, &matchups, &state.writer))
    })
    .await
    .map_err(internal)?
    .map(Json)
    .map_err(internal)
}

/// POST /api/predict
async fn predict_posted_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Vec<PredictionResult>> {
    let date = request.date.unwrap_or_else(|| Local::now().date_naive());
    let matchups = request.into_matchups(date);
    tokio::task::spawn_blocking(move || {
        state.predictor.predict_for_date(date, &matchups, &state.writer)
    })
    .await
    .map(Json)
    .map_err(internal)
}
