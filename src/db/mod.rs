use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    // ── Teams ────────────────────────────────────────────────────────────────

    /// Insert or replace a team snapshot, keyed by name.
    pub fn upsert_team(&self, team: &TeamStats) -> Result<()> {
        let team = team.clone().canonicalize();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO teams (
                name, wins, losses, overtime_losses, goals_for, goals_against,
                shots_for, shots_against, hits, powerplays, penalties,
                powerplay_percentage, penalty_kill_percentage, save_percentage,
                giveaways, takeaways, corsi_for, corsi_against,
                fenwick_for, fenwick_against, opponents_corsi_for, opponents_fenwick_for
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22)
             ON CONFLICT(name) DO UPDATE SET
                wins=excluded.wins,
                losses=excluded.losses,
                overtime_losses=excluded.overtime_losses,
                goals_for=excluded.goals_for,
                goals_against=excluded.goals_against,
                shots_for=excluded.shots_for,
                shots_against=excluded.shots_against,
                hits=excluded.hits,
                powerplays=excluded.powerplays,
                penalties=excluded.penalties,
                powerplay_percentage=excluded.powerplay_percentage,
                penalty_kill_percentage=excluded.penalty_kill_percentage,
                save_percentage=excluded.save_percentage,
                giveaways=excluded.giveaways,
                takeaways=excluded.takeaways,
                corsi_for=excluded.corsi_for,
                corsi_against=excluded.corsi_against,
                fenwick_for=excluded.fenwick_for,
                fenwick_against=excluded.fenwick_against,
                opponents_corsi_for=excluded.opponents_corsi_for,
                opponents_fenwick_for=excluded.opponents_fenwick_for",
            params![
                team.name,
                team.wins,
                team.losses,
                team.overtime_losses,
                team.goals_for,
                team.goals_against,
                team.shots_for,
                team.shots_against,
                team.hits,
                team.powerplays,
                team.penalties,
                team.powerplay_percentage,
                team.penalty_kill_percentage,
                team.save_percentage,
                team.giveaways,
                team.takeaways,
                team.corsi_for,
                team.corsi_against,
                team.fenwick_for,
                team.fenwick_against,
                team.opponents_corsi_for,
                team.opponents_fenwick_for,
            ],
        )?;
        Ok(())
    }

    /// Look up a team by exact name
    pub fn get_team(&self, name: &str) -> Result<Option<TeamStats>> {
        let conn = self.lock()?;
        load_team(&conn, name)
    }

    /// All teams in standings order (points, then wins)
    pub fn list_teams(&self) -> Result<Vec<TeamStats>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams
             ORDER BY (wins * 2 + overtime_losses) DESC, wins DESC, name ASC"
        ))?;
        let teams = stmt
            .query_map([], map_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    /// Remove a team by name. Returns whether a row was deleted; games that
    /// reference it stay scheduled and are skipped at prediction time.
    pub fn delete_team(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM teams WHERE name = ?1", params![name])?;
        Ok(n > 0)
    }

    // ── Games ────────────────────────────────────────────────────────────────

    /// Schedule a game; team names are resolved lazily at prediction time.
    pub fn insert_game(&self, game: &ScheduledGame) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO games (game_date, home_team, away_team) VALUES (?1, ?2, ?3)",
            params![game.date, game.home_team, game.away_team],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Scheduled games, optionally restricted to one date, by date then id.
    pub fn list_games(&self, date: Option<NaiveDate>) -> Result<Vec<StoredGame>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, game_date, home_team, away_team FROM games
             WHERE ?1 IS NULL OR game_date = ?1
             ORDER BY game_date ASC, id ASC",
        )?;
        let games = stmt
            .query_map(params![date], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    pub fn get_game(&self, id: i64) -> Result<Option<StoredGame>> {
        let conn = self.lock()?;
        let game = conn
            .query_row(
                "SELECT id, game_date, home_team, away_team FROM games WHERE id = ?1",
                params![id],
                map_game,
            )
            .optional()?;
        Ok(game)
    }

    /// Remove a scheduled game. Returns whether a row was deleted.
    pub fn delete_game(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM games WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Games scheduled on `date`, with team snapshots resolved where possible.
    /// A side whose name no longer matches a stored team comes back as `None`.
    pub fn matchups_for_date(&self, date: NaiveDate) -> Result<Vec<Matchup>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, home_team, away_team FROM games WHERE game_date = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![date], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut matchups = Vec::with_capacity(rows.len());
        for (id, home, away) in rows {
            matchups.push(Matchup {
                id,
                date,
                home: load_team(&conn, &home)?,
                away: load_team(&conn, &away)?,
            });
        }
        Ok(matchups)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

const TEAM_COLUMNS: &str = "name, wins, losses, overtime_losses, goals_for, goals_against,
    shots_for, shots_against, hits, powerplays, penalties,
    powerplay_percentage, penalty_kill_percentage, save_percentage,
    giveaways, takeaways, corsi_for, corsi_against,
    fenwick_for, fenwick_against, opponents_corsi_for, opponents_fenwick_for";

fn load_team(conn: &Connection, name: &str) -> Result<Option<TeamStats>> {
    let team = conn
        .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE name = ?1"),
            params![name],
            map_team,
        )
        .optional()?;
    Ok(team)
}

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<TeamStats> {
    Ok(TeamStats {
        name: row.get(0)?,
        wins: row.get(1)?,
        losses: row.get(2)?,
        overtime_losses: row.get(3)?,
        goals_for: row.get(4)?,
        goals_against: row.get(5)?,
        shots_for: row.get(6)?,
        shots_against: row.get(7)?,
        hits: row.get(8)?,
        powerplays: row.get(9)?,
        penalties: row.get(10)?,
        powerplay_percentage: row.get(11)?,
        penalty_kill_percentage: row.get(12)?,
        save_percentage: row.get(13)?,
        giveaways: row.get(14)?,
        takeaways: row.get(15)?,
        corsi_for: row.get(16)?,
        corsi_against: row.get(17)?,
        fenwick_for: row.get(18)?,
        fenwick_against: row.get(19)?,
        opponents_corsi_for: row.get(20)?,
        opponents_fenwick_for: row.get(21)?,
    })
}

fn map_game(row: &rusqlite::Row) -> rusqlite::Result<StoredGame> {
    Ok(StoredGame {
        id: row.get(0)?,
        date: row.get(1)?,
        home_team: row.get(2)?,
        away_team: row.get(3)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT    NOT NULL UNIQUE,
    wins                    INTEGER NOT NULL DEFAULT 0,
    losses                  INTEGER NOT NULL DEFAULT 0,
    overtime_losses         INTEGER NOT NULL DEFAULT 0,
    goals_for               INTEGER NOT NULL DEFAULT 0,
    goals_against           INTEGER NOT NULL DEFAULT 0,
    shots_for               INTEGER NOT NULL DEFAULT 0,
    shots_against           INTEGER NOT NULL DEFAULT 0,
    hits                    INTEGER NOT NULL DEFAULT 0,
    powerplays              INTEGER NOT NULL DEFAULT 0,
    penalties               INTEGER NOT NULL DEFAULT 0,
    powerplay_percentage    REAL    NOT NULL DEFAULT 0,
    penalty_kill_percentage REAL    NOT NULL DEFAULT 0,
    save_percentage         REAL    NOT NULL DEFAULT 0,
    giveaways               INTEGER NOT NULL DEFAULT 0,
    takeaways               INTEGER NOT NULL DEFAULT 0,
    corsi_for               INTEGER NOT NULL DEFAULT 0,
    corsi_against           INTEGER NOT NULL DEFAULT 0,
    fenwick_for             INTEGER NOT NULL DEFAULT 0,
    fenwick_against         INTEGER NOT NULL DEFAULT 0,
    opponents_corsi_for     INTEGER NOT NULL DEFAULT 0,
    opponents_fenwick_for   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS games (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    game_date   TEXT    NOT NULL,
    home_team   TEXT    NOT NULL,
    away_team   TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_games_date ON games(game_date);
"#;
