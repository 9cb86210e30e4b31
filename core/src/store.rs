//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine reaches it through the `SaveStore` trait; the sync record
//! accessors are for the host's server-side tooling.

use crate::{
    error::GameResult,
    persistence::SaveStore,
    snapshot::Snapshot,
    sync::ProgressRecord,
    types::PlayerId,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStore {
    conn:      Connection,
    path:      Option<String>, // None for :memory:, Some(path) for file
    player_id: PlayerId,
}

impl SqliteStore {
    pub fn open(path: &str, player_id: impl Into<PlayerId>) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: readers don't block the autosave writer.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
            player_id: player_id.into(),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory(player_id: impl Into<PlayerId>) -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None, player_id: player_id.into() })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> GameResult<Self> {
        match &self.path {
            Some(p) => Self::open(p, self.player_id.clone()),
            None => Self::in_memory(self.player_id.clone()),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_player_progress.sql"))?;
        Ok(())
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    // ── Player progress ────────────────────────────────────────

    pub fn upsert_progress(&self, player_id: &str, snapshot: &Snapshot) -> GameResult<()> {
        let record = ProgressRecord::from_snapshot(snapshot);
        let state_json = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT INTO player_progress (
                player_id, coins, energy, max_energy, coins_per_tap, energy_regen_rate,
                total_earned, total_taps, boosters, state_json, last_save
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(player_id) DO UPDATE SET
                coins = excluded.coins,
                energy = excluded.energy,
                max_energy = excluded.max_energy,
                coins_per_tap = excluded.coins_per_tap,
                energy_regen_rate = excluded.energy_regen_rate,
                total_earned = excluded.total_earned,
                total_taps = excluded.total_taps,
                boosters = excluded.boosters,
                state_json = excluded.state_json,
                last_save = excluded.last_save",
            params![
                player_id,
                record.coins as i64,
                record.energy,
                record.max_energy,
                record.coins_per_tap as i64,
                record.energy_regen_rate as i64,
                record.total_earned as i64,
                record.total_taps as i64,
                record.boosters_json()?,
                state_json,
                snapshot.last_save_timestamp.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    pub fn state_json(&self, player_id: &str) -> GameResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT state_json FROM player_progress WHERE player_id = ?1",
                params![player_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }

    /// The sync columns for one player, as a server would report them.
    pub fn progress_record(&self, player_id: &str) -> GameResult<Option<ProgressRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT coins, energy, max_energy, coins_per_tap, energy_regen_rate,
                        total_earned, total_taps, boosters
                 FROM player_progress WHERE player_id = ?1",
                params![player_id],
                |row| {
                    Ok(ProgressRecord {
                        coins:             row.get::<_, i64>(0)? as u64,
                        energy:            row.get(1)?,
                        max_energy:        row.get(2)?,
                        coins_per_tap:     row.get::<_, i64>(3)? as u64,
                        energy_regen_rate: row.get::<_, i64>(4)? as u64,
                        total_earned:      row.get::<_, i64>(5)? as u64,
                        total_taps:        row.get::<_, i64>(6)? as u64,
                        boosters:          ProgressRecord::parse_boosters(&row.get::<_, String>(7)?),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // ── Test / summary helpers ─────────────────────────────────

    /// Number of player rows (for tests).
    pub fn player_count(&self) -> GameResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM player_progress",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl SaveStore for SqliteStore {
    fn name(&self) -> &'static str { "sqlite" }

    fn read(&self) -> GameResult<Option<String>> {
        self.state_json(&self.player_id)
    }

    fn write(&self, snapshot: &Snapshot) -> GameResult<()> {
        self.upsert_progress(&self.player_id, snapshot)
    }
}
