use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreResult;
use crate::session::SessionResult;

const KEY_WPM: &str = "best_wpm";
const KEY_ACCURACY: &str = "best_accuracy";
const KEY_ACHIEVED_AT: &str = "best_at";

/// Highest wpm reached so far and the accuracy it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct BestScore {
    pub wpm: u32,
    pub accuracy: u32,
    pub achieved_at: Option<DateTime<Local>>,
}

impl BestScore {
    pub fn from_result(result: &SessionResult) -> Self {
        Self {
            wpm: result.wpm,
            accuracy: result.accuracy,
            achieved_at: Some(Local::now()),
        }
    }
}

/// Durable home of the best score.
pub trait BestScoreStore {
    fn load(&self) -> StoreResult<Option<BestScore>>;
    fn save(&self, best: &BestScore) -> StoreResult<()>;
}

/// Key/value table in a small SQLite database.
#[derive(Debug)]
pub struct SqliteBestScoreStore {
    conn: Connection,
}

impl SqliteBestScoreStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS best_score (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM best_score WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl BestScoreStore for SqliteBestScoreStore {
    fn load(&self) -> StoreResult<Option<BestScore>> {
        let Some(wpm) = self.get(KEY_WPM)?.and_then(|v| v.parse::<u32>().ok()) else {
            return Ok(None);
        };
        let accuracy = self
            .get(KEY_ACCURACY)?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let achieved_at = self
            .get(KEY_ACHIEVED_AT)?
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Local));

        Ok(Some(BestScore {
            wpm,
            accuracy,
            achieved_at,
        }))
    }

    fn save(&self, best: &BestScore) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut rows = vec![
            (KEY_WPM, best.wpm.to_string()),
            (KEY_ACCURACY, best.accuracy.to_string()),
        ];
        match best.achieved_at {
            Some(at) => rows.push((KEY_ACHIEVED_AT, at.to_rfc3339())),
            // an undated best must not inherit the previous date
            None => {
                tx.execute("DELETE FROM best_score WHERE key = ?1", [KEY_ACHIEVED_AT])?;
            }
        }
        for (key, value) in rows {
            tx.execute(
                "INSERT OR REPLACE INTO best_score (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryBestScoreStore {
    slot: Arc<Mutex<Option<BestScore>>>,
}

impl MemoryBestScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BestScoreStore for MemoryBestScoreStore {
    fn load(&self) -> StoreResult<Option<BestScore>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, best: &BestScore) -> StoreResult<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(best.clone());
        Ok(())
    }
}

/// Reads the best score once and writes it back only when beaten.
pub struct BestScoreTracker {
    store: Box<dyn BestScoreStore>,
    best: Option<BestScore>,
}

impl BestScoreTracker {
    pub fn load(store: Box<dyn BestScoreStore>) -> Self {
        let best = match store.load() {
            Ok(best) => best,
            Err(e) => {
                tracing::warn!(error = %e, "could not read best score");
                None
            }
        };
        Self { store, best }
    }

    pub fn best(&self) -> Option<&BestScore> {
        self.best.as_ref()
    }

    /// Compare-and-write. Returns true when `result` is a new best, i.e.
    /// its wpm strictly exceeds the stored one.
    pub fn record(&mut self, result: &SessionResult) -> bool {
        let current = self.best.as_ref().map_or(0, |b| b.wpm);
        if result.wpm <= current {
            return false;
        }

        let best = BestScore::from_result(result);
        if let Err(e) = self.store.save(&best) {
            tracing::warn!(error = %e, "could not persist best score");
        }
        tracing::info!(wpm = best.wpm, accuracy = best.accuracy, "new best score");
        self.best = Some(best);
        true
    }
}
