//! Player leaderboard
//!
//! Records are keyed by player name and only touched at session boundaries
//! (game over, name entry), never from inside a tick. `ScoreTable` is the
//! built-in store, persisted to LocalStorage on the web.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entries shown on the game-over screen
pub const LEADERBOARD_SIZE: usize = 10;

/// Name used when the player leaves the field blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// One player's scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    /// Score of the most recent session
    pub score: u64,
    pub best_score: u64,
}

/// Query contract of a score backend
pub trait ScoreStore {
    type Error: std::error::Error;

    fn find_by_name(&self, name: &str) -> Result<Option<ScoreRecord>, Self::Error>;

    /// Add a record for a name not yet stored
    fn insert(&mut self, record: ScoreRecord) -> Result<(), Self::Error>;

    /// Replace the record with the same name
    fn update(&mut self, record: ScoreRecord) -> Result<(), Self::Error>;

    fn list_all(&self) -> Result<Vec<ScoreRecord>, Self::Error>;
}

/// Errors from `ScoreTable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Insert of a name that already has a record
    Duplicate(String),
    /// Update of a name with no record
    Missing(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Duplicate(name) => write!(f, "player `{}` already exists", name),
            StoreError::Missing(name) => write!(f, "no record for player `{}`", name),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory score store, serialized whole
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
}

impl ScoreTable {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "skyward_scores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load the table from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<ScoreTable>(&json) {
                    Ok(table) => {
                        log::info!("Loaded {} player records", table.len());
                        return table;
                    }
                    Err(e) => log::warn!("Discarding unreadable score table: {}", e),
                }
            }
        }

        log::info!("No player records found, starting fresh");
        Self::new()
    }

    /// Save the table to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Player records saved ({} players)", self.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ScoreStore for ScoreTable {
    type Error = StoreError;

    fn find_by_name(&self, name: &str) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self.records.iter().find(|r| r.name == name).cloned())
    }

    fn insert(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        if self.records.iter().any(|r| r.name == record.name) {
            return Err(StoreError::Duplicate(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    fn update(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::Missing(record.name)),
        }
    }

    fn list_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

/// What recording a finished session did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// First session for this name
    NewPlayer,
    /// Beat the stored best
    NewBest,
    /// Stored, best unchanged
    Recorded,
}

/// Session-boundary rules over any `ScoreStore`
#[derive(Debug, Clone, Default)]
pub struct Leaderboard<S> {
    store: S,
}

impl<S: ScoreStore> Leaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store the result of a finished session for `name`
    pub fn record_session(&mut self, name: &str, score: u64) -> Result<SessionOutcome, S::Error> {
        let name = normalize_name(name);
        match self.store.find_by_name(&name)? {
            None => {
                self.store.insert(ScoreRecord {
                    name,
                    score,
                    best_score: score,
                })?;
                Ok(SessionOutcome::NewPlayer)
            }
            Some(mut record) => {
                record.score = score;
                let outcome = if score > record.best_score {
                    record.best_score = score;
                    SessionOutcome::NewBest
                } else {
                    SessionOutcome::Recorded
                };
                self.store.update(record)?;
                Ok(outcome)
            }
        }
    }

    /// Best score on record for `name`
    pub fn best_for(&self, name: &str) -> Result<Option<u64>, S::Error> {
        Ok(self
            .store
            .find_by_name(&normalize_name(name))?
            .map(|r| r.best_score))
    }

    /// Top `limit` records by best score, ties by name
    pub fn ranked(&self, limit: usize) -> Result<Vec<ScoreRecord>, S::Error> {
        let mut records = self.store.list_all()?;
        records.sort_by(|a, b| b.best_score.cmp(&a.best_score).then_with(|| a.name.cmp(&b.name)));
        records.truncate(limit);
        Ok(records)
    }
}

/// Trimmed name, or the default for a blank one
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name.to_string()
    }
}
