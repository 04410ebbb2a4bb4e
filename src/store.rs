//! History and leaderboard persistence.
//!
//! Each store owns its entries in memory and mirrors them to a [`Backend`]
//! after every mutation. Backend failures never reach the caller: reads fall
//! back to an empty list, writes are logged and the in-memory state carries on.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::ValueEnum;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::mode::TestMode;
use crate::record::{GameResult, LeaderboardEntry};

pub const HISTORY_RECORD: &str = "history";
pub const LEADERBOARD_RECORD: &str = "leaderboard";
pub const MAX_ENTRIES_PER_MODE: usize = 10;

/// Where records live on disk.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Json,
}

/// One named record holding a serialized JSON document.
pub trait Backend {
    /// `None` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&self, body: &str) -> Result<(), StoreError>;
    fn remove(&self) -> Result<(), StoreError>;
}

/// A record stored as its own JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Backend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, body: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // write-then-rename so a crash never leaves half a document behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A record stored as one row of the `records` table.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
    name: String,
}

impl SqliteBackend {
    pub fn open<P: AsRef<Path>>(path: P, name: &str) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?, name)
    }

    pub fn in_memory(name: &str) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, name)
    }

    fn with_connection(conn: Connection, name: &str) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self {
            conn,
            name: name.to_string(),
        })
    }
}

impl Backend for SqliteBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE name = ?1",
                params![self.name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn write(&self, body: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO records (name, body, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
            params![self.name, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM records WHERE name = ?1", params![self.name])?;
        Ok(())
    }
}

/// Keeps the record in memory only. Used in tests and when the configured
/// backend cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    body: RefCell<Option<String>>,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: RefCell::new(Some(body.into())),
            fail_writes: false,
        }
    }

    /// Every write and remove fails with an i/o error.
    pub fn failing() -> Self {
        Self {
            body: RefCell::new(None),
            fail_writes: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.body.borrow().clone())
    }

    fn write(&self, body: &str) -> Result<(), StoreError> {
        self.check()?;
        *self.body.borrow_mut() = Some(body.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.check()?;
        self.body.borrow_mut().take();
        Ok(())
    }
}

/// Open the backend for `record`, falling back to memory when it can't be opened.
pub fn open_backend(kind: StorageKind, dir: &Path, record: &str) -> Box<dyn Backend> {
    match kind {
        StorageKind::Json => Box::new(JsonFileBackend::new(dir.join(format!("{record}.json")))),
        StorageKind::Sqlite => match SqliteBackend::open(dir.join("reflex.db"), record) {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                log::warn!("cannot open database in {}: {e}; keeping {record} in memory", dir.display());
                Box::new(MemoryBackend::new())
            }
        },
    }
}

fn load_entries<T: DeserializeOwned>(backend: &dyn Backend, record: &str) -> Vec<T> {
    let body = match backend.read() {
        Ok(Some(body)) => body,
        Ok(None) => return vec![],
        Err(e) => {
            log::warn!("failed to read {record}: {e}");
            return vec![];
        }
    };
    serde_json::from_str(&body).unwrap_or_else(|e| {
        log::warn!("discarding malformed {record}: {e}");
        vec![]
    })
}

fn persist<T: Serialize>(backend: &dyn Backend, record: &str, entries: &[T]) {
    let result = serde_json::to_string(entries)
        .map_err(StoreError::from)
        .and_then(|body| backend.write(&body));
    if let Err(e) = result {
        log::warn!("failed to save {record}, keeping it in memory: {e}");
    }
}

fn remove(backend: &dyn Backend, record: &str) {
    if let Err(e) = backend.remove() {
        log::warn!("failed to remove {record}: {e}");
    }
}

/// Every finished session, oldest first.
pub struct HistoryStore {
    backend: Box<dyn Backend>,
    entries: Vec<GameResult>,
}

impl HistoryStore {
    pub fn open(backend: Box<dyn Backend>) -> Self {
        let entries = load_entries(backend.as_ref(), HISTORY_RECORD);
        log::debug!("loaded {} history entries", entries.len());
        Self { backend, entries }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryBackend::new()))
    }

    pub fn entries(&self) -> &[GameResult] {
        &self.entries
    }

    pub fn append(&mut self, result: GameResult) {
        self.entries.push(result);
        persist(self.backend.as_ref(), HISTORY_RECORD, &self.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        remove(self.backend.as_ref(), HISTORY_RECORD);
    }
}

/// Top results per mode, best first.
pub struct Leaderboard {
    backend: Box<dyn Backend>,
    entries: Vec<LeaderboardEntry>,
}

fn top_for_mode(entries: &[LeaderboardEntry], mode: TestMode) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<LeaderboardEntry> = entries
        .iter()
        .filter(|e| e.mode() == mode)
        .cloned()
        .collect();
    // stable, so equal times keep insertion order
    ranked.sort_by_key(|e| e.time());
    ranked.truncate(MAX_ENTRIES_PER_MODE);
    ranked
}

impl Leaderboard {
    pub fn open(backend: Box<dyn Backend>) -> Self {
        let entries = load_entries(backend.as_ref(), LEADERBOARD_RECORD);
        Self { backend, entries }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryBackend::new()))
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn append(&mut self, entry: LeaderboardEntry) {
        let mode = entry.mode();
        let (mut same, others): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.mode() == mode);
        same.push(entry);
        let same = top_for_mode(&same, mode);

        self.entries = others;
        self.entries.extend(same);
        persist(self.backend.as_ref(), LEADERBOARD_RECORD, &self.entries);
    }

    /// Re-sorts and truncates on every call, whatever was loaded.
    pub fn entries_for_mode(&self, mode: TestMode) -> Vec<LeaderboardEntry> {
        top_for_mode(&self.entries, mode)
    }

    /// Whether `time` would make it into the top list for `mode`.
    pub fn qualifies(&self, mode: TestMode, time: u64) -> bool {
        let top = self.entries_for_mode(mode);
        top.len() < MAX_ENTRIES_PER_MODE || top.last().is_some_and(|worst| time < worst.time())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        remove(self.backend.as_ref(), LEADERBOARD_RECORD);
    }
}
