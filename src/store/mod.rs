//! Persistence layer.
//!
//! Both backends implement [`TaskStore`]; the binary picks one at startup
//! from [`StoreKind`] and works through `Box<dyn TaskStore>` from then on.

pub mod json_file;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::config::StorageConfig;
use crate::error::TdResult;
use crate::types::{Task, TaskId, now_secs};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which backend holds the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// SQLite table with auto-increment ids
    #[default]
    Sqlite,
    /// Pretty-printed JSON array rewritten on every change
    Json,
}

impl StoreKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" | "db" | "table" => Some(StoreKind::Sqlite),
            "json" | "file" => Some(StoreKind::Json),
            _ => None,
        }
    }
}

/// The primitive operations every backend supports.
///
/// Mutations report whether a record matched instead of failing, so callers
/// decide how loud a missing id should be.
pub trait TaskStore {
    /// All tasks, ordered by ascending id.
    fn fetch_all(&self) -> TdResult<Vec<Task>>;

    /// Insert a new, not-done task stamped with `timestamp`.
    fn insert_at(&self, text: &str, timestamp: i64) -> TdResult<Task>;

    /// Insert a new, not-done task stamped with the current time.
    fn insert(&self, text: &str) -> TdResult<Task> {
        self.insert_at(text, now_secs())
    }

    fn update_text(&self, id: TaskId, text: &str) -> TdResult<bool>;

    fn set_done(&self, id: TaskId, done: bool) -> TdResult<bool>;

    fn delete_by_id(&self, id: TaskId) -> TdResult<bool>;
}

/// Open the backend selected by `config`, creating its storage if absent.
pub fn open_store(config: &StorageConfig) -> TdResult<Box<dyn TaskStore>> {
    match config.backend {
        StoreKind::Sqlite => {
            debug!(path = %config.db_path.display(), "Opening SQLite task store");
            Ok(Box::new(SqliteStore::open(&config.db_path)?))
        }
        StoreKind::Json => {
            debug!(path = %config.json_path.display(), "Opening JSON task store");
            Ok(Box::new(JsonFileStore::open(&config.json_path)?))
        }
    }
}
