//! File-backed store.
//!
//! Every write loads the whole array, mutates it in memory, and writes the
//! whole array back. The new file is written next to the target and renamed
//! over it, so a crash mid-write leaves the previous contents intact.
//!
//! The highest id ever handed out is kept in a sidecar file (`<path>.seq`)
//! so that deleting the newest task does not free its id for reuse. The task
//! file itself stays a plain array.

use super::TaskStore;
use crate::error::{TdError, TdResult};
use crate::types::{Task, TaskId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default file name, relative to the working directory.
pub const DEFAULT_JSON_PATH: &str = "tasks.json";

/// Extension appended to the task file path for the high-water mark.
const SEQUENCE_SUFFIX: &str = ".seq";

/// JSON file task store. Ids are one greater than the largest id ever
/// assigned or present (1 for a fresh file) and are never reused.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    sequence_path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `content` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> TdResult<()> {
    let tmp = with_suffix(path, ".tmp");
    fs::write(&tmp, content).map_err(|e| TdError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| TdError::io(path, e))?;
    Ok(())
}

impl JsonFileStore {
    /// Open the file at `path`, writing an empty array if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> TdResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            sequence_path: with_suffix(&path, SEQUENCE_SUFFIX),
            path,
        };
        if !store.path.exists() {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| TdError::io(parent, e))?;
            }
            debug!(path = %store.path.display(), "Creating empty task file");
            store.save(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sequence_path(&self) -> &Path {
        &self.sequence_path
    }

    fn load(&self) -> TdResult<Vec<Task>> {
        let content = fs::read_to_string(&self.path).map_err(|e| TdError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| TdError::malformed(&self.path, e))
    }

    fn save(&self, tasks: &[Task]) -> TdResult<()> {
        let content =
            serde_json::to_string_pretty(tasks).map_err(|e| TdError::malformed(&self.path, e))?;
        write_atomic(&self.path, &content)
    }

    /// Highest id ever assigned, 0 when no sidecar exists yet.
    fn high_water(&self) -> TdResult<TaskId> {
        if !self.sequence_path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.sequence_path)
            .map_err(|e| TdError::io(&self.sequence_path, e))?;
        serde_json::from_str(content.trim())
            .map_err(|e| TdError::malformed(&self.sequence_path, e))
    }

    /// Raise the stored high-water mark to cover every id in `tasks`.
    fn record_high_water(&self, current: TaskId, tasks: &[Task]) -> TdResult<()> {
        let mark = tasks.iter().map(|t| t.id).fold(current, TaskId::max);
        if mark > current {
            let content = serde_json::to_string(&mark)
                .map_err(|e| TdError::malformed(&self.sequence_path, e))?;
            write_atomic(&self.sequence_path, &content)?;
        }
        Ok(())
    }

    /// Load, apply `mutate` to the matching task, and save only if one matched.
    fn modify<F>(&self, id: TaskId, mutate: F) -> TdResult<bool>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.load()?;
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                mutate(task);
                self.save(&tasks)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Next id for a record set: one past the larger of `high_water` and the
/// largest id present, or 1 when both are empty.
pub fn next_id(tasks: &[Task], high_water: TaskId) -> TdResult<TaskId> {
    let max = tasks.iter().map(|t| t.id).fold(high_water.max(0), TaskId::max);
    max.checked_add(1).ok_or(TdError::IdOverflow(max))
}

impl TaskStore for JsonFileStore {
    fn fetch_all(&self) -> TdResult<Vec<Task>> {
        let mut tasks = self.load()?;
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    fn insert_at(&self, text: &str, timestamp: i64) -> TdResult<Task> {
        let mut tasks = self.load()?;
        let high_water = self.high_water()?;
        let task = Task::new(next_id(&tasks, high_water)?, text, timestamp);
        tasks.push(task.clone());
        // Sidecar first: a crash in between skips an id rather than reusing one.
        self.record_high_water(high_water, &tasks)?;
        self.save(&tasks)?;
        debug!(id = task.id, "Inserted task");
        Ok(task)
    }

    fn update_text(&self, id: TaskId, text: &str) -> TdResult<bool> {
        self.modify(id, |task| task.text = text.to_string())
    }

    fn set_done(&self, id: TaskId, done: bool) -> TdResult<bool> {
        self.modify(id, |task| task.done = done)
    }

    fn delete_by_id(&self, id: TaskId) -> TdResult<bool> {
        let mut tasks = self.load()?;
        if !tasks.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        // Files written before the sidecar existed get their mark here.
        self.record_high_water(self.high_water()?, &tasks)?;
        tasks.retain(|t| t.id != id);
        self.save(&tasks)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join(DEFAULT_JSON_PATH)).unwrap();
        (dir, store)
    }

    #[test]
    fn open_writes_empty_array() {
        let (_dir, store) = setup();
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn open_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/tasks.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn file_is_pretty_printed_with_task_id() {
        let (_dir, store) = setup();
        store.insert_at("buy milk", 1_700_000_000).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let expected = "[\n  {\n    \"taskId\": 1,\n    \"text\": \"buy milk\",\n    \"timestamp\": 1700000000,\n    \"done\": false\n  }\n]";
        assert_eq!(content, expected);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (dir, store) = setup();
        store.insert_at("a", 1).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        let mut names: Vec<_> = names.iter().map(|n| n.to_string_lossy().into_owned()).collect();
        names.sort();
        assert_eq!(names, vec!["tasks.json", "tasks.json.seq"]);
    }

    #[test]
    fn malformed_file_is_reported() {
        let (_dir, store) = setup();
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.fetch_all().unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedData);
    }

    #[test]
    fn unmatched_mutation_leaves_file_untouched() {
        let (_dir, store) = setup();
        store.insert_at("keep", 5).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(!store.set_done(99, true).unwrap());
        assert!(!store.update_text(99, "x").unwrap());
        assert!(!store.delete_by_id(99).unwrap());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn next_id_follows_larger_of_mark_and_max() {
        assert_eq!(next_id(&[], 0).unwrap(), 1);
        let tasks = vec![Task::new(3, "a", 0), Task::new(9, "b", 0), Task::new(4, "c", 0)];
        assert_eq!(next_id(&tasks, 0).unwrap(), 10);
        assert_eq!(next_id(&tasks, 12).unwrap(), 13);
        assert_eq!(next_id(&[], 12).unwrap(), 13);
    }

    #[test]
    fn next_id_overflow_is_an_error() {
        let tasks = vec![Task::new(i64::MAX, "last", 0)];
        let err = next_id(&tasks, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedData);
    }

    #[test]
    fn insert_after_max_id_in_file_fails_cleanly() {
        let (_dir, store) = setup();
        fs::write(
            store.path(),
            r#"[{"taskId": 9223372036854775807, "text": "edge", "timestamp": 0, "done": false}]"#,
        )
        .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store.insert_at("one more", 1).is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn deleting_newest_task_does_not_free_its_id() {
        let (_dir, store) = setup();
        for text in ["a", "b", "c"] {
            store.insert_at(text, 0).unwrap();
        }
        assert!(store.delete_by_id(3).unwrap());

        assert_eq!(store.insert_at("d", 0).unwrap().id, 4);
        assert_eq!(fs::read_to_string(store.sequence_path()).unwrap(), "4");
    }

    #[test]
    fn legacy_file_without_sequence_keeps_deleted_max() {
        let (_dir, store) = setup();
        fs::write(
            store.path(),
            r#"[{"taskId": 1, "text": "x", "timestamp": 0, "done": false},
                {"taskId": 7, "text": "y", "timestamp": 0, "done": false}]"#,
        )
        .unwrap();
        assert!(!store.sequence_path().exists());

        assert!(store.delete_by_id(7).unwrap());
        assert_eq!(store.insert_at("z", 0).unwrap().id, 8);
    }

    #[test]
    fn malformed_sequence_file_is_reported() {
        let (_dir, store) = setup();
        fs::write(store.sequence_path(), "many").unwrap();
        let err = store.insert_at("x", 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedData);
    }
}
