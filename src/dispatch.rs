//! Runs validated operations against a store.

use crate::error::{TdError, TdResult};
use crate::format::{TableRenderer, TimestampStyle};
use crate::store::TaskStore;
use crate::types::{Task, TaskId, now_secs};
use std::fmt;
use tracing::{debug, info};

/// A fully validated command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add { text: String },
    Delete { id: TaskId },
    Edit { id: TaskId, text: String },
    List,
    SetDone { id: TaskId, done: bool },
}

/// Settings that only affect `list`.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub timestamps: TimestampStyle,
    /// Reference time for relative timestamps.
    pub now: i64,
}

impl ListOptions {
    pub fn new(timestamps: TimestampStyle) -> Self {
        Self {
            timestamps,
            now: now_secs(),
        }
    }
}

/// What an operation did, printable as the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(Task),
    Deleted(TaskId),
    Edited { id: TaskId, text: String },
    MarkedDone(TaskId),
    MarkedUndone(TaskId),
    /// No record matched; the store was not modified.
    NotFound(TaskId),
    Listing(String),
}

impl Outcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound(_))
    }

    /// Under `strict`, an unmatched id becomes an error.
    pub fn into_strict(self, strict: bool) -> TdResult<Self> {
        match self {
            Outcome::NotFound(id) if strict => Err(TdError::NotFound(id)),
            other => Ok(other),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Saved(_) => write!(f, "Task saved."),
            Outcome::Deleted(id) => write!(f, "Task {} deleted", id),
            Outcome::Edited { id, text } => write!(f, "Task {} edited to {}", id, text),
            Outcome::MarkedDone(id) => write!(f, "Task with id: {} marked as done", id),
            Outcome::MarkedUndone(id) => write!(f, "Task with id: {} marked as not done", id),
            Outcome::NotFound(_) => write!(f, "No task found with given id."),
            Outcome::Listing(table) => write!(f, "{}", table),
        }
    }
}

fn matched_or(matched: bool, id: TaskId, outcome: Outcome) -> Outcome {
    if matched {
        outcome
    } else {
        debug!(id, "No task matched");
        Outcome::NotFound(id)
    }
}

/// Execute `operation` against `store`.
pub fn execute(
    store: &dyn TaskStore,
    operation: Operation,
    list: &ListOptions,
) -> TdResult<Outcome> {
    match operation {
        Operation::Add { text } => {
            let task = store.insert(&text)?;
            info!(id = task.id, "Task added");
            Ok(Outcome::Saved(task))
        }
        Operation::Delete { id } => {
            let matched = store.delete_by_id(id)?;
            if matched {
                info!(id, "Task deleted");
            }
            Ok(matched_or(matched, id, Outcome::Deleted(id)))
        }
        Operation::Edit { id, text } => {
            let matched = store.update_text(id, &text)?;
            if matched {
                info!(id, "Task edited");
            }
            Ok(matched_or(matched, id, Outcome::Edited { id, text }))
        }
        Operation::List => {
            let tasks = store.fetch_all()?;
            let renderer = TableRenderer::new(list.timestamps, list.now);
            Ok(Outcome::Listing(renderer.render(&tasks)))
        }
        Operation::SetDone { id, done } => {
            let matched = store.set_done(id, done)?;
            if matched {
                info!(id, done, "Task status changed");
            }
            let outcome = if done {
                Outcome::MarkedDone(id)
            } else {
                Outcome::MarkedUndone(id)
            };
            Ok(matched_or(matched, id, outcome))
        }
    }
}
