//! CLI command definitions for td
//!
//! This module defines the CLI structure using clap's derive macros.
//! Positional arguments are captured raw and validated by
//! [`Command::into_operation`], so argument errors carry the same
//! descriptive messages regardless of which subcommand produced them.

use crate::config::Config;
use crate::dispatch::Operation;
use crate::error::{TdError, TdResult};
use crate::format::TimestampStyle;
use crate::store::StoreKind;
use crate::types::TaskId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shown when no command, or an unknown one, is given.
pub const AVAILABLE_COMMANDS: &str = "add, edit, delete, list, done, undone";

/// Minimal task tracker
#[derive(Parser, Debug)]
#[command(name = "td", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(long, value_enum, global = true)]
    pub backend: Option<StoreKind>,

    /// Path to SQLite database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to JSON task file (overrides config)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Timestamp column style for `list` (overrides config)
    #[arg(long, value_enum, global = true)]
    pub timestamps: Option<TimestampStyle>,

    /// Exit non-zero when a task id does not exist
    #[arg(long, global = true)]
    pub strict: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if let Some(db_path) = &self.database {
            config.storage.db_path = db_path.clone();
        }
        if let Some(json_path) = &self.file {
            config.storage.json_path = json_path.clone();
        }
        if let Some(style) = self.timestamps {
            config.display.timestamps = style;
        }
        if self.strict {
            config.strict_not_found = true;
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task
    Add {
        /// Task text; multiple words are joined with spaces
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Delete a task by id
    Delete {
        #[arg(value_name = "ID", allow_negative_numbers = true)]
        id: Option<String>,
    },

    /// Replace the text of a task
    Edit {
        #[arg(value_name = "ID", allow_negative_numbers = true)]
        id: Option<String>,

        /// New task text
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Show all tasks as a table
    List,

    /// Mark a task as done
    Done {
        #[arg(value_name = "ID", allow_negative_numbers = true)]
        id: Option<String>,
    },

    /// Mark a task as not done
    Undone {
        #[arg(value_name = "ID", allow_negative_numbers = true)]
        id: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Delete { .. } => "delete",
            Command::Edit { .. } => "edit",
            Command::List => "list",
            Command::Done { .. } => "done",
            Command::Undone { .. } => "undone",
        }
    }

    /// Validate the raw arguments and turn them into an [`Operation`].
    pub fn into_operation(self) -> TdResult<Operation> {
        let name = self.name();
        match self {
            Command::Add { text } => Ok(Operation::Add {
                text: join_text(text).ok_or_else(|| TdError::missing(name, "'text' argument"))?,
            }),
            Command::Delete { id } => Ok(Operation::Delete {
                id: parse_id(name, id)?,
            }),
            Command::Edit { id, text } => {
                let (Some(id), Some(text)) = (id, join_text(text)) else {
                    return Err(TdError::missing(name, "'taskId' or 'newText' arguments"));
                };
                Ok(Operation::Edit {
                    id: parse_id(name, Some(id))?,
                    text,
                })
            }
            Command::List => Ok(Operation::List),
            Command::Done { id } => Ok(Operation::SetDone {
                id: parse_id(name, id)?,
                done: true,
            }),
            Command::Undone { id } => Ok(Operation::SetDone {
                id: parse_id(name, id)?,
                done: false,
            }),
        }
    }
}

/// Join text words with single spaces. Any supplied text is kept as given,
/// including whitespace-only text; `None` only when no words were passed.
fn join_text(words: Vec<String>) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Parse a task id argument. Ids are positive integers.
pub fn parse_id(command: &'static str, raw: Option<String>) -> TdResult<TaskId> {
    let raw = raw.ok_or_else(|| TdError::missing(command, "'taskId' argument"))?;
    let id: TaskId = raw.trim().parse().map_err(|e| {
        TdError::invalid_id(command, format!("{:?} is not an integer ({})", raw, e))
    })?;
    if id < 1 {
        return Err(TdError::invalid_id(
            command,
            format!("{} is not a positive integer", id),
        ));
    }
    Ok(id)
}
