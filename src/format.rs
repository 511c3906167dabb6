//! Table rendering for `td list`.
//!
//! Column widths are derived from the record set being printed, so the
//! borders always line up with the widest id and text present.

use crate::types::Task;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

pub const MIN_ID_WIDTH: usize = 2;
pub const MIN_TEXT_WIDTH: usize = 4;
pub const TIMESTAMP_WIDTH: usize = 10;
pub const DONE_WIDTH: usize = 4;

pub const DONE_GLYPH: &str = "✅";
pub const UNDONE_GLYPH: &str = "❌";

const EMPTY_MESSAGE: &str = "No tasks";

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const MONTH: i64 = 2_592_000;
const YEAR: i64 = 31_536_000;

/// How the timestamp column is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimestampStyle {
    /// Seconds since the Unix epoch
    Raw,
    /// Coarse age such as "3d ago"
    #[default]
    Relative,
}

impl TimestampStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "raw" | "epoch" => Some(TimestampStyle::Raw),
            "relative" | "ago" => Some(TimestampStyle::Relative),
            _ => None,
        }
    }
}

/// Coarse age of something `elapsed` seconds old, using the largest unit that
/// fits at least once.
pub fn format_relative(elapsed: i64) -> String {
    if elapsed >= YEAR {
        format!("{}y ago", elapsed / YEAR)
    } else if elapsed >= MONTH {
        format!("{}mo ago", elapsed / MONTH)
    } else if elapsed >= DAY {
        format!("{}d ago", elapsed / DAY)
    } else if elapsed >= HOUR {
        format!("{}h ago", elapsed / HOUR)
    } else if elapsed >= MINUTE {
        format!("{}m ago", elapsed / MINUTE)
    } else if elapsed < 10 {
        // Also covers timestamps slightly in the future.
        "just now".to_string()
    } else {
        format!("{}s ago", elapsed)
    }
}

/// Column widths for one rendering of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub id: usize,
    pub text: usize,
    pub timestamp: usize,
    pub done: usize,
}

impl ColumnWidths {
    pub fn compute(tasks: &[Task], style: TimestampStyle) -> Self {
        let mut widths = Self {
            id: MIN_ID_WIDTH,
            text: MIN_TEXT_WIDTH,
            timestamp: TIMESTAMP_WIDTH,
            done: DONE_WIDTH,
        };
        for task in tasks {
            widths.id = widths.id.max(task.id.to_string().len());
            widths.text = widths.text.max(display_len(&task.text));
            if style == TimestampStyle::Raw {
                // Only pathological epochs are wider than ten digits.
                widths.timestamp = widths.timestamp.max(task.timestamp.to_string().len());
            }
        }
        widths
    }

    /// Terminal columns between the outer borders.
    pub fn inner_width(&self) -> usize {
        // Each cell carries one space of padding on both sides, plus three
        // inner separators.
        self.id + self.text + self.timestamp + self.done + 4 * 2 + 3
    }

    fn border(&self, left: &str, mid: &str, right: &str) -> String {
        let segments = [self.id, self.text, self.timestamp, self.done]
            .map(|w| "─".repeat(w + 2))
            .join(mid);
        format!("{left}{segments}{right}")
    }
}

/// Terminal columns taken by `s`; wide characters count twice.
fn display_len(s: &str) -> usize {
    s.width()
}

fn pad(content: &str, width: usize, fill: char) -> String {
    let missing = width.saturating_sub(display_len(content));
    let mut cell = String::with_capacity(content.len() + missing);
    cell.push_str(content);
    cell.extend(std::iter::repeat_n(fill, missing));
    cell
}

/// Fill character for the text column of row `index`.
pub fn zebra_fill(index: usize) -> char {
    if index % 2 == 1 { '.' } else { ' ' }
}

/// Renders task lists into bordered tables.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    style: TimestampStyle,
    now: i64,
}

impl TableRenderer {
    /// `now` is the reference point for relative timestamps.
    pub fn new(style: TimestampStyle, now: i64) -> Self {
        Self { style, now }
    }

    pub fn timestamp_text(&self, task: &Task) -> String {
        match self.style {
            TimestampStyle::Raw => task.timestamp.to_string(),
            TimestampStyle::Relative => format_relative(self.now.saturating_sub(task.timestamp)),
        }
    }

    /// The text cell content for row `index`: the task text padded with the
    /// zebra fill to the column width.
    pub fn text_field(task: &Task, index: usize, widths: &ColumnWidths) -> String {
        pad(&task.text, widths.text, zebra_fill(index))
    }

    pub fn render_row(&self, task: &Task, index: usize, widths: &ColumnWidths) -> String {
        let glyph = if task.done { DONE_GLYPH } else { UNDONE_GLYPH };
        let done_pad = " ".repeat(widths.done.saturating_sub(display_len(glyph)));
        format!(
            "│ {} │ {} │ {} │ {}{} │",
            pad(&task.id.to_string(), widths.id, ' '),
            Self::text_field(task, index, widths),
            pad(&self.timestamp_text(task), widths.timestamp, ' '),
            glyph,
            done_pad,
        )
    }

    /// Render the full table, one line per element.
    pub fn render_lines(&self, tasks: &[Task]) -> Vec<String> {
        let widths = ColumnWidths::compute(tasks, self.style);
        let mut lines = Vec::with_capacity(tasks.len() + 5);

        lines.push(widths.border("┌", "┬", "┐"));
        lines.push(format!(
            "│ {} │ {} │ {} │ {} │",
            pad("ID", widths.id, ' '),
            pad("Text", widths.text, ' '),
            pad("Timestamp", widths.timestamp, ' '),
            pad("Done", widths.done, ' '),
        ));
        lines.push(widths.border("├", "┼", "┤"));

        if tasks.is_empty() {
            let inner = widths.inner_width();
            let left = (inner - EMPTY_MESSAGE.len()) / 2;
            let right = inner - EMPTY_MESSAGE.len() - left;
            lines.push(format!(
                "│{}{}{}│",
                " ".repeat(left),
                EMPTY_MESSAGE,
                " ".repeat(right)
            ));
        } else {
            for (index, task) in tasks.iter().enumerate() {
                lines.push(self.render_row(task, index, &widths));
            }
        }

        lines.push(widths.border("└", "┴", "┘"));
        lines
    }

    pub fn render(&self, tasks: &[Task]) -> String {
        self.render_lines(tasks).join("\n")
    }
}
