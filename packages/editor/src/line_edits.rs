//! # Line Edits
//!
//! Flat documents are a list of lines. Edits address a 1-based
//! `line:col` position with columns counted in characters.
//!
//! Every edit touches exactly one line, so its inverse is either "remove the
//! line that was added" or "put the old line content back".

use crate::errors::EditorError;
use crate::mutation_trait::Reversible;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lines of a flat document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    /// Numbered `N: text` lines, optionally limited to an inclusive range.
    pub fn show(&self, range: Option<LineRange>) -> Result<Vec<String>, EditorError> {
        let (start, end) = match range {
            None => (1, self.lines.len()),
            Some(LineRange { start, end }) => {
                if start == 0 || start > end || end > self.lines.len() {
                    return Err(EditorError::out_of_range(format!(
                        "lines {start}:{end} of a {}-line document",
                        self.lines.len()
                    )));
                }
                (start, end)
            }
        };

        Ok(self
            .lines
            .iter()
            .enumerate()
            .skip(start.saturating_sub(1))
            .take(end + 1 - start.max(1))
            .map(|(index, line)| format!("{}: {}", index + 1, line))
            .collect())
    }

    fn check_line(&self, line: usize) -> Result<usize, EditorError> {
        if line == 0 || line > self.lines.len() {
            return Err(EditorError::invalid_position(format!(
                "line {line} does not exist (document has {} lines)",
                self.lines.len()
            )));
        }
        Ok(line - 1)
    }
}

/// A 1-based `line:col` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl FromStr for Position {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, col) = parse_pair(s).ok_or_else(|| {
            EditorError::invalid_position(format!("expected <line:col>, got '{s}'"))
        })?;
        if line == 0 || col == 0 {
            return Err(EditorError::invalid_position(format!(
                "positions are 1-based, got '{s}'"
            )));
        }
        Ok(Self { line, col })
    }
}

/// Inclusive 1-based `start:end` line range for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = parse_pair(s).ok_or_else(|| {
            EditorError::out_of_range(format!("expected <start:end>, got '{s}'"))
        })?;
        Ok(Self { start, end })
    }
}

fn parse_pair(s: &str) -> Option<(usize, usize)> {
    let (a, b) = s.split_once(':')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Flat edit intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TextMutation {
    Append {
        text: String,
    },
    Insert {
        at: Position,
        text: String,
    },
    Delete {
        at: Position,
        len: usize,
    },
    Replace {
        at: Position,
        len: usize,
        text: String,
    },
}

impl TextMutation {
    /// Validate and apply, returning the recorded edit.
    pub fn apply(&self, buffer: &mut LineBuffer) -> Result<TextEdit, EditorError> {
        let change = match self {
            TextMutation::Append { text } => {
                buffer.lines.push(text.clone());
                TextChange::LineAdded {
                    index: buffer.lines.len() - 1,
                    content: text.clone(),
                }
            }

            TextMutation::Insert { at, text } if buffer.is_empty() => {
                if (at.line, at.col) != (1, 1) {
                    return Err(EditorError::invalid_position(format!(
                        "document is empty, only 1:1 is valid (got {at})"
                    )));
                }
                buffer.lines.push(text.clone());
                TextChange::LineAdded {
                    index: 0,
                    content: text.clone(),
                }
            }

            TextMutation::Insert { at, text } => {
                let index = buffer.check_line(at.line)?;
                let before = buffer.lines[index].clone();
                let offset = column_offset(&before, at.col)?;
                let mut after = before.clone();
                after.insert_str(offset, text);
                buffer.lines[index] = after.clone();
                TextChange::LineChanged {
                    index,
                    before,
                    after,
                }
            }

            TextMutation::Delete { at, len } => {
                let (index, before, start, end) = span_in_line(buffer, *at, *len)?;
                let mut after = before.clone();
                after.replace_range(start..end, "");
                buffer.lines[index] = after.clone();
                TextChange::LineChanged {
                    index,
                    before,
                    after,
                }
            }

            TextMutation::Replace { at, len, text } => {
                let (index, before, start, end) = span_in_line(buffer, *at, *len)?;
                let mut after = before.clone();
                after.replace_range(start..end, text);
                buffer.lines[index] = after.clone();
                TextChange::LineChanged {
                    index,
                    before,
                    after,
                }
            }
        };

        Ok(TextEdit {
            mutation: self.clone(),
            change,
        })
    }

    pub fn verb(&self) -> &'static str {
        match self {
            TextMutation::Append { .. } => "append",
            TextMutation::Insert { .. } => "insert",
            TextMutation::Delete { .. } => "delete",
            TextMutation::Replace { .. } => "replace",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TextMutation::Append { text } => format!("append \"{text}\""),
            TextMutation::Insert { at, text } => format!("insert {at} \"{text}\""),
            TextMutation::Delete { at, len } => format!("delete {at} {len}"),
            TextMutation::Replace { at, len, text } => format!("replace {at} {len} \"{text}\""),
        }
    }
}

/// Byte offset of a 1-based column; `col` may be one past the last char.
fn column_offset(line: &str, col: usize) -> Result<usize, EditorError> {
    let chars = line.chars().count();
    if col == 0 || col > chars + 1 {
        return Err(EditorError::invalid_position(format!(
            "column {col} is outside a {chars}-character line"
        )));
    }
    Ok(line
        .char_indices()
        .nth(col - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len()))
}

/// Resolve `len` characters starting at `at` to a byte range in one line.
fn span_in_line(
    buffer: &LineBuffer,
    at: Position,
    len: usize,
) -> Result<(usize, String, usize, usize), EditorError> {
    let index = buffer.check_line(at.line)?;
    let line = buffer.lines[index].clone();
    let start = column_offset(&line, at.col)?;

    let available = line.chars().count() + 1 - at.col;
    if len > available {
        return Err(EditorError::out_of_range(format!(
            "cannot remove {len} characters at {at}, only {available} remain on the line"
        )));
    }
    let end = line[start..]
        .char_indices()
        .nth(len)
        .map(|(offset, _)| start + offset)
        .unwrap_or(line.len());

    Ok((index, line, start, end))
}

/// An applied flat edit with its inverse data.
#[derive(Debug, Clone)]
pub struct TextEdit {
    mutation: TextMutation,
    change: TextChange,
}

#[derive(Debug, Clone)]
enum TextChange {
    LineAdded {
        index: usize,
        content: String,
    },
    LineChanged {
        index: usize,
        before: String,
        after: String,
    },
}

impl TextEdit {
    pub fn mutation(&self) -> &TextMutation {
        &self.mutation
    }
}

impl Reversible for TextEdit {
    type Target = LineBuffer;

    fn undo(&mut self, buffer: &mut LineBuffer) {
        match &self.change {
            TextChange::LineAdded { index, .. } => {
                assert!(
                    *index < buffer.lines.len(),
                    "history invariant: added line {index} is missing"
                );
                buffer.lines.remove(*index);
            }
            TextChange::LineChanged { index, before, .. } => {
                buffer.lines[*index] = before.clone();
            }
        }
    }

    fn redo(&mut self, buffer: &mut LineBuffer) {
        match &self.change {
            TextChange::LineAdded { index, content } => {
                buffer.lines.insert(*index, content.clone());
            }
            TextChange::LineChanged { index, after, .. } => {
                buffer.lines[*index] = after.clone();
            }
        }
    }

    fn description(&self) -> String {
        self.mutation.describe()
    }

    fn is_noop(&self) -> bool {
        match &self.change {
            TextChange::LineAdded { .. } => false,
            TextChange::LineChanged { before, after, .. } => before == after,
        }
    }
}
