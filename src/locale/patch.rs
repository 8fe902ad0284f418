//! Line-oriented locale patching
//!
//! Locale files are hand-curated: section markers, ordering and blank lines
//! are chosen by a human. Instead of reserializing the document, edits are
//! expressed as [`PatchOp`]s applied to a [`LineBuffer`] that keeps every
//! untouched line byte for byte.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

use crate::constants::section;

use super::planner::LocaleEntry;

static LINE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*"([^"]+)":\s*"#).expect("valid line key pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Drop every line carrying `key`
    Remove { key: String },
    /// Replace the value on every line carrying `key`
    Update { key: String, value: String },
    /// Append entries to the section headed by `marker`, creating the
    /// section (labelled `label`) before the closing brace if needed
    InsertSection { marker: String, label: String, entries: Vec<LocaleEntry> },
}

/// Key of a `"key": value` line
fn line_key(line: &str) -> Option<&str> {
    LINE_KEY.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// JSON string literal for `s`
fn quoted(s: &str) -> String {
    Value::from(s).to_string()
}

/// Add a comma after the last non-space character unless the line already
/// ends with one or opens an object or array
fn ensure_trailing_comma(line: &mut String) {
    let body = line.trim_end();
    if body.is_empty() || body.ends_with([',', '{', '[']) {
        return;
    }
    let at = body.len();
    line.insert(at, ',');
}

/// Byte length of the JSON value starting at the beginning of `rest`
fn value_len(rest: &str) -> usize {
    if let Some(inner) = rest.strip_prefix('"') {
        let mut escaped = false;
        for (i, c) in inner.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => return i + 2,
                _ => {}
            }
        }
        return rest.trim_end().len();
    }
    rest.trim_end().trim_end_matches(',').trim_end().len()
}

/// A text file as a sequence of lines, each keeping its own terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    newline: &'static str,
}

impl LineBuffer {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let newline = if lines.first().is_some_and(|l| l.ends_with("\r\n")) { "\r\n" } else { "\n" };
        Self { lines, newline }
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }

    /// Apply one operation; returns whether the buffer changed
    pub fn apply(&mut self, op: &PatchOp) -> bool {
        match op {
            PatchOp::Remove { key } => self.remove(key),
            PatchOp::Update { key, value } => self.update(key, value),
            PatchOp::InsertSection { marker, label, entries } => self.insert_section(marker, label, entries),
        }
    }

    pub fn apply_all(&mut self, ops: &[PatchOp]) -> bool {
        ops.iter().fold(false, |changed, op| self.apply(op) | changed)
    }

    fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line_key(line) != Some(key));
        if self.lines.len() == before {
            return false;
        }
        self.collapse_blank_runs();
        self.strip_dangling_commas();
        true
    }

    /// Drop the comma left on the line before a closing brace when the
    /// entry that followed it was removed
    fn strip_dangling_commas(&mut self) {
        let mut previous: Option<usize> = None;
        for i in 0..self.lines.len() {
            if is_blank(&self.lines[i]) {
                continue;
            }
            if self.lines[i].trim_start().starts_with('}') {
                if let Some(p) = previous {
                    let line = &mut self.lines[p];
                    let body = line.trim_end();
                    if let Some(stripped) = body.strip_suffix(',') {
                        let at = stripped.len();
                        line.remove(at);
                    }
                }
            }
            previous = Some(i);
        }
    }

    fn collapse_blank_runs(&mut self) {
        let mut last_was_blank = false;
        self.lines.retain(|line| {
            let blank = is_blank(line);
            let keep = !(blank && last_was_blank);
            last_was_blank = blank;
            keep
        });
    }

    fn update(&mut self, key: &str, value: &str) -> bool {
        let replacement = quoted(value);
        let mut changed = false;
        for line in &mut self.lines {
            let Some(caps) = LINE_KEY.captures(line) else { continue };
            if caps.get(1).map(|m| m.as_str()) != Some(key) {
                continue;
            }
            let start = caps.get(0).map_or(0, |m| m.end());
            let end = start + value_len(&line[start..]);
            if line[start..end] != replacement {
                line.replace_range(start..end, &replacement);
                changed = true;
            }
        }
        changed
    }

    fn entry_line(&self, indent: &str, key: &str, value: &str, comma: bool) -> String {
        let comma = if comma { "," } else { "" };
        format!("{indent}{}: {}{comma}{}", quoted(key), quoted(value), self.newline)
    }

    /// Make sure the line before `index` is terminated so inserted lines
    /// start on their own line
    fn terminate_before(&mut self, index: usize) {
        let newline = self.newline;
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            if !prev.ends_with('\n') {
                prev.push_str(newline);
            }
        }
    }

    fn insert_section(&mut self, marker: &str, label: &str, entries: &[LocaleEntry]) -> bool {
        if entries.is_empty() {
            return false;
        }
        let needle = format!("\"{marker}\"");
        match self.lines.iter().position(|l| l.contains(&needle)) {
            Some(section_index) => {
                self.extend_section(section_index, entries);
                true
            }
            None => self.create_section(marker, label, entries),
        }
    }

    fn extend_section(&mut self, section_index: usize, entries: &[LocaleEntry]) {
        let end_index = (section_index + 1..self.lines.len())
            .find(|&i| {
                let t = self.lines[i].trim();
                t.starts_with(section::MARKER_LINE_PREFIX) || t.starts_with('}')
            })
            .unwrap_or(self.lines.len());

        let mut last = end_index - 1;
        while last > section_index && is_blank(&self.lines[last]) {
            last -= 1;
        }
        ensure_trailing_comma(&mut self.lines[last]);

        let closes = self.lines.get(end_index).is_none_or(|l| l.trim().starts_with('}'));
        let indent = indent_of(&self.lines[section_index]).to_string();
        let new_lines: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let is_last = i + 1 == entries.len();
                self.entry_line(&indent, &e.key, &e.value, !(is_last && closes))
            })
            .collect();

        self.terminate_before(last + 1);
        self.lines.splice(last + 1..last + 1, new_lines);
    }

    /// Index of the line holding the closing brace on its own. A brace that
    /// shares its line with other text (`{}` or a one-line object) is split
    /// onto a line of its own first.
    fn closing_line(&mut self) -> Option<usize> {
        if let Some(i) = self.lines.iter().rposition(|l| l.trim_start().starts_with('}')) {
            return Some(i);
        }
        let i = self.lines.iter().rposition(|l| l.trim_end().ends_with('}'))?;
        let at = self.lines[i].rfind('}')?;
        let tail = self.lines[i].split_off(at);
        self.lines[i].push_str(self.newline);
        self.lines.insert(i + 1, tail);
        Some(i + 1)
    }

    fn create_section(&mut self, marker: &str, label: &str, entries: &[LocaleEntry]) -> bool {
        let Some(insert_at) = self.closing_line() else {
            warn!(marker, "No closing brace found, section not created");
            return false;
        };

        let previous = (0..insert_at).rev().find(|&i| !is_blank(&self.lines[i]));
        let indent = previous
            .filter(|&i| line_key(&self.lines[i]).is_some())
            .map_or(section::DEFAULT_INDENT.to_string(), |i| indent_of(&self.lines[i]).to_string());
        if let Some(i) = previous {
            ensure_trailing_comma(&mut self.lines[i]);
        }

        let mut new_lines = Vec::with_capacity(entries.len() + 2);
        new_lines.push(self.newline.to_string());
        new_lines.push(self.entry_line(&indent, marker, &format!("{}{label}", section::LABEL_PREFIX), true));
        for (i, e) in entries.iter().enumerate() {
            new_lines.push(self.entry_line(&indent, &e.key, &e.value, i + 1 < entries.len()));
        }

        self.terminate_before(insert_at);
        self.lines.splice(insert_at..insert_at, new_lines);
        true
    }
}
