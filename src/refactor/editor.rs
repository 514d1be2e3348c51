use std::collections::{BTreeMap, BTreeSet};

/// Every edit planned for one file, keyed by 1-based line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEdits {
    /// Lines dropped entirely
    pub whole: BTreeSet<usize>,

    /// Line -> column ranges to cut (1-based character columns, end exclusive)
    pub partial: BTreeMap<usize, Vec<(usize, usize)>>,
}

impl LineEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_line(&mut self, line: usize) {
        if line > 0 {
            self.whole.insert(line);
        }
    }

    pub fn remove_columns(&mut self, line: usize, start_column: usize, end_column: usize) {
        if line > 0 && start_column > 0 && end_column > start_column {
            self.partial.entry(line).or_default().push((start_column, end_column));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.whole.is_empty() && self.partial.is_empty()
    }
}

/// Text produced by applying a [`LineEdits`] set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub contents: String,
    pub lines_removed: usize,
    pub changed: bool,
}

/// Applies planned edits to file contents
pub struct FileEditor;

impl FileEditor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `edits` to `contents`. A line covered by a whole-line edit is
    /// dropped and its partial edits ignored; otherwise partial cuts run
    /// right-to-left.
    pub fn apply(&self, contents: &str, edits: &LineEdits) -> EditResult {
        let newline = if contents.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = contents.ends_with('\n');

        let mut kept: Vec<String> = Vec::new();
        let mut lines_removed = 0;

        for (idx, line) in contents.lines().enumerate() {
            let number = idx + 1;
            if edits.whole.contains(&number) {
                lines_removed += 1;
                continue;
            }

            match edits.partial.get(&number) {
                Some(ranges) => {
                    let edited = self.remove_columns(line, ranges);
                    if edited.trim().is_empty() && !line.trim().is_empty() {
                        lines_removed += 1;
                    } else {
                        kept.push(edited);
                    }
                }
                None => kept.push(line.to_string()),
            }
        }

        let mut result = kept.join(newline);
        if trailing_newline && !kept.is_empty() {
            result.push_str(newline);
        }

        EditResult {
            changed: result != contents,
            contents: result,
            lines_removed,
        }
    }

    /// Cut column ranges out of one line. Only the junction each cut leaves
    /// is touched; the rest of the line stays byte for byte.
    pub fn remove_columns(&self, line: &str, ranges: &[(usize, usize)]) -> String {
        let mut chars: Vec<char> = line.chars().collect();

        for (start, end) in merge_ranges(ranges).into_iter().rev() {
            let start = (start - 1).min(chars.len());
            let end = (end - 1).min(chars.len());
            if start < end {
                chars.drain(start..end);
                close_junction(&mut chars, start);
            }
        }

        chars.into_iter().collect()
    }
}

impl Default for FileEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Tidy the spaces meeting at `at` after a cut: a run spanning both sides
/// collapses to one space, a cut that reached the end of the line takes the
/// spaces before it, and leading indentation is never shortened.
fn close_junction(chars: &mut Vec<char>, at: usize) {
    let left = chars[..at].iter().rev().take_while(|&&c| c == ' ').count();
    let right = chars[at..].iter().take_while(|&&c| c == ' ').count();

    if at + right == chars.len() {
        chars.truncate(at - left);
    } else if left == at {
        chars.drain(at..at + right);
    } else if left > 0 && right > 0 {
        chars.drain(at - left + 1..at + right);
    }
}

/// Sort and merge overlapping or touching column ranges
fn merge_ranges(ranges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut sorted: Vec<(usize, usize)> = ranges
        .iter()
        .copied()
        .filter(|(start, end)| *start > 0 && end > start)
        .collect();
    sorted.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Index (0-based) of the line closing the block opened at or after `start`.
/// A declaration with no brace on its first line ends on that line.
pub fn find_block_end(lines: &[&str], start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut found_open = false;

    for (i, line) in lines.iter().enumerate().skip(start) {
        let mut in_string = false;
        let mut prev = '\0';
        for ch in code_part(line).chars() {
            match ch {
                '"' if prev != '\\' => in_string = !in_string,
                '{' if !in_string => {
                    depth += 1;
                    found_open = true;
                }
                '}' if !in_string => {
                    depth -= 1;
                    if found_open && depth == 0 {
                        return i;
                    }
                }
                _ => {}
            }
            prev = ch;
        }

        if i == start && !found_open {
            return i;
        }
    }

    start.min(lines.len().saturating_sub(1))
}

/// The line without a trailing `//` comment
fn code_part(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = '\0';
    for (i, ch) in line.char_indices() {
        match ch {
            '"' if prev != '\\' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..i - 1],
            _ => {}
        }
        prev = ch;
    }
    line
}

pub fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

pub fn is_import_line(trimmed: &str) -> bool {
    let mut rest = trimmed;
    while let Some(stripped) = rest.strip_prefix('@') {
        // `@testable import X`, `@_exported import X`
        rest = stripped
            .split_once(char::is_whitespace)
            .map(|(_, r)| r.trim_start())
            .unwrap_or("");
    }
    rest.starts_with("import ")
}

/// A file is empty when only whitespace, comments, and import statements remain
pub fn is_effectively_empty(contents: &str) -> bool {
    let mut in_block_comment = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        if in_block_comment {
            if let Some(pos) = trimmed.find("*/") {
                in_block_comment = false;
                if !trimmed[pos + 2..].trim().is_empty() {
                    return false;
                }
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") || is_import_line(trimmed) {
            continue;
        }
        if let Some(after_open) = trimmed.strip_prefix("/*") {
            match after_open.find("*/") {
                Some(pos) if after_open[pos + 2..].trim().is_empty() => continue,
                Some(_) => return false,
                None => {
                    in_block_comment = true;
                    continue;
                }
            }
        }
        return false;
    }

    true
}
