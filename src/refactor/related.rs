//! Code that exists only to serve a declaration slated for removal.
//!
//! For a stored property: initializer self-assignments, the initializer
//! parameter feeding them, serialization-key cases, and encode/decode calls
//! keyed by the property. For a type: every extension of it.

use super::editor::{find_block_end, is_comment_line};
use super::planner::ColumnRange;
use crate::graph::{normalize_identifier, Declaration, DeclarationKind, LineSpan};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// A secondary edit coupled to a removed declaration
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedDeletion {
    pub description: String,

    /// The declaration this fragment serves
    pub parent: Declaration,

    /// Lines removed entirely, unless `partial` narrows the edit to a column range
    pub lines: LineSpan,

    pub partial: Option<ColumnRange>,
}

/// Character position inside the file: 0-based line index, byte offset in line
type Pos = (usize, usize);

/// One comma-separated entry of a parameter list or `case` line
#[derive(Debug, Clone)]
struct Item {
    start: Pos,
    /// Exclusive, just past the entry's last non-whitespace character
    end: Pos,
    /// Separator following the entry, if any
    comma: Option<Pos>,
    text: String,
}

impl Item {
    /// Bare name of the entry: the identifier before `:` or `=`, last word
    /// before `:` for parameters (`label binding: Type`)
    fn binding(&self) -> &str {
        let head = self.text.split([':', '=', '(']).next().unwrap_or("");
        normalize_identifier(head.split_whitespace().last().unwrap_or(""))
    }

    /// External label of a parameter entry (`label binding: Type`)
    fn label(&self) -> &str {
        let head = self.text.split([':', '=']).next().unwrap_or("");
        normalize_identifier(head.split_whitespace().next().unwrap_or(""))
    }

    fn case_name(&self) -> &str {
        let head = self.text.split(['=', '(', ' ']).next().unwrap_or("");
        normalize_identifier(head.trim())
    }
}

/// Removal of one item, before conversion to a [`RelatedDeletion`]
#[derive(Debug, Clone, PartialEq)]
enum Cut {
    Lines(usize, usize),
    Columns(usize, usize, usize),
}

/// Finds related fragments in one file's text
pub struct RelatedCodeFinder {
    keys_type: String,
    init_re: Regex,
}

impl RelatedCodeFinder {
    pub fn new(serialization_keys_type: &str) -> Self {
        Self {
            keys_type: serialization_keys_type.to_string(),
            init_re: Regex::new(r"\binit\s*[?!]?\s*(?:<[^>]*>)?\s*\(").expect("valid initializer pattern"),
        }
    }

    /// Every fragment of `contents` coupled to `decl`; empty when nothing is
    pub fn find(&self, decl: &Declaration, contents: &str) -> Vec<RelatedDeletion> {
        let lines: Vec<&str> = contents.lines().collect();
        let name = normalize_identifier(&decl.name);
        let mut found = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        match decl.kind {
            DeclarationKind::Variable if decl.parent_type.is_some() => {
                self.initializer_code(decl, name, &lines, &mut claimed, &mut found);
                self.serialization_keys(decl, name, &lines, &mut found);
                self.coder_calls(decl, name, &lines, &mut claimed, &mut found);
            }
            kind if kind.is_type() => self.extensions(decl, name, &lines, &mut found),
            _ => {}
        }

        debug!("{} related fragments for {}", found.len(), decl.display());
        found
    }

    fn initializer_code(
        &self,
        decl: &Declaration,
        name: &str,
        lines: &[&str],
        claimed: &mut HashSet<usize>,
        found: &mut Vec<RelatedDeletion>,
    ) {
        let assignment = Regex::new(&format!(
            r"^\s*self\s*\.\s*`?{}`?\s*=([^=].*)$",
            regex::escape(name)
        ))
        .expect("escaped name is a valid pattern");

        for (idx, line) in lines.iter().enumerate() {
            let Some(m) = self.init_re.find(line) else {
                continue;
            };
            let Some((params, close)) = parse_items(lines, (idx, m.end())) else {
                continue;
            };
            let Some((body_start, body_end)) = initializer_body(lines, close) else {
                continue;
            };

            // One self-assignment per initializer, strictly inside the body
            let hit = (body_start + 1..body_end).find_map(|i| {
                assignment
                    .captures(lines[i])
                    .and_then(|c| c.get(1))
                    .map(|rhs| (i, rhs.as_str().trim().trim_end_matches(';').trim().to_string()))
            });
            let Some((assign_line, rhs)) = hit else {
                continue;
            };

            trace!("Initializer at line {} assigns {} on line {}", idx + 1, name, assign_line + 1);
            claimed.insert(assign_line);
            found.push(related(decl, "initializer assignment", Cut::Lines(assign_line, assign_line), lines));

            let binding = normalize_identifier(&rhs);
            if !is_identifier(binding) {
                continue;
            }
            let Some(param_idx) = params.iter().position(|p| p.binding() == binding) else {
                continue;
            };

            let body: Vec<&str> = (body_start..=body_end)
                .map(|i| if i == close.0 { &lines[i][close.1..] } else { lines[i] })
                .collect();
            let uses: usize = body.iter().map(|l| count_bare_references(l, binding)).sum();
            if uses != 1 {
                trace!("Parameter {} used {} times; keeping it", binding, uses);
                continue;
            }

            for cut in item_removal(lines, &params, param_idx) {
                found.push(related(decl, "initializer parameter", cut, lines));
            }
        }
    }

    fn serialization_keys(&self, decl: &Declaration, name: &str, lines: &[&str], found: &mut Vec<RelatedDeletion>) {
        let keys_re = Regex::new(&format!(r"\benum\s+{}\b", regex::escape(&self.keys_type)))
            .expect("escaped keys type is a valid pattern");

        for (idx, line) in lines.iter().enumerate() {
            if !keys_re.is_match(line) {
                continue;
            }
            let end = find_block_end(lines, idx);

            for i in idx + 1..end {
                let Some(case_at) = case_keyword(lines[i]) else {
                    continue;
                };
                let Some((items, _)) = parse_line_items(lines, i, case_at) else {
                    continue;
                };
                let Some(pos) = items.iter().position(|item| item.case_name() == name) else {
                    continue;
                };

                let cuts = if items.len() == 1 {
                    vec![Cut::Lines(i, i)]
                } else {
                    item_removal(lines, &items, pos)
                };
                for cut in cuts {
                    found.push(related(decl, "serialization key", cut, lines));
                }
            }
        }
    }

    fn coder_calls(
        &self,
        decl: &Declaration,
        name: &str,
        lines: &[&str],
        claimed: &mut HashSet<usize>,
        found: &mut Vec<RelatedDeletion>,
    ) {
        let key_re = Regex::new(&format!(r"forKey:\s*\.`?{}`?\b", regex::escape(name)))
            .expect("escaped name is a valid pattern");

        for (idx, line) in lines.iter().enumerate() {
            if !key_re.is_match(line) || claimed.contains(&idx) || !is_single_statement(line) {
                continue;
            }
            let description = if line.contains("decode") { "decode call" } else { "encode call" };
            claimed.insert(idx);
            found.push(related(decl, description, Cut::Lines(idx, idx), lines));
        }
    }

    fn extensions(&self, decl: &Declaration, name: &str, lines: &[&str], found: &mut Vec<RelatedDeletion>) {
        let ext_re = Regex::new(&format!(
            r"^\s*(?:@\w+\s+)*(?:(?:public|private|fileprivate|internal|open)\s+)?extension\s+`?{}`?\b",
            regex::escape(name)
        ))
        .expect("escaped name is a valid pattern");

        for (idx, line) in lines.iter().enumerate() {
            if !ext_re.is_match(line) {
                continue;
            }
            let end = find_block_end(lines, idx);
            let mut start = idx;
            while start > 0 && is_comment_line(lines[start - 1].trim()) {
                start -= 1;
            }
            found.push(related(decl, "extension", Cut::Lines(start, end), lines));
        }
    }
}

/// How far above a parameter to look for the `(` opening its list
const PARAMETER_LIST_LOOKBACK: usize = 32;

/// Column-exact removal of a parameter or enum case that sits in a
/// comma-separated list, using the same separator rule as related
/// parameters. `None` when `decl` is not found in such a list, or when its
/// case owns its line and a whole-line deletion fits.
pub(super) fn list_entry_removal(decl: &Declaration, lines: &[&str]) -> Option<Vec<RelatedDeletion>> {
    let idx = decl.location.line.checked_sub(1).filter(|&i| i < lines.len())?;
    let name = normalize_identifier(&decl.name);

    let (description, cuts) = match decl.kind {
        DeclarationKind::Parameter => ("parameter", parameter_cuts(lines, idx, name)?),
        DeclarationKind::EnumCase => ("enum case", case_cuts(lines, idx, name)?),
        _ => return None,
    };
    if cuts.is_empty() {
        return None;
    }

    Some(cuts.into_iter().map(|cut| related(decl, description, cut, lines)).collect())
}

fn parameter_cuts(lines: &[&str], idx: usize, name: &str) -> Option<Vec<Cut>> {
    for open_line in (idx.saturating_sub(PARAMETER_LIST_LOOKBACK)..=idx).rev() {
        for (at, _) in lines[open_line].match_indices('(') {
            let Some((items, _)) = parse_items(lines, (open_line, at + 1)) else {
                continue;
            };
            let on_line: Vec<usize> = (0..items.len())
                .filter(|&i| items[i].start.0 <= idx && idx <= items[i].end.0)
                .collect();
            let pos = on_line
                .iter()
                .copied()
                .find(|&i| items[i].binding() == name)
                .or_else(|| on_line.iter().copied().find(|&i| items[i].label() == name));
            if let Some(pos) = pos {
                return Some(item_removal(lines, &items, pos));
            }
        }
    }
    None
}

fn case_cuts(lines: &[&str], idx: usize, name: &str) -> Option<Vec<Cut>> {
    let line = lines[idx];
    let case_at = case_clause(line)?;
    let (items, _) = parse_line_items(lines, idx, case_at + 4)?;
    let pos = items.iter().position(|item| item.case_name() == name)?;
    if items.len() > 1 {
        return Some(item_removal(lines, &items, pos));
    }

    // The only case of its clause: whole line when nothing else shares it
    let item = &items[0];
    if line[..case_at].trim().is_empty() && line[item.end.1..].trim().is_empty() {
        return None;
    }
    Some(vec![Cut::Columns(idx, case_at, item.end.1)])
}

fn related(parent: &Declaration, description: &str, cut: Cut, lines: &[&str]) -> RelatedDeletion {
    match cut {
        Cut::Lines(start, end) => RelatedDeletion {
            description: description.to_string(),
            parent: parent.clone(),
            lines: LineSpan::new(start + 1, end + 1),
            partial: None,
        },
        Cut::Columns(line, start, end) => RelatedDeletion {
            description: description.to_string(),
            parent: parent.clone(),
            lines: LineSpan::single(line + 1),
            partial: Some(ColumnRange {
                line: line + 1,
                start_column: column(lines[line], start),
                end_column: column(lines[line], end),
            }),
        },
    }
}

/// 1-based character column of a byte offset
fn column(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count() + 1
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_single_statement(line: &str) -> bool {
    let opens = line.matches('(').count();
    opens > 0 && opens == line.matches(')').count()
}

/// Byte offset just past a leading `case` keyword
fn case_keyword(line: &str) -> Option<usize> {
    let indent = line.len() - line.trim_start().len();
    let rest = &line[indent..];
    rest.strip_prefix("case")
        .filter(|r| r.starts_with(char::is_whitespace))
        .map(|_| indent + 4)
}

/// Byte offset of the first `case` keyword anywhere in the line
fn case_clause(line: &str) -> Option<usize> {
    line.match_indices("case").map(|(at, _)| at).find(|&at| {
        let before = line[..at].chars().next_back();
        let after = line[at + 4..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric() || c == '_') && after.is_some_and(char::is_whitespace)
    })
}

/// Occurrences of `ident` as a whole word that are not member accesses (`x.ident`)
fn count_bare_references(text: &str, ident: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_alphanumeric() || chars[i] == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let before = start.checked_sub(1).map(|p| chars[p]);
            let before = if before == Some('`') {
                start.checked_sub(2).map(|p| chars[p])
            } else {
                before
            };
            if word == ident && before != Some('.') {
                count += 1;
            }
        } else {
            i += 1;
        }
    }

    count
}

/// Split a parenthesised list opened just before `open` into items.
/// Returns the items and the position of the closing `)`.
fn parse_items(lines: &[&str], open: Pos) -> Option<(Vec<Item>, Pos)> {
    let mut items = Vec::new();
    let mut current: Option<(Pos, Pos, String)> = None;
    let mut depth = 0usize;
    let mut angle = 0usize;
    let mut in_string = false;
    let mut prev = '\0';

    for (line_idx, line) in lines.iter().enumerate().skip(open.0) {
        let from = if line_idx == open.0 { open.1 } else { 0 };
        if from > line.len() {
            return None;
        }
        if let Some((_, _, text)) = current.as_mut() {
            text.push('\n');
        }

        for (offset, ch) in line[from..].char_indices() {
            let at = (line_idx, from + offset);
            if !in_string {
                match ch {
                    '(' | '[' => depth += 1,
                    '<' => angle += 1,
                    '>' if angle > 0 && prev != '-' => angle -= 1,
                    ')' | ']' if depth > 0 => depth -= 1,
                    ')' => {
                        finish(&mut items, current.take(), None);
                        return Some((items, at));
                    }
                    ',' if depth == 0 && angle == 0 => {
                        finish(&mut items, current.take(), Some(at));
                        prev = ch;
                        continue;
                    }
                    _ => {}
                }
            }
            if ch == '"' && prev != '\\' {
                in_string = !in_string;
            }

            match current.as_mut() {
                Some((_, end, text)) => {
                    text.push(ch);
                    if !ch.is_whitespace() {
                        *end = (line_idx, at.1 + ch.len_utf8());
                    }
                }
                None if !ch.is_whitespace() => {
                    current = Some((at, (line_idx, at.1 + ch.len_utf8()), ch.to_string()));
                }
                None => {}
            }
            prev = ch;
        }
    }

    None
}

/// Split the rest of one line (from byte `from`) into comma-separated items.
/// The list ends at a `}` or `;` outside brackets.
fn parse_line_items(lines: &[&str], line_idx: usize, from: usize) -> Option<(Vec<Item>, usize)> {
    let line = lines.get(line_idx)?;
    let mut items = Vec::new();
    let mut current: Option<(Pos, Pos, String)> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut prev = '\0';
    let mut code_end = line.find("//").unwrap_or(line.len()).max(from);

    for (offset, ch) in line[from..code_end].char_indices() {
        let at = (line_idx, from + offset);
        if ch == '"' && prev != '\\' {
            in_string = !in_string;
        }
        if !in_string {
            match ch {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '}' | ';' if depth == 0 => {
                    code_end = at.1;
                    break;
                }
                ',' if depth == 0 => {
                    finish(&mut items, current.take(), Some(at));
                    prev = ch;
                    continue;
                }
                _ => {}
            }
        }
        match current.as_mut() {
            Some((_, end, text)) => {
                text.push(ch);
                if !ch.is_whitespace() {
                    *end = (line_idx, at.1 + ch.len_utf8());
                }
            }
            None if !ch.is_whitespace() => {
                current = Some((at, (line_idx, at.1 + ch.len_utf8()), ch.to_string()));
            }
            None => {}
        }
        prev = ch;
    }
    finish(&mut items, current, None);

    (!items.is_empty()).then_some((items, code_end))
}

fn finish(items: &mut Vec<Item>, current: Option<(Pos, Pos, String)>, comma: Option<Pos>) {
    if let Some((start, end, text)) = current {
        items.push(Item {
            start,
            end,
            comma,
            text: text.trim().to_string(),
        });
    }
}

/// Body lines (opening brace line, closing brace line) of an initializer whose
/// parameter list closes at `close`. Requirement declarations have no body.
fn initializer_body(lines: &[&str], close: Pos) -> Option<(usize, usize)> {
    let after_close = &lines[close.0][close.1..];
    let brace_line = if after_close.contains('{') {
        close.0
    } else {
        let next = close.0 + 1;
        lines.get(next).filter(|l| l.trim_start().starts_with('{'))?;
        next
    };
    Some((brace_line, find_block_end(lines, brace_line)))
}

/// Whether `item` is alone on its line(s), apart from indentation and its separator
fn owns_lines(lines: &[&str], item: &Item) -> bool {
    let first = &lines[item.start.0][..item.start.1];
    let last_line = lines[item.end.0];
    let mut tail = &last_line[item.end.1..];
    if let Some(comma) = item.comma {
        if comma.0 == item.end.0 {
            tail = &last_line[comma.1 + 1..];
        }
    }
    first.trim().is_empty() && tail.trim().is_empty()
}

/// Cuts that remove `items[idx]` along with exactly one adjacent separator
fn item_removal(lines: &[&str], items: &[Item], idx: usize) -> Vec<Cut> {
    let item = &items[idx];
    let prev = idx.checked_sub(1).map(|p| &items[p]);
    let next = items.get(idx + 1);

    // Trailing separator of the previous item, when this item is the last one
    let prev_comma_cut = || match (prev, next) {
        (Some(p), None) => p.comma.map(|c| Cut::Columns(c.0, c.1, c.1 + 1)),
        _ => None,
    };

    if owns_lines(lines, item) {
        let mut cuts = vec![Cut::Lines(item.start.0, item.end.0)];
        if prev.map(|p| p.end.0 != item.start.0).unwrap_or(false) {
            cuts.extend(prev_comma_cut());
        }
        return cuts;
    }

    if item.start.0 != item.end.0 {
        // Shares its first or last line with other code and spans several: too risky
        return Vec::new();
    }

    let line = item.start.0;
    match (prev, next) {
        (_, Some(n)) if n.start.0 == line => vec![Cut::Columns(line, item.start.1, n.start.1)],
        (Some(p), _) if p.end.0 == line => vec![Cut::Columns(line, p.end.1, item.end.1)],
        (_, Some(_)) => {
            let end = item.comma.filter(|c| c.0 == line).map(|c| c.1 + 1).unwrap_or(item.end.1);
            vec![Cut::Columns(line, item.start.1, end)]
        }
        (Some(_), None) => {
            let mut cuts = vec![Cut::Columns(line, item.start.1, item.end.1)];
            cuts.extend(prev_comma_cut());
            cuts
        }
        (None, None) => vec![Cut::Columns(line, item.start.1, item.end.1)],
    }
}
