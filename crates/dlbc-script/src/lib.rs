// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node/script parser (C4): turns a whole `.dlb` file into a
//! [`dlbc_core::Dialogue`].
//!
//! A script is a sequence of nodes separated by lines that equal exactly
//! `===`. Each node is a header block (`key: value` lines), a `---`
//! separator, and body text up to the next `===` or end of file. Header
//! parsing and body parsing (via `dlbc-body`, C3) are both permissive: one
//! malformed node does not abort the file, callers get back every error
//! collected across every node.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use dlbc_body::{parse_body, ParseContext};
use dlbc_core::{is_valid_title, Body, Command, Dialogue, Header, Node, NodePointer, Segment};
use dlbc_error::{ErrorCode, ParseError, SourceLocation};
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Outcome of parsing one `.dlb` file.
#[derive(Debug, Clone)]
pub struct ParserResult {
    /// The parsed dialogue. Always present (possibly with zero nodes); a
    /// node-level failure drops that one node, not the whole file.
    pub dialogue: Dialogue,
    /// Every error collected across every node, in source order.
    pub errors: Vec<ParseError>,
    /// Non-fatal diagnostic messages.
    pub warnings: Vec<String>,
}

/// Parse a complete `.dlb` file into a [`Dialogue`].
///
/// `file` is both the logical dialogue path (used as the dialogue's `name`
/// and in error locations) and the origin for any node pointers found.
/// `language_code` is the language this file was read from.
pub fn parse_script(file: &str, language_code: &str, src: &str) -> ParserResult {
    let span = tracing::debug_span!("parse_dialogue_file", %language_code, file_path = %file);
    let _enter = span.enter();

    let mut errors = Vec::new();
    let warnings = Vec::new();
    let mut dialogue = Dialogue::new(file, language_code);
    let mut seen_titles: HashSet<String> = HashSet::new();

    let lines: Vec<&str> = src.lines().collect();
    for chunk in split_nodes(&lines) {
        if chunk.lines.iter().all(|l| l.trim().is_empty()) {
            continue;
        }
        match parse_node(file, &chunk) {
            Ok((node, mut soft_errors)) => {
                errors.append(&mut soft_errors);
                if !seen_titles.insert(node.title().to_string()) {
                    errors.push(
                        ParseError::new(
                            file,
                            chunk.start_location(),
                            ErrorCode::ScriptDuplicateTitle,
                            format!("duplicate node title '{}'", node.title()),
                        )
                        .with_node_title(node.title()),
                    );
                    continue;
                }
                collect_references(&node.body, &mut dialogue.internal_references, &mut dialogue.external_references);
                dialogue.nodes.push(node);
            }
            Err(mut node_errors) => errors.append(&mut node_errors),
        }
    }

    match dialogue.start_node_count() {
        1 => {}
        0 => errors.push(ParseError::new(
            file,
            SourceLocation::new(1, 1),
            ErrorCode::ScriptMissingStartNode,
            "dialogue has no node titled 'Start'",
        )),
        _ => errors.push(ParseError::new(
            file,
            SourceLocation::new(1, 1),
            ErrorCode::ScriptDuplicateStartNode,
            "dialogue has more than one node titled 'Start'",
        )),
    }

    tracing::debug!(node_count = dialogue.nodes.len(), error_count = errors.len(), "parsed dialogue file");
    ParserResult { dialogue, errors, warnings }
}

/// The raw line range making up one node, plus its absolute start line.
struct NodeChunk<'a> {
    lines: &'a [&'a str],
    start_line: usize,
}

impl<'a> NodeChunk<'a> {
    fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.start_line, 1)
    }
}

/// Split a file's lines into node chunks at lines that trim to exactly `===`.
fn split_nodes<'a>(lines: &'a [&'a str]) -> Vec<NodeChunk<'a>> {
    let mut chunks = Vec::new();
    let mut start = 0usize;
    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "===" {
            chunks.push(NodeChunk { lines: &lines[start..i], start_line: start + 1 });
            start = i + 1;
        }
    }
    chunks.push(NodeChunk { lines: &lines[start..], start_line: start + 1 });
    chunks
}

/// Parse one node chunk (header + `---` + body) into a [`Node`].
///
/// `Err` means the node could not be constructed at all (missing separator,
/// missing a required header field, or a body parse failure); the caller
/// drops such nodes but keeps parsing the rest of the file. `Ok` carries the
/// node plus any recoverable (non-dropping) errors found along the way —
/// a duplicate header key or an invalid title still yields a usable node.
fn parse_node(file: &str, chunk: &NodeChunk<'_>) -> Result<(Node, Vec<ParseError>), Vec<ParseError>> {
    let mut soft_errors = Vec::new();

    let Some(sep_idx) = chunk.lines.iter().position(|l| l.trim() == "---") else {
        return Err(vec![ParseError::new(
            file,
            chunk.start_location(),
            ErrorCode::ScriptMissingSeparator,
            "expected a '---' line separating the header from the body",
        )]);
    };

    let header_lines = &chunk.lines[..sep_idx];
    let body_lines = &chunk.lines[sep_idx + 1..];
    let body_start_line = chunk.start_line + sep_idx + 1;

    let header = match parse_header(file, chunk.start_line, header_lines, &mut soft_errors) {
        Some(h) => h,
        None => return Err(soft_errors),
    };

    let body_src = body_lines.join("\n");
    let body = match parse_body(
        &ParseContext { file, origin_node_id: &header.title, whitelist: None },
        &body_src,
    ) {
        Ok(body) => body,
        Err(e) => {
            let absolute = SourceLocation::new(body_start_line + e.location.line.saturating_sub(1), e.location.column);
            soft_errors.push(ParseError::new(file, absolute, e.code, e.message).with_node_title(&header.title));
            return Err(soft_errors);
        }
    };

    if !is_valid_title(&header.title) {
        soft_errors.push(
            ParseError::new(
                file,
                chunk.start_location(),
                ErrorCode::ScriptInvalidTitle,
                format!("node title '{}' does not match [A-Za-z_][A-Za-z0-9_]*", header.title),
            )
            .with_node_title(&header.title),
        );
    }

    Ok((Node::new(header, body), soft_errors))
}

/// Parse `key: value` header lines. Returns `None` (with `errors` filled in)
/// if a required field is missing.
fn parse_header(
    file: &str,
    start_line: usize,
    lines: &[&str],
    errors: &mut Vec<ParseError>,
) -> Option<Header> {
    let mut title = None;
    let mut speaker = None;
    let mut color_id = None;
    let mut extra = BTreeMap::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for (offset, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let location = SourceLocation::new(start_line + offset, 1);
        let Some((key, value)) = trimmed.split_once(':') else {
            errors.push(ParseError::new(
                file,
                location,
                ErrorCode::ScriptMissingHeaderField,
                format!("malformed header line '{trimmed}', expected 'key: value'"),
            ));
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            errors.push(ParseError::new(
                file,
                location,
                ErrorCode::ScriptMissingHeaderField,
                "header line has an empty key",
            ));
            continue;
        }
        if !seen_keys.insert(key.to_string()) {
            errors.push(ParseError::new(
                file,
                location,
                ErrorCode::ScriptDuplicateHeaderKey,
                format!("duplicate header key '{key}'"),
            ));
            continue;
        }
        match key {
            "title" => title = Some(value.to_string()),
            "speaker" => speaker = Some(value.to_string()),
            "colorID" => color_id = Some(value.to_string()),
            other => {
                extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    let start_location = SourceLocation::new(start_line, 1);
    let title = match title.filter(|t| !t.is_empty()) {
        Some(t) => t,
        None => {
            errors.push(ParseError::new(
                file,
                start_location,
                ErrorCode::ScriptMissingHeaderField,
                "missing required header field 'title'",
            ));
            return None;
        }
    };
    let speaker = match speaker.filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => {
            errors.push(
                ParseError::new(
                    file,
                    start_location,
                    ErrorCode::ScriptMissingHeaderField,
                    "missing required header field 'speaker'",
                )
                .with_node_title(&title),
            );
            return None;
        }
    };

    Some(Header { title, speaker, color_id, extra })
}

/// Recursively collect every reply's node pointer from `body` (and its
/// nested `if`/`random` clause bodies) into `internal`/`external`. Reply
/// statements are never recursed into: the body parser forbids nested
/// replies, so a statement body can contain no further pointers.
fn collect_references(body: &Body, internal: &mut Vec<NodePointer>, external: &mut Vec<NodePointer>) {
    for segment in &body.segments {
        match segment {
            Segment::Command(Command::If { clauses, else_branch }) => {
                for (_, clause_body) in clauses {
                    collect_references(clause_body, internal, external);
                }
                if let Some(else_body) = else_branch {
                    collect_references(else_body, internal, external);
                }
            }
            Segment::Command(Command::Random { clauses }) => {
                for clause_body in clauses {
                    collect_references(clause_body, internal, external);
                }
            }
            _ => {}
        }
    }
    for reply in &body.replies {
        match &reply.next {
            NodePointer::Internal { .. } => internal.push(reply.next.clone()),
            NodePointer::External { .. } => external.push(reply.next.clone()),
        }
    }
}
