// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translation file parser (C7): turns a `.json` translation file into a
//! [`TranslationMap`].
//!
//! A translation file is a JSON object. String values are translations,
//! keyed by their source body text; object values introduce a nested
//! context (a whitespace-separated set of labels merged with whatever
//! context the caller is already inside). Both keys and values are parsed
//! as node-body text restricted to the `input` command only — `if`,
//! `random`, `set`, actions, and replies never appear in translation text.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use dlbc_body::{parse_body, ParseContext};
use dlbc_core::{ContextTranslation, Translatable, TranslationMap};
use dlbc_error::{ErrorCode, ParseError, SourceLocation};
use std::collections::{BTreeSet, HashSet};

/// Commands permitted inside translation entry text (spec §4.7): only
/// `<<input>>` carries translatable meaning outside a full script body.
pub const BODY_WHITELIST: &[&str] = &["input"];

/// Outcome of parsing one `.json` translation file.
#[derive(Debug, Clone)]
pub struct ParserResult {
    /// Every distinct source translatable found, with its context-qualified
    /// variants.
    pub map: TranslationMap,
    /// Every error collected while parsing, in object traversal order.
    pub errors: Vec<ParseError>,
    /// Non-fatal diagnostics (currently: skipped empty-value entries).
    pub warnings: Vec<String>,
}

/// Parse a complete translation file into a [`TranslationMap`].
///
/// `file` is the logical dialogue path this translation file belongs to,
/// used only to label errors.
pub fn parse_translation_file(file: &str, root: &serde_json::Value) -> ParserResult {
    let span = tracing::debug_span!("parse_translation_file", file_path = %file);
    let _enter = span.enter();

    let mut result = ParserResult { map: TranslationMap::new(), errors: Vec::new(), warnings: Vec::new() };
    let Some(root_obj) = root.as_object() else {
        result.errors.push(ParseError::new(
            file,
            SourceLocation::start(),
            ErrorCode::TranslationInvalidValue,
            "translation file root must be a JSON object",
        ));
        return result;
    };

    let mut seen: HashSet<(String, BTreeSet<String>)> = HashSet::new();
    walk(file, root_obj, &BTreeSet::new(), &mut result, &mut seen);
    tracing::debug!(entry_count = result.map.len(), error_count = result.errors.len(), "parsed translation file");
    result
}

fn walk(
    file: &str,
    obj: &serde_json::Map<String, serde_json::Value>,
    context: &BTreeSet<String>,
    result: &mut ParserResult,
    seen: &mut HashSet<(String, BTreeSet<String>)>,
) {
    for (key, value) in obj {
        match value {
            serde_json::Value::String(text) => {
                if text.is_empty() {
                    result.warnings.push(format!("translation entry '{key}' has an empty value, skipped"));
                    continue;
                }
                let source = match parse_translatable(file, key) {
                    Ok(Some(t)) => t,
                    Ok(None) => continue,
                    Err(e) => {
                        result.errors.push(e);
                        continue;
                    }
                };
                let translation = match parse_translatable(file, text) {
                    Ok(Some(t)) => t,
                    Ok(None) => continue,
                    Err(e) => {
                        result.errors.push(e);
                        continue;
                    }
                };
                let dedupe_key = (source.canonical_string(), context.clone());
                if !seen.insert(dedupe_key.clone()) {
                    result.errors.push(ParseError::new(
                        file,
                        SourceLocation::start(),
                        ErrorCode::TranslationDuplicateSource,
                        format!("duplicate translation source '{}' under the same context", dedupe_key.0),
                    ));
                    continue;
                }
                result.map.push(source, ContextTranslation { context: context.clone(), translation });
            }
            serde_json::Value::Object(nested) => {
                let mut merged = context.clone();
                merged.extend(key.split_whitespace().map(str::to_string));
                walk(file, nested, &merged, result, seen);
            }
            other => {
                result.errors.push(ParseError::new(
                    file,
                    SourceLocation::start(),
                    ErrorCode::TranslationInvalidValue,
                    format!("translation entry '{key}' has a value of unsupported JSON type '{}'", json_type_name(other)),
                ));
            }
        }
    }
}

/// Parse `src` as body text restricted to `<<input>>`, and require it to
/// yield exactly one translatable span. `Ok(None)` means `src` parsed to no
/// content at all (an empty or whitespace-only string).
fn parse_translatable(file: &str, src: &str) -> Result<Option<Translatable>, ParseError> {
    let ctx = ParseContext { file, origin_node_id: "", whitelist: Some(BODY_WHITELIST) };
    let body = parse_body(&ctx, src)?;
    let mut spans = dlbc_extract::extract("", "", &body);
    match spans.len() {
        0 => Ok(None),
        1 => Ok(Some(spans.remove(0).translatable)),
        n => Err(ParseError::new(
            file,
            SourceLocation::start(),
            ErrorCode::TranslationAmbiguousBody,
            format!("'{src}' parses to {n} translatable spans, expected exactly one"),
        )),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Object(_) => "object",
    }
}
