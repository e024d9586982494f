// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy with stable error codes for the DialogueBranch core.
//!
//! Every error surfaced by a `dlbc-*` crate carries an [`ErrorCode`] (a
//! machine-readable, stable string tag) and belongs to a broad
//! [`ErrorCategory`]. Structural failures are reported as [`ParseError`],
//! which additionally carries a [`SourceLocation`] and an optional node
//! title. Parsers never abort on the first error in a file; callers collect
//! a `Vec<ParseError>` per file and keep going (see `dlbc-script`).

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Expression grammar (C1) failures.
    Expression,
    /// Body tokenizer (C2) failures.
    Lexer,
    /// Body parser (C3) failures.
    Body,
    /// Node/script parser (C4) failures.
    Script,
    /// Project linker (C5) failures.
    Project,
    /// Translation parser (C7) failures.
    Translation,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Expression => "expression",
            Self::Lexer => "lexer",
            Self::Body => "body",
            Self::Script => "script",
            Self::Project => "project",
            Self::Translation => "translation",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serializes to a `SCREAMING_SNAKE_CASE` string that will not
/// change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // -- Expression (C1) --
    /// An unexpected token was found while parsing an expression.
    ExprUnexpectedToken,
    /// A quoted string literal was never closed.
    ExprUnterminatedString,
    /// A numeric literal could not be parsed.
    ExprInvalidNumber,
    /// An assignment operator appeared outside of `set`.
    ExprInvalidAssignmentTarget,

    // -- Lexer (C2) --
    /// A `<<` command block was never closed with `>>`.
    LexerUnterminatedCommand,
    /// A `[[` reply block was never closed with `]]`.
    LexerUnterminatedReply,
    /// A quoted string inside a command was never closed.
    LexerUnterminatedString,

    // -- Body parser (C3) --
    /// A command name is not recognized (and not whitelisted).
    BodyUnknownCommand,
    /// An `if`/`random` command is missing a required clause.
    BodyMissingClause,
    /// A reply statement illegally contains a nested reply.
    BodyNestedReply,
    /// A node pointer token is malformed.
    BodyInvalidPointer,
    /// An `if`/`set` command's embedded expression failed to parse.
    BodyInvalidExpression,
    /// An `<<input>>` command is missing a required `type`/`variable` option.
    BodyInvalidInputOptions,

    // -- Script / node parser (C4) --
    /// A required header field (`title`, `speaker`) is missing or empty.
    ScriptMissingHeaderField,
    /// The same header key appears twice in one node.
    ScriptDuplicateHeaderKey,
    /// Two nodes in the same file share a title.
    ScriptDuplicateTitle,
    /// A node title does not match `[A-Za-z_][A-Za-z0-9_]*`.
    ScriptInvalidTitle,
    /// The `---` header/body separator line is missing.
    ScriptMissingSeparator,
    /// No node in the dialogue has the (case-insensitive) title `Start`.
    ScriptMissingStartNode,
    /// More than one node in the dialogue has the (case-insensitive) title `Start`.
    ScriptDuplicateStartNode,

    // -- Project linker (C5) --
    /// Two language declarations share the same language code.
    ProjectDuplicateLanguageCode,
    /// An external or internal node pointer targets a node that does not exist.
    ProjectMissingReferenceTarget,
    /// A relative node pointer's `..` segments ascend above the language root.
    ProjectPathEscapesRoot,
    /// A node pointer's dialogue reference is empty.
    ProjectEmptyDialogueName,

    // -- Translation parser (C7) --
    /// The same source canonical string appears twice under the same context.
    TranslationDuplicateSource,
    /// A translation entry's value is an empty string.
    TranslationEmptyValue,
    /// A key or value parsed to more than one translatable unit.
    TranslationAmbiguousBody,
    /// A JSON value is neither a string nor a nested object where one of
    /// those was required.
    TranslationInvalidValue,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ExprUnexpectedToken
            | Self::ExprUnterminatedString
            | Self::ExprInvalidNumber
            | Self::ExprInvalidAssignmentTarget => ErrorCategory::Expression,

            Self::LexerUnterminatedCommand
            | Self::LexerUnterminatedReply
            | Self::LexerUnterminatedString => ErrorCategory::Lexer,

            Self::BodyUnknownCommand
            | Self::BodyMissingClause
            | Self::BodyNestedReply
            | Self::BodyInvalidPointer
            | Self::BodyInvalidExpression
            | Self::BodyInvalidInputOptions => ErrorCategory::Body,

            Self::ScriptMissingHeaderField
            | Self::ScriptDuplicateHeaderKey
            | Self::ScriptDuplicateTitle
            | Self::ScriptInvalidTitle
            | Self::ScriptMissingSeparator
            | Self::ScriptMissingStartNode
            | Self::ScriptDuplicateStartNode => ErrorCategory::Script,

            Self::ProjectDuplicateLanguageCode
            | Self::ProjectMissingReferenceTarget
            | Self::ProjectPathEscapesRoot
            | Self::ProjectEmptyDialogueName => ErrorCategory::Project,

            Self::TranslationDuplicateSource
            | Self::TranslationEmptyValue
            | Self::TranslationAmbiguousBody
            | Self::TranslationInvalidValue => ErrorCategory::Translation,

            Self::Internal => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Mirrors the serde SCREAMING_SNAKE_CASE rendering without paying for
        // a round trip through serde_json in the common Display path.
        let s = match self {
            Self::ExprUnexpectedToken => "EXPR_UNEXPECTED_TOKEN",
            Self::ExprUnterminatedString => "EXPR_UNTERMINATED_STRING",
            Self::ExprInvalidNumber => "EXPR_INVALID_NUMBER",
            Self::ExprInvalidAssignmentTarget => "EXPR_INVALID_ASSIGNMENT_TARGET",
            Self::LexerUnterminatedCommand => "LEXER_UNTERMINATED_COMMAND",
            Self::LexerUnterminatedReply => "LEXER_UNTERMINATED_REPLY",
            Self::LexerUnterminatedString => "LEXER_UNTERMINATED_STRING",
            Self::BodyUnknownCommand => "BODY_UNKNOWN_COMMAND",
            Self::BodyMissingClause => "BODY_MISSING_CLAUSE",
            Self::BodyNestedReply => "BODY_NESTED_REPLY",
            Self::BodyInvalidPointer => "BODY_INVALID_POINTER",
            Self::BodyInvalidExpression => "BODY_INVALID_EXPRESSION",
            Self::BodyInvalidInputOptions => "BODY_INVALID_INPUT_OPTIONS",
            Self::ScriptMissingHeaderField => "SCRIPT_MISSING_HEADER_FIELD",
            Self::ScriptDuplicateHeaderKey => "SCRIPT_DUPLICATE_HEADER_KEY",
            Self::ScriptDuplicateTitle => "SCRIPT_DUPLICATE_TITLE",
            Self::ScriptInvalidTitle => "SCRIPT_INVALID_TITLE",
            Self::ScriptMissingSeparator => "SCRIPT_MISSING_SEPARATOR",
            Self::ScriptMissingStartNode => "SCRIPT_MISSING_START_NODE",
            Self::ScriptDuplicateStartNode => "SCRIPT_DUPLICATE_START_NODE",
            Self::ProjectDuplicateLanguageCode => "PROJECT_DUPLICATE_LANGUAGE_CODE",
            Self::ProjectMissingReferenceTarget => "PROJECT_MISSING_REFERENCE_TARGET",
            Self::ProjectPathEscapesRoot => "PROJECT_PATH_ESCAPES_ROOT",
            Self::ProjectEmptyDialogueName => "PROJECT_EMPTY_DIALOGUE_NAME",
            Self::TranslationDuplicateSource => "TRANSLATION_DUPLICATE_SOURCE",
            Self::TranslationEmptyValue => "TRANSLATION_EMPTY_VALUE",
            Self::TranslationAmbiguousBody => "TRANSLATION_AMBIGUOUS_BODY",
            Self::TranslationInvalidValue => "TRANSLATION_INVALID_VALUE",
            Self::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// SourceLocation
// ---------------------------------------------------------------------------

/// A 1-based line/column position within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl SourceLocation {
    /// Construct a new location.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The location at the very start of a file.
    #[must_use]
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// A recoverable syntactic or structural problem found while parsing a
/// script or translation file.
///
/// Parsers collect these rather than aborting: one error inside a node does
/// not prevent the rest of the file from being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Logical path of the file the error occurred in.
    pub file: String,
    /// Title of the node the error occurred in, if parsing had identified one.
    pub node_title: Option<String>,
    /// Location within the file.
    pub location: SourceLocation,
    /// Human-readable description of the problem.
    pub message: String,
    /// Stable machine-readable code for this problem.
    pub code: ErrorCode,
}

impl ParseError {
    /// Construct a new parse error.
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        location: SourceLocation,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            node_title: None,
            location,
            message: message.into(),
            code,
        }
    }

    /// Attach the node title this error occurred while parsing.
    #[must_use]
    pub fn with_node_title(mut self, title: impl Into<String>) -> Self {
        self.node_title = Some(title.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_title {
            Some(title) => write!(
                f,
                "{}:{} [{}] in node '{}': {}",
                self.file, self.location, self.code, title, self.message
            ),
            None => write!(
                f,
                "{}:{} [{}]: {}",
                self.file, self.location, self.code, self.message
            ),
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Reference resolution issues
// ---------------------------------------------------------------------------

/// Severity assigned to a [`ReferenceIssue`].
///
/// Missing reference targets are warnings by default (§7): the project
/// linker reports them but does not fail the build, since dialogue authors
/// routinely work with incomplete projects. A caller may opt into strict
/// mode, which promotes the same issue to [`Severity::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Non-blocking; reported for visibility only.
    Warning,
    /// Blocking under strict mode.
    Error,
}

/// A well-formed node pointer whose target dialogue or node does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIssue {
    /// Dialogue the reference originates from.
    pub origin_dialogue: String,
    /// Node the reference originates from.
    pub origin_node_id: String,
    /// Absolute dialogue path the reference resolved to.
    pub target_dialogue: String,
    /// Node id the reference points at.
    pub target_node_id: String,
    /// Severity of this issue (see [`Severity`]).
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} -> {}::{}: {}",
            self.origin_dialogue, self.origin_node_id, self.target_dialogue, self.target_node_id, self.message
        )
    }
}

impl std::error::Error for ReferenceIssue {}

/// Two language declarations (from a `language-map` descriptor or inferred
/// top-level directories) share the same language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateLanguageCodeError {
    /// The language code declared more than once.
    pub code: String,
    /// Where the code was first declared.
    pub first_declared_in: String,
    /// Where the duplicate declaration was found.
    pub duplicate_in: String,
}

impl fmt::Display for DuplicateLanguageCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate language code '{}': first declared in '{}', duplicated in '{}'",
            self.code, self.first_declared_in, self.duplicate_in
        )
    }
}

impl std::error::Error for DuplicateLanguageCodeError {}

/// Placeholder type for input validation failures raised by external
/// collaborators (the CLI argument parser). Never constructed by this core;
/// retained so downstream crates have a stable name to `impl` against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidInputError {
    /// Human-readable description supplied by the collaborator.
    pub message: String,
}

impl fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidInputError {}

/// Placeholder type for errors raised by a runtime expression evaluator
/// against a live variable store. This core parses expressions (C1) but
/// never evaluates them, so this type is never constructed here; it exists
/// so a runtime evaluator built on top of this crate has a stable error
/// name to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableError {
    /// Name of the variable involved.
    pub variable: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for VariableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_category_mapping_is_total() {
        assert_eq!(ErrorCode::ExprUnexpectedToken.category(), ErrorCategory::Expression);
        assert_eq!(ErrorCode::LexerUnterminatedCommand.category(), ErrorCategory::Lexer);
        assert_eq!(ErrorCode::BodyUnknownCommand.category(), ErrorCategory::Body);
        assert_eq!(ErrorCode::ScriptMissingHeaderField.category(), ErrorCategory::Script);
        assert_eq!(
            ErrorCode::ProjectDuplicateLanguageCode.category(),
            ErrorCategory::Project
        );
        assert_eq!(
            ErrorCode::TranslationDuplicateSource.category(),
            ErrorCategory::Translation
        );
        assert_eq!(ErrorCode::Internal.category(), ErrorCategory::Internal);
    }

    #[test]
    fn error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::ScriptMissingHeaderField).unwrap();
        assert_eq!(json, "\"SCRIPT_MISSING_HEADER_FIELD\"");
    }

    #[test]
    fn error_code_display_matches_serde_rendering() {
        for code in [
            ErrorCode::ExprUnexpectedToken,
            ErrorCode::LexerUnterminatedReply,
            ErrorCode::BodyNestedReply,
            ErrorCode::ScriptDuplicateTitle,
            ErrorCode::ProjectPathEscapesRoot,
            ErrorCode::TranslationEmptyValue,
            ErrorCode::Internal,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            let expected = format!("\"{code}\"");
            assert_eq!(json, expected);
        }
    }

    #[test]
    fn parse_error_display_includes_node_title_when_present() {
        let err = ParseError::new(
            "zone1/npc",
            SourceLocation::new(3, 5),
            ErrorCode::ScriptMissingHeaderField,
            "missing 'speaker'",
        )
        .with_node_title("Start");
        let rendered = err.to_string();
        assert!(rendered.contains("zone1/npc"));
        assert!(rendered.contains("3:5"));
        assert!(rendered.contains("Start"));
        assert!(rendered.contains("missing 'speaker'"));
    }

    #[test]
    fn parse_error_display_without_node_title() {
        let err = ParseError::new(
            "zone1/npc",
            SourceLocation::start(),
            ErrorCode::ScriptMissingSeparator,
            "expected '---'",
        );
        assert!(!err.to_string().contains("in node"));
    }

    #[test]
    fn reference_issue_display() {
        let issue = ReferenceIssue {
            origin_dialogue: "zone1/npc".into(),
            origin_node_id: "Start".into(),
            target_dialogue: "shared/intro".into(),
            target_node_id: "Start".into(),
            severity: Severity::Warning,
            message: "target node not found".into(),
        };
        assert_eq!(
            issue.to_string(),
            "zone1/npc::Start -> shared/intro::Start: target node not found"
        );
    }
}
