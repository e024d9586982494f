// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flat tokenizer for `.dlb` node body text.
//!
//! Two lexical modes alternate as scanning proceeds: **body** mode (plain
//! text, `$variable` references, and the structural delimiters `<<`, `>>`,
//! `[[`, `]]`, `|`) and **command** mode (the content between a matched
//! `<<`/`>>` pair, where whitespace separates bare [`TokenKind::Word`]s and
//! `"…"` opens a [`TokenKind::QuotedString`]). The two modes never nest —
//! commands cannot contain commands — so a single mode flag is enough; no
//! mode stack is required.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use dlbc_error::SourceLocation;
use std::fmt;

/// A single body-tokenizer token, tagged with its start location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Where the token starts in the original source.
    pub location: SourceLocation,
}

/// The kind of a body-tokenizer token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A run of plain text (already unescaped), outside of command mode.
    Text(String),
    /// A `$name` variable reference (name excludes the `$`).
    Variable(String),
    /// `<<`
    CommandStart,
    /// `>>`
    CommandEnd,
    /// `[[`
    ReplyStart,
    /// `]]`
    ReplyEnd,
    /// `|`
    ReplySeparator,
    /// A line break (LF, CRLF, or lone CR all count as one).
    Newline,
    /// A bare whitespace-delimited run inside a command (identifiers,
    /// operators, `$variables`, numbers — anything not quoted).
    Word(String),
    /// A `"…"` string literal inside a command (already unescaped).
    QuotedString(String),
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Variable(s) => write!(f, "${s}"),
            Self::CommandStart => f.write_str("<<"),
            Self::CommandEnd => f.write_str(">>"),
            Self::ReplyStart => f.write_str("[["),
            Self::ReplyEnd => f.write_str("]]"),
            Self::ReplySeparator => f.write_str("|"),
            Self::Newline => f.write_str("\\n"),
            Self::Word(s) => write!(f, "{s}"),
            Self::QuotedString(s) => write!(f, "{s:?}"),
            Self::Eof => f.write_str("<eof>"),
        }
    }
}

/// Error produced while tokenizing body text.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Where the problem was detected (the opening delimiter, for
    /// unterminated constructs).
    pub location: SourceLocation,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Body,
    Command,
}

/// Tokenize raw `.dlb` body text into a flat token list (`Eof`-terminated).
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 1usize;
    let mut tokens = Vec::new();
    let mut mode = Mode::Body;
    let mut command_start: Option<SourceLocation> = None;

    macro_rules! advance {
        () => {{
            if chars[i] == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            i += 1;
        }};
    }

    #[cfg(feature = "trace-lexer")]
    macro_rules! trace_token {
        ($tok:expr) => {
            tracing::trace!(token = ?$tok.kind, location = %$tok.location, "lexer token");
        };
    }
    #[cfg(not(feature = "trace-lexer"))]
    macro_rules! trace_token {
        ($tok:expr) => {};
    }

    while i < chars.len() {
        let c = chars[i];

        if mode == Mode::Body {
            // Newlines: LF, CRLF, or lone CR all collapse to one token.
            if c == '\n' {
                let start = SourceLocation::new(line, col);
                advance!();
                let tok = Token { kind: TokenKind::Newline, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == '\r' {
                let start = SourceLocation::new(line, col);
                advance!();
                if i < chars.len() && chars[i] == '\n' {
                    advance!();
                }
                let tok = Token { kind: TokenKind::Newline, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == '\\' && i + 1 < chars.len() {
                let start = SourceLocation::new(line, col);
                advance!();
                let escaped = chars[i];
                advance!();
                push_text(&mut tokens, start, escaped.to_string());
                continue;
            }
            if c == '$' && i + 1 < chars.len() && (chars[i + 1].is_alphabetic() || chars[i + 1] == '_') {
                let start = SourceLocation::new(line, col);
                advance!();
                let mut name = String::new();
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    name.push(chars[i]);
                    advance!();
                }
                let tok = Token { kind: TokenKind::Variable(name), location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == '<' && i + 1 < chars.len() && chars[i + 1] == '<' {
                let start = SourceLocation::new(line, col);
                advance!();
                advance!();
                command_start = Some(start);
                mode = Mode::Command;
                let tok = Token { kind: TokenKind::CommandStart, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == '[' && i + 1 < chars.len() && chars[i + 1] == '[' {
                let start = SourceLocation::new(line, col);
                advance!();
                advance!();
                let tok = Token { kind: TokenKind::ReplyStart, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == ']' && i + 1 < chars.len() && chars[i + 1] == ']' {
                let start = SourceLocation::new(line, col);
                advance!();
                advance!();
                let tok = Token { kind: TokenKind::ReplyEnd, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            if c == '|' {
                let start = SourceLocation::new(line, col);
                advance!();
                let tok = Token { kind: TokenKind::ReplySeparator, location: start };
                trace_token!(tok);
                tokens.push(tok);
                continue;
            }
            // Anything else (including a lone '<', '>', '[', ']', or '$' not
            // starting a variable) is plain text.
            let start = SourceLocation::new(line, col);
            advance!();
            push_text(&mut tokens, start, c.to_string());
            continue;
        }

        // Mode::Command
        if c.is_whitespace() {
            advance!();
            continue;
        }
        if c == '>' && i + 1 < chars.len() && chars[i + 1] == '>' {
            let start = SourceLocation::new(line, col);
            advance!();
            advance!();
            mode = Mode::Body;
            command_start = None;
            let tok = Token { kind: TokenKind::CommandEnd, location: start };
            trace_token!(tok);
            tokens.push(tok);
            continue;
        }
        if c == '"' {
            let start = SourceLocation::new(line, col);
            advance!();
            let mut s = String::new();
            let mut closed = false;
            while i < chars.len() {
                let cc = chars[i];
                if cc == '"' {
                    advance!();
                    closed = true;
                    break;
                }
                if cc == '\\' && i + 1 < chars.len() {
                    advance!();
                    s.push(chars[i]);
                    advance!();
                } else {
                    s.push(cc);
                    advance!();
                }
            }
            if !closed {
                return Err(LexError {
                    location: start,
                    message: "unterminated quoted string in command".to_string(),
                });
            }
            let tok = Token { kind: TokenKind::QuotedString(s), location: start };
            trace_token!(tok);
            tokens.push(tok);
            continue;
        }
        // A bare word: everything up to whitespace, a quote, or an
        // unescaped '>>'.
        let start = SourceLocation::new(line, col);
        let mut word = String::new();
        loop {
            if i >= chars.len() {
                break;
            }
            let cc = chars[i];
            if cc.is_whitespace() || cc == '"' {
                break;
            }
            if cc == '>' && i + 1 < chars.len() && chars[i + 1] == '>' {
                break;
            }
            if cc == '\\' && i + 1 < chars.len() {
                advance!();
                word.push(chars[i]);
                advance!();
                continue;
            }
            word.push(cc);
            advance!();
        }
        let tok = Token { kind: TokenKind::Word(word), location: start };
        trace_token!(tok);
        tokens.push(tok);
    }

    if mode == Mode::Command {
        return Err(LexError {
            location: command_start.unwrap_or_else(SourceLocation::start),
            message: "unterminated command, expected '>>'".to_string(),
        });
    }

    tokens.push(Token { kind: TokenKind::Eof, location: SourceLocation::new(line, col) });
    Ok(tokens)
}

/// Push a text fragment, merging it into a trailing `Text` token if the
/// previous token was also text starting at an adjacent position.
fn push_text(tokens: &mut Vec<Token>, start: SourceLocation, fragment: String) {
    if let Some(Token { kind: TokenKind::Text(existing), .. }) = tokens.last_mut() {
        existing.push_str(&fragment);
    } else {
        tokens.push(Token { kind: TokenKind::Text(fragment), location: start });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(kinds("Hello there"), vec![TokenKind::Text("Hello there".into()), TokenKind::Eof]);
    }

    #[test]
    fn variable_reference_splits_text() {
        assert_eq!(
            kinds("Hi $name!"),
            vec![
                TokenKind::Text("Hi ".into()),
                TokenKind::Variable("name".into()),
                TokenKind::Text("!".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dollar_without_ident_is_literal() {
        assert_eq!(kinds("costs $5"), vec![TokenKind::Text("costs $5".into()), TokenKind::Eof]);
    }

    #[test]
    fn escaped_special_chars_become_text() {
        assert_eq!(kinds("\\<\\>\\[\\]\\|\\$\\\\"), vec![TokenKind::Text("<>[]|$\\".into()), TokenKind::Eof]);
    }

    #[test]
    fn command_delimiters_and_condition_words() {
        assert_eq!(
            kinds("<<if $x >= 3>>yes<<endif>>"),
            vec![
                TokenKind::CommandStart,
                TokenKind::Word("if".into()),
                TokenKind::Word("$x".into()),
                TokenKind::Word(">=".into()),
                TokenKind::Word("3".into()),
                TokenKind::CommandEnd,
                TokenKind::Text("yes".into()),
                TokenKind::CommandStart,
                TokenKind::Word("endif".into()),
                TokenKind::CommandEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quoted_string_inside_command() {
        assert_eq!(
            kinds(r#"<<input type="text" variable="$x">>"#),
            vec![
                TokenKind::CommandStart,
                TokenKind::Word("input".into()),
                TokenKind::Word("type=".into()),
                TokenKind::QuotedString("text".into()),
                TokenKind::Word("variable=".into()),
                TokenKind::QuotedString("$x".into()),
                TokenKind::CommandEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reply_tokens() {
        assert_eq!(
            kinds("[[Bye|N2]]"),
            vec![
                TokenKind::ReplyStart,
                TokenKind::Text("Bye".into()),
                TokenKind::ReplySeparator,
                TokenKind::Text("N2".into()),
                TokenKind::ReplyEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_command_is_an_error() {
        let err = tokenize("<<if $x").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn unterminated_quoted_string_is_an_error() {
        let err = tokenize(r#"<<input type="text>>"#).unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn crlf_and_lone_cr_both_count_as_one_newline() {
        assert_eq!(kinds("a\r\nb\rc\nd"), vec![
            TokenKind::Text("a".into()),
            TokenKind::Newline,
            TokenKind::Text("b".into()),
            TokenKind::Newline,
            TokenKind::Text("c".into()),
            TokenKind::Newline,
            TokenKind::Text("d".into()),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn line_tracking_across_newlines() {
        let toks = tokenize("a\nb").unwrap();
        let eof = toks.last().unwrap();
        assert_eq!(eof.location, SourceLocation::new(2, 2));
    }
}
