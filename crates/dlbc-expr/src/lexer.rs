//! Self-contained tokenizer for expression source text.
//!
//! This is deliberately independent of the body tokenizer (`dlbc-lexer`):
//! by the time an expression substring reaches this crate it has already
//! been carved out of a `<<...>>` command by the body parser, and the
//! lexical rules here (numbers, string escapes, operators) are specific to
//! the expression sub-grammar.

use dlbc_error::SourceLocation;
use std::fmt;

/// A single expression-grammar token, tagged with its start location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Where the token starts in the original source.
    pub location: SourceLocation,
}

/// The kind of an expression-grammar token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An integer literal.
    Integer(i64),
    /// A decimal literal.
    Decimal(f64),
    /// A double- or single-quoted string literal (already unescaped).
    Str(String),
    /// An identifier: `true`, `false`, `null`, or a function name.
    Ident(String),
    /// A `$name` variable reference (name excludes the `$`).
    Variable(String),
    /// `||`
    OrOr,
    /// `&&`
    AndAnd,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `=`
    Assign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `*=`
    StarAssign,
    /// `/=`
    SlashAssign,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Ident(s) => write!(f, "{s}"),
            Self::Variable(s) => write!(f, "${s}"),
            Self::OrOr => f.write_str("||"),
            Self::AndAnd => f.write_str("&&"),
            Self::EqEq => f.write_str("=="),
            Self::NotEq => f.write_str("!="),
            Self::Lt => f.write_str("<"),
            Self::LtEq => f.write_str("<="),
            Self::Gt => f.write_str(">"),
            Self::GtEq => f.write_str(">="),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Percent => f.write_str("%"),
            Self::Bang => f.write_str("!"),
            Self::Assign => f.write_str("="),
            Self::PlusAssign => f.write_str("+="),
            Self::MinusAssign => f.write_str("-="),
            Self::StarAssign => f.write_str("*="),
            Self::SlashAssign => f.write_str("/="),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Eof => f.write_str("<eof>"),
        }
    }
}

/// Error produced while tokenizing expression source text.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Where the problem occurred.
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

/// Tokenize an expression source string into a flat token list (`Eof`-terminated).
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 1usize;
    let mut tokens = Vec::new();

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

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            advance!();
            continue;
        }
        let start = SourceLocation::new(line, col);
        match c {
            '"' | '\'' => {
                let quote = c;
                advance!();
                let mut s = String::new();
                let mut closed = false;
                while i < chars.len() {
                    let cc = chars[i];
                    if cc == quote {
                        advance!();
                        closed = true;
                        break;
                    }
                    if cc == '\\' && i + 1 < chars.len() {
                        advance!();
                        let esc = chars[i];
                        s.push(match esc {
                            'n' => '\n',
                            'r' => '\r',
                            't' => '\t',
                            '\\' => '\\',
                            '"' => '"',
                            '\'' => '\'',
                            other => other,
                        });
                        advance!();
                    } else {
                        s.push(cc);
                        advance!();
                    }
                }
                if !closed {
                    return Err(LexError {
                        location: start,
                        message: "unterminated string literal".to_string(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Str(s),
                    location: start,
                });
            }
            '$' if i + 1 < chars.len() && (chars[i + 1].is_alphabetic() || chars[i + 1] == '_') => {
                advance!();
                let mut name = String::new();
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    name.push(chars[i]);
                    advance!();
                }
                tokens.push(Token {
                    kind: TokenKind::Variable(name),
                    location: start,
                });
            }
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                let mut is_decimal = false;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    num.push(chars[i]);
                    advance!();
                }
                if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    is_decimal = true;
                    num.push('.');
                    advance!();
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        num.push(chars[i]);
                        advance!();
                    }
                }
                if is_decimal {
                    let value: f64 = num.parse().map_err(|_| LexError {
                        location: start,
                        message: format!("invalid decimal literal '{num}'"),
                    })?;
                    tokens.push(Token {
                        kind: TokenKind::Decimal(value),
                        location: start,
                    });
                } else {
                    let value: i64 = num.parse().map_err(|_| LexError {
                        location: start,
                        message: format!("invalid integer literal '{num}'"),
                    })?;
                    tokens.push(Token {
                        kind: TokenKind::Integer(value),
                        location: start,
                    });
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    ident.push(chars[i]);
                    advance!();
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(ident),
                    location: start,
                });
            }
            '|' if i + 1 < chars.len() && chars[i + 1] == '|' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::OrOr, location: start });
            }
            '&' if i + 1 < chars.len() && chars[i + 1] == '&' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::AndAnd, location: start });
            }
            '=' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::EqEq, location: start });
            }
            '!' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::NotEq, location: start });
            }
            '<' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::LtEq, location: start });
            }
            '>' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::GtEq, location: start });
            }
            '+' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::PlusAssign, location: start });
            }
            '-' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::MinusAssign, location: start });
            }
            '*' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::StarAssign, location: start });
            }
            '/' if i + 1 < chars.len() && chars[i + 1] == '=' => {
                advance!();
                advance!();
                tokens.push(Token { kind: TokenKind::SlashAssign, location: start });
            }
            '<' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Lt, location: start });
            }
            '>' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Gt, location: start });
            }
            '+' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Plus, location: start });
            }
            '-' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Minus, location: start });
            }
            '*' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Star, location: start });
            }
            '/' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Slash, location: start });
            }
            '%' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Percent, location: start });
            }
            '!' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Bang, location: start });
            }
            '=' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Assign, location: start });
            }
            '(' => {
                advance!();
                tokens.push(Token { kind: TokenKind::LParen, location: start });
            }
            ')' => {
                advance!();
                tokens.push(Token { kind: TokenKind::RParen, location: start });
            }
            ',' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Comma, location: start });
            }
            ';' => {
                advance!();
                tokens.push(Token { kind: TokenKind::Semicolon, location: start });
            }
            other => {
                return Err(LexError {
                    location: start,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        location: SourceLocation::new(line, col),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_literals() {
        let toks = tokenize("$x >= 3 && $y != \"no\"").unwrap();
        let kinds: Vec<_> = toks.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Variable("x".into()),
                TokenKind::GtEq,
                TokenKind::Integer(3),
                TokenKind::AndAnd,
                TokenKind::Variable("y".into()),
                TokenKind::NotEq,
                TokenKind::Str("no".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("\"abc").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn decimal_vs_integer() {
        let toks = tokenize("1 2.5 3.").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Integer(1));
        assert_eq!(toks[1].kind, TokenKind::Decimal(2.5));
        // A trailing dot with no following digit is not part of the number.
        assert_eq!(toks[2].kind, TokenKind::Integer(3));
    }

    #[test]
    fn dollar_without_identifier_char_is_not_a_variable() {
        // $ followed by a digit never starts a variable token in this grammar;
        // callers (the body tokenizer) treat a bare `$` as literal text.
        let err = tokenize("$5").unwrap_err();
        assert!(err.message.contains("unexpected character"));
    }
}
