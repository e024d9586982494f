//! Recursive-descent parser over the expression token stream.
//!
//! Precedence, lowest to highest: `||`, `&&`, `==`/`!=`, comparisons,
//! `+`/`-`, `*`/`/`/`%`, unary `!`/`-`, primary.

use crate::ast::{AssignOp, Assignment, BinaryOp, Expression, Literal, UnaryOp};
use crate::lexer::{self, Token, TokenKind};
use dlbc_error::SourceLocation;
use thiserror::Error;

/// Failure to parse an expression or assignment list.
///
/// Never thrown as fatal: callers (the body parser) collect this alongside
/// other recoverable `ParseError`s.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {message} (near '{offending_token}')")]
pub struct ExpressionParseError {
    /// Where the problem occurred.
    pub location: SourceLocation,
    /// Human-readable description.
    pub message: String,
    /// Text of the token that triggered the error.
    pub offending_token: String,
}

impl From<lexer::LexError> for ExpressionParseError {
    fn from(e: lexer::LexError) -> Self {
        Self {
            location: e.location,
            message: e.message,
            offending_token: String::new(),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error(&self, message: impl Into<String>) -> ExpressionParseError {
        ExpressionParseError {
            location: self.peek().location,
            message: message.into(),
            offending_token: self.peek().kind.to_string(),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ExpressionParseError> {
        if &self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected '{kind}'")))
        }
    }

    fn parse_expression(&mut self) -> Result<Expression, ExpressionParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek().kind == TokenKind::OrOr {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expression::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_equality()?;
        while self.peek().kind == TokenKind::AndAnd {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expression::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ExpressionParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ExpressionParseError> {
        match self.peek().kind {
            TokenKind::Bang => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expression::Unary { op: UnaryOp::Not, expr: Box::new(expr) })
            }
            TokenKind::Minus => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expression::Unary { op: UnaryOp::Neg, expr: Box::new(expr) })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ExpressionParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Integer(i) => {
                self.advance();
                Ok(Expression::Literal(Literal::Integer(i)))
            }
            TokenKind::Decimal(d) => {
                self.advance();
                Ok(Expression::Literal(Literal::Decimal(d)))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::Str(s)))
            }
            TokenKind::Variable(name) => {
                self.advance();
                Ok(Expression::Variable(name))
            }
            TokenKind::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => Ok(Expression::Literal(Literal::Bool(true))),
                    "false" => Ok(Expression::Literal(Literal::Bool(false))),
                    "null" => Ok(Expression::Literal(Literal::Null)),
                    _ if self.peek().kind == TokenKind::LParen => {
                        self.advance();
                        let mut args = Vec::new();
                        if self.peek().kind != TokenKind::RParen {
                            loop {
                                args.push(self.parse_expression()?);
                                if self.peek().kind == TokenKind::Comma {
                                    self.advance();
                                } else {
                                    break;
                                }
                            }
                        }
                        self.expect(&TokenKind::RParen)?;
                        Ok(Expression::Call { name, args })
                    }
                    _ => Ok(Expression::Variable(name)),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expression::Grouped(Box::new(inner)))
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ExpressionParseError> {
        let variable = match self.peek().kind.clone() {
            TokenKind::Variable(name) => {
                self.advance();
                name
            }
            _ => return Err(self.error("expected a '$variable' on the left of an assignment")),
        };
        let op = match self.peek().kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::AddAssign,
            TokenKind::MinusAssign => AssignOp::SubAssign,
            TokenKind::StarAssign => AssignOp::MulAssign,
            TokenKind::SlashAssign => AssignOp::DivAssign,
            _ => return Err(self.error("expected an assignment operator")),
        };
        self.advance();
        let value = self.parse_expression()?;
        Ok(Assignment { variable, op, value })
    }
}

/// Parse a single expression from source text (used by `if`/`elseif`).
pub fn parse_expression(src: &str) -> Result<Expression, ExpressionParseError> {
    let tokens = lexer::tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    if parser.peek().kind != TokenKind::Eof {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

/// Parse one or more `;`-separated `$name <op> expr` assignments (used by `set`).
pub fn parse_assignments(src: &str) -> Result<Vec<Assignment>, ExpressionParseError> {
    let tokens = lexer::tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut assignments = vec![parser.parse_assignment()?];
    while parser.peek().kind == TokenKind::Semicolon {
        parser.advance();
        if parser.peek().kind == TokenKind::Eof {
            break;
        }
        assignments.push(parser.parse_assignment()?);
    }
    if parser.peek().kind != TokenKind::Eof {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Literal};

    #[test]
    fn precedence_is_respected() {
        // `1 + 2 * 3` should parse as `1 + (2 * 3)`.
        let expr = parse_expression("1 + 2 * 3").unwrap();
        match expr {
            Expression::Binary { op: BinaryOp::Add, rhs, .. } => match *rhs {
                Expression::Binary { op: BinaryOp::Mul, .. } => {}
                other => panic!("unexpected rhs: {other:?}"),
            },
            other => panic!("unexpected top-level: {other:?}"),
        }
    }

    #[test]
    fn comparison_and_logical_operators() {
        let expr = parse_expression("$hp > 0 && $alive == true").unwrap();
        assert!(matches!(expr, Expression::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn grouping_preserved_for_round_trip() {
        let expr = parse_expression("(1 + 2) * 3").unwrap();
        assert_eq!(expr.to_string(), "(1 + 2) * 3");
    }

    #[test]
    fn function_call_with_args() {
        let expr = parse_expression("random(1, 6)").unwrap();
        match expr {
            Expression::Call { name, args } => {
                assert_eq!(name, "random");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn string_literal_escapes() {
        let expr = parse_expression("\"a\\nb\"").unwrap();
        assert_eq!(expr, Expression::Literal(Literal::Str("a\nb".to_string())));
    }

    #[test]
    fn multiple_assignments_separated_by_semicolon() {
        let assignments = parse_assignments("$x = 1; $y += 2").unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].variable, "x");
        assert_eq!(assignments[1].variable, "y");
        assert_eq!(assignments[1].op, AssignOp::AddAssign);
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(parse_expression("1 +").is_err());
        assert!(parse_expression("1 2").is_err());
    }

    #[test]
    fn assignment_requires_variable_on_lhs() {
        assert!(parse_assignments("1 = 2").is_err());
    }

    #[test]
    fn unary_operators() {
        let expr = parse_expression("!$flag").unwrap();
        assert!(matches!(expr, Expression::Unary { op: UnaryOp::Not, .. }));
        let expr = parse_expression("-5").unwrap();
        assert!(matches!(expr, Expression::Unary { op: UnaryOp::Neg, .. }));
    }
}
