//! Token-stream consumer that builds a [`dlbc_core::Body`].
//!
//! Recognized command keywords: `if`, `elseif`, `else`, `endif`, `random`,
//! `or`, `endrandom`, `set`, `input`, `action`. `elseif`/`else`/`endif`/
//! `or`/`endrandom` are only meaningful as terminators inside an `if`/
//! `random` clause body; encountering one anywhere else is an error, the
//! same as encountering a name outside this set entirely (spec §4.3: a
//! whitelist, when configured, narrows the recognized set further — used
//! by the translation parser to admit only `input`).

use dlbc_core::{
    resolve_absolute_dialogue_path, Action, Body, Command, NodePointer, PathError, Segment,
    StringPart, VariableString,
};
use dlbc_error::{ErrorCode, ParseError, SourceLocation};
use dlbc_expr::{parse_assignments, parse_expression};
use dlbc_lexer::{tokenize, Token, TokenKind};

/// Parameters that scope a single [`parse_body`] call.
pub struct ParseContext<'a> {
    /// Logical path of the file being parsed, used for error reporting and
    /// as the origin dialogue for any external node pointers found.
    pub file: &'a str,
    /// Title of the node whose body is being parsed (origin of any
    /// pointers found in replies).
    pub origin_node_id: &'a str,
    /// When `Some`, only command names in this list are recognized; any
    /// other name is a [`ErrorCode::BodyUnknownCommand`] error. Replies are
    /// never permitted when a whitelist is configured (translation bodies
    /// carry no node graph). `None` means the default node-body keyword set.
    pub whitelist: Option<&'a [&'static str]>,
}

const DEFAULT_KEYWORDS: &[&str] = &[
    "if", "elseif", "else", "endif", "random", "or", "endrandom", "set", "input", "action",
];

/// Parse raw `.dlb` body text (or a translation entry's body text) into a
/// [`Body`].
pub fn parse_body(ctx: &ParseContext<'_>, src: &str) -> Result<Body, ParseError> {
    let tokens = tokenize(src).map_err(|e| {
        ParseError::new(
            ctx.file,
            e.location,
            ErrorCode::LexerUnterminatedCommand,
            e.message,
        )
    })?;
    let mut parser = Parser { tokens, pos: 0, ctx, in_reply: false };
    let (body, _) = parser.parse_segments(Stop::Eof)?;
    Ok(body)
}

/// What ends the current call to [`Parser::parse_segments`].
#[derive(Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Top-level body: ends only at end of input.
    Eof,
    /// Inside an `if`/`elseif` clause body: ends at `elseif`, `else`, or `endif`.
    IfClause,
    /// Inside an `else` clause body: ends at `endif`.
    ElseClause,
    /// Inside a `random`/`or` clause body: ends at `or` or `endrandom`.
    RandomClause,
    /// Inside a reply field: ends at `|` or `]]`.
    ReplyField,
}

impl Stop {
    fn matches_word(self, word: &str) -> bool {
        match self {
            Stop::Eof => false,
            Stop::IfClause => matches!(word, "elseif" | "else" | "endif"),
            Stop::ElseClause => word == "endif",
            Stop::RandomClause => matches!(word, "or" | "endrandom"),
            Stop::ReplyField => false,
        }
    }
}

/// Which token ended a [`Parser::parse_segments`] call.
enum Boundary {
    /// End of input (only valid for [`Stop::Eof`]).
    Eof,
    /// A structural keyword was reached but not consumed; callers read it
    /// via [`Parser::expect_command_word`] next.
    Word(String),
    /// `|` was reached but not consumed (only for [`Stop::ReplyField`]).
    ReplySeparator,
    /// `]]` was reached but not consumed (only for [`Stop::ReplyField`]).
    ReplyEnd,
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: &'a ParseContext<'a>,
    /// `true` anywhere inside a reply's own statement or action fields,
    /// including inside nested `if`/`random` clause bodies there — tracked
    /// on the parser rather than threaded through `Stop` so that depth
    /// survives recursion into clause bodies.
    in_reply: bool,
}

impl<'a> Parser<'a> {
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

    fn err(&self, location: SourceLocation, code: ErrorCode, message: impl Into<String>) -> ParseError {
        ParseError::new(self.ctx.file, location, code, message)
    }

    fn command_allowed(&self, name: &str) -> bool {
        match self.ctx.whitelist {
            Some(list) => list.contains(&name),
            None => DEFAULT_KEYWORDS.contains(&name),
        }
    }

    fn replies_allowed(&self) -> bool {
        self.ctx.whitelist.is_none()
    }

    /// Parse segments (text, variables, commands) until `stop` is
    /// satisfied, returning the accumulated body and what ended it.
    fn parse_segments(&mut self, stop: Stop) -> Result<(Body, Boundary), ParseError> {
        let mut body = Body::new();
        let mut text = VariableString::new();

        loop {
            let tok = self.peek().clone();
            match &tok.kind {
                TokenKind::Eof => {
                    flush_text(&mut body, &mut text);
                    if stop == Stop::Eof {
                        return Ok((body, Boundary::Eof));
                    }
                    return Err(self.err(
                        tok.location,
                        ErrorCode::LexerUnterminatedCommand,
                        "unexpected end of input, expected a closing command",
                    ));
                }
                TokenKind::Text(t) => {
                    text.push_text(t);
                    self.advance();
                }
                TokenKind::Newline => {
                    text.push_text("\n");
                    self.advance();
                }
                TokenKind::Variable(name) => {
                    text.push_variable(name.clone());
                    self.advance();
                }
                TokenKind::ReplyStart => {
                    if self.in_reply {
                        return Err(self.err(
                            tok.location,
                            ErrorCode::BodyNestedReply,
                            "a reply may not itself contain a nested '[['",
                        ));
                    }
                    if !self.replies_allowed() {
                        return Err(self.err(
                            tok.location,
                            ErrorCode::BodyNestedReply,
                            "replies are not permitted here",
                        ));
                    }
                    flush_text(&mut body, &mut text);
                    self.advance();
                    self.parse_reply(&mut body)?;
                }
                TokenKind::ReplySeparator if stop == Stop::ReplyField => {
                    flush_text(&mut body, &mut text);
                    return Ok((body, Boundary::ReplySeparator));
                }
                TokenKind::ReplyEnd if stop == Stop::ReplyField => {
                    flush_text(&mut body, &mut text);
                    return Ok((body, Boundary::ReplyEnd));
                }
                TokenKind::ReplySeparator | TokenKind::ReplyEnd => {
                    // Outside of an open reply field, these are not
                    // structural: a bare `|` or `]]` with no matching
                    // `[[` is just an unescaped character sequence.
                    text.push_text(&tok.kind.to_string());
                    self.advance();
                }
                TokenKind::CommandStart => {
                    let cmd_start = tok.location;
                    self.advance();
                    let name = self.expect_word("expected a command name after '<<'")?;
                    if stop.matches_word(&name) {
                        flush_text(&mut body, &mut text);
                        return Ok((body, Boundary::Word(name)));
                    }
                    if !self.command_allowed(&name) {
                        return Err(self.err(
                            cmd_start,
                            ErrorCode::BodyUnknownCommand,
                            format!("unrecognized command '<<{name}>>'"),
                        ));
                    }
                    flush_text(&mut body, &mut text);
                    let segment = self.parse_known_command(&name, cmd_start)?;
                    body.push_segment(segment);
                }
                TokenKind::Word(_) | TokenKind::QuotedString(_) => {
                    // Only reachable if the lexer somehow yields a command
                    // token outside of command mode, which it never does;
                    // treat defensively as literal text.
                    text.push_text(&tok.kind.to_string());
                    self.advance();
                }
                TokenKind::CommandEnd => {
                    return Err(self.err(
                        tok.location,
                        ErrorCode::BodyUnknownCommand,
                        "unexpected '>>' with no matching '<<'",
                    ));
                }
            }
        }
    }

    /// Expect the next token to be a [`TokenKind::Word`] and return its text.
    fn expect_word(&mut self, message: &str) -> Result<String, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Word(w) => {
                self.advance();
                Ok(w)
            }
            _ => Err(self.err(tok.location, ErrorCode::BodyUnknownCommand, message)),
        }
    }

    fn expect_command_end(&mut self) -> Result<(), ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::CommandEnd => {
                self.advance();
                Ok(())
            }
            _ => Err(self.err(
                tok.location,
                ErrorCode::BodyInvalidExpression,
                format!("expected '>>', found '{}'", tok.kind),
            )),
        }
    }

    /// Consume `Word`/`QuotedString` tokens up to (not including) `>>`,
    /// rebuilding a source string that the expression grammar (C1) can
    /// re-tokenize. Whitespace between tokens in the original source is
    /// not preserved, but neither lexer is whitespace-sensitive beyond
    /// using it as a separator, so this is lossless for parsing purposes.
    fn collect_command_args_source(&mut self) -> (String, SourceLocation) {
        let start = self.peek().location;
        let mut parts = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::CommandEnd | TokenKind::Eof => break,
                TokenKind::Word(w) => {
                    parts.push(w.clone());
                    self.advance();
                }
                TokenKind::QuotedString(s) => {
                    parts.push(quote_for_expr(s));
                    self.advance();
                }
                _ => break,
            }
        }
        (parts.join(" "), start)
    }

    /// Consume raw `Word`/`QuotedString` tokens up to `>>`, without
    /// re-quoting — used by `<<input ...>>` and `<<action ...>>` parsing,
    /// which interpret their own tokens directly.
    fn collect_command_arg_tokens(&mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::CommandEnd | TokenKind::Eof => break,
                TokenKind::Word(_) | TokenKind::QuotedString(_) => {
                    out.push(self.advance());
                }
                _ => break,
            }
        }
        out
    }

    fn parse_known_command(&mut self, name: &str, start: SourceLocation) -> Result<Segment, ParseError> {
        match name {
            "if" => self.parse_if(),
            "random" => self.parse_random(),
            "set" => self.parse_set(start),
            "input" => self.parse_input(start),
            "action" => self.parse_action(start),
            other => Err(self.err(
                start,
                ErrorCode::BodyUnknownCommand,
                format!("'{other}' may only appear as a clause terminator"),
            )),
        }
    }

    fn parse_if(&mut self) -> Result<Segment, ParseError> {
        let mut clauses = Vec::new();
        let mut else_branch = None;
        loop {
            let (src, loc) = self.collect_command_args_source();
            let expr = parse_expression(&src).map_err(|e| {
                self.err(loc, ErrorCode::BodyInvalidExpression, e.to_string())
            })?;
            self.expect_command_end()?;
            let (clause_body, boundary) = self.parse_segments(Stop::IfClause)?;
            clauses.push((expr, clause_body));
            match boundary {
                Boundary::Word(word) if word == "elseif" => {
                    self.expect_command_end_after_bare_keyword()?;
                    continue;
                }
                Boundary::Word(word) if word == "else" => {
                    self.expect_command_end_after_bare_keyword()?;
                    let (else_body, boundary2) = self.parse_segments(Stop::ElseClause)?;
                    else_branch = Some(else_body);
                    match boundary2 {
                        Boundary::Word(w) if w == "endif" => {
                            self.expect_command_end_after_bare_keyword()?;
                            break;
                        }
                        _ => unreachable!("ElseClause only terminates on 'endif'"),
                    }
                }
                Boundary::Word(word) if word == "endif" => {
                    self.expect_command_end_after_bare_keyword()?;
                    break;
                }
                _ => unreachable!("IfClause only terminates on elseif/else/endif"),
            }
        }
        Ok(Segment::Command(Command::If { clauses, else_branch }))
    }

    fn parse_random(&mut self) -> Result<Segment, ParseError> {
        self.expect_command_end()?;
        let mut clauses = Vec::new();
        loop {
            let (clause_body, boundary) = self.parse_segments(Stop::RandomClause)?;
            clauses.push(clause_body);
            match boundary {
                Boundary::Word(word) if word == "or" => {
                    self.expect_command_end_after_bare_keyword()?;
                    continue;
                }
                Boundary::Word(word) if word == "endrandom" => {
                    self.expect_command_end_after_bare_keyword()?;
                    break;
                }
                _ => unreachable!("RandomClause only terminates on or/endrandom"),
            }
        }
        if clauses.len() < 2 {
            return Err(self.err(
                self.peek().location,
                ErrorCode::BodyMissingClause,
                "a '<<random>>' command needs at least two '<<or>>'-separated clauses",
            ));
        }
        Ok(Segment::Command(Command::Random { clauses }))
    }

    /// After reading a bare terminator keyword (`elseif` takes a condition
    /// and is handled separately; `else`/`endif`/`or`/`endrandom` take no
    /// arguments), expect the immediate `>>`.
    fn expect_command_end_after_bare_keyword(&mut self) -> Result<(), ParseError> {
        self.expect_command_end()
    }

    fn parse_set(&mut self, start: SourceLocation) -> Result<Segment, ParseError> {
        let (src, _) = self.collect_command_args_source();
        self.expect_command_end()?;
        let assignments = parse_assignments(&src)
            .map_err(|e| self.err(start, ErrorCode::BodyInvalidExpression, e.to_string()))?;
        Ok(Segment::Command(Command::Set { assignments }))
    }

    fn parse_input(&mut self, start: SourceLocation) -> Result<Segment, ParseError> {
        let tokens = self.collect_command_arg_tokens();
        self.expect_command_end()?;
        let mut input_type = None;
        let mut variable = None;
        let mut options = Vec::new();
        let mut i = 0usize;
        while i < tokens.len() {
            let key = match &tokens[i].kind {
                TokenKind::Word(w) if w.ends_with('=') => w[..w.len() - 1].to_string(),
                _ => {
                    return Err(self.err(
                        tokens[i].location,
                        ErrorCode::BodyInvalidInputOptions,
                        "expected a 'key=value' option in '<<input>>'",
                    ));
                }
            };
            i += 1;
            if i >= tokens.len() {
                return Err(self.err(
                    start,
                    ErrorCode::BodyInvalidInputOptions,
                    format!("option '{key}' is missing its value"),
                ));
            }
            let value = match &tokens[i].kind {
                TokenKind::QuotedString(s) => s.clone(),
                TokenKind::Word(w) => w.clone(),
                _ => unreachable!("collect_command_arg_tokens only yields Word/QuotedString"),
            };
            i += 1;
            match key.as_str() {
                "type" => input_type = Some(value),
                "variable" => variable = Some(value.trim_start_matches('$').to_string()),
                _ => options.push((key, value)),
            }
        }
        let input_type = input_type.ok_or_else(|| {
            self.err(
                start,
                ErrorCode::BodyInvalidInputOptions,
                "'<<input>>' is missing its required 'type' option",
            )
        })?;
        let variable = variable.ok_or_else(|| {
            self.err(
                start,
                ErrorCode::BodyInvalidInputOptions,
                "'<<input>>' is missing its required 'variable' option",
            )
        })?;
        Ok(Segment::Command(Command::Input { input_type, variable, options }))
    }

    fn parse_action(&mut self, start: SourceLocation) -> Result<Segment, ParseError> {
        let action = self.parse_action_inner(start)?;
        Ok(Segment::Command(Command::Action(action)))
    }

    fn parse_action_inner(&mut self, start: SourceLocation) -> Result<Action, ParseError> {
        let tokens = self.collect_command_arg_tokens();
        self.expect_command_end()?;
        let mut iter = tokens.into_iter();
        let action_type = match iter.next() {
            Some(Token { kind: TokenKind::Word(w), .. }) => w,
            Some(Token { kind: TokenKind::QuotedString(_), location, .. }) => {
                return Err(self.err(
                    location,
                    ErrorCode::BodyInvalidExpression,
                    "an '<<action>>' command's type may not be a quoted string",
                ));
            }
            None => {
                return Err(self.err(
                    start,
                    ErrorCode::BodyInvalidExpression,
                    "'<<action>>' is missing its action type",
                ));
            }
        };
        let arguments = iter
            .map(|t| match t.kind {
                TokenKind::Word(w) => w,
                TokenKind::QuotedString(s) => quote_for_expr(&s),
                _ => unreachable!(),
            })
            .collect();
        Ok(Action { action_type, arguments })
    }

    fn parse_reply(&mut self, body: &mut Body) -> Result<(), ParseError> {
        let was_in_reply = self.in_reply;
        self.in_reply = true;
        let result = self.parse_reply_inner(body);
        self.in_reply = was_in_reply;
        result
    }

    fn parse_reply_inner(&mut self, body: &mut Body) -> Result<(), ParseError> {
        let (field1, boundary1) = self.parse_segments(Stop::ReplyField)?;
        match boundary1 {
            Boundary::ReplyEnd => {
                self.advance(); // consume ']]'
                let pointer_src = plain_text_of(&field1).map_err(|loc| {
                    self.err(
                        loc,
                        ErrorCode::BodyInvalidPointer,
                        "a reply's node pointer may not contain commands",
                    )
                })?;
                let next = self.build_pointer(&pointer_src)?;
                body.push_reply(None, next, Vec::new());
                Ok(())
            }
            Boundary::ReplySeparator => {
                self.advance(); // consume '|'
                let (field2, boundary2) = self.parse_segments(Stop::ReplyField)?;
                let pointer_src = plain_text_of(&field2).map_err(|loc| {
                    self.err(
                        loc,
                        ErrorCode::BodyInvalidPointer,
                        "a reply's node pointer may not contain commands",
                    )
                })?;
                let next = self.build_pointer(&pointer_src)?;
                let mut actions = Vec::new();
                match boundary2 {
                    Boundary::ReplyEnd => {
                        self.advance();
                    }
                    Boundary::ReplySeparator => loop {
                        self.advance(); // consume '|'
                        let action_start = self.peek().location;
                        self.expect_command_start_for_action()?;
                        let action = self.parse_action_inner(action_start)?;
                        actions.push(action);
                        match &self.peek().kind {
                            TokenKind::ReplyEnd => {
                                self.advance();
                                break;
                            }
                            TokenKind::ReplySeparator => continue,
                            _ => {
                                let tok = self.peek().clone();
                                return Err(self.err(
                                    tok.location,
                                    ErrorCode::BodyInvalidPointer,
                                    "expected '|' or ']]' after a reply action",
                                ));
                            }
                        }
                    },
                    _ => unreachable!("ReplyField only terminates on '|' or ']]'"),
                }
                body.push_reply(Some(field1), next, actions);
                Ok(())
            }
            _ => unreachable!("ReplyField only terminates on '|' or ']]'"),
        }
    }

    fn expect_command_start_for_action(&mut self) -> Result<(), ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::CommandStart => {
                self.advance();
                let name = self.expect_word("expected 'action' after '<<' in a reply action")?;
                if name != "action" {
                    return Err(self.err(
                        tok.location,
                        ErrorCode::BodyUnknownCommand,
                        format!("expected '<<action ...>>' in a reply, found '<<{name}>>'"),
                    ));
                }
                Ok(())
            }
            _ => Err(self.err(
                tok.location,
                ErrorCode::BodyInvalidPointer,
                "expected an '<<action ...>>' command after the reply's node pointer",
            )),
        }
    }

    fn build_pointer(&self, raw: &str) -> Result<NodePointer, ParseError> {
        let loc = self.peek().location;
        match raw.rfind('.') {
            Some(idx) => {
                let dialogue_ref = &raw[..idx];
                let target_node_id = &raw[idx + 1..];
                let absolute = resolve_absolute_dialogue_path(self.ctx.file, dialogue_ref)
                    .map_err(|e| path_error_to_parse_error(self, loc, e))?;
                Ok(NodePointer::External {
                    origin_dialogue: self.ctx.file.to_string(),
                    origin_node_id: self.ctx.origin_node_id.to_string(),
                    target_dialogue_ref: dialogue_ref.to_string(),
                    absolute_target_dialogue: absolute,
                    target_node_id: target_node_id.to_string(),
                })
            }
            None => {
                if raw.is_empty() {
                    return Err(self.err(
                        loc,
                        ErrorCode::BodyInvalidPointer,
                        "a reply's node pointer may not be empty",
                    ));
                }
                Ok(NodePointer::Internal {
                    origin_node_id: self.ctx.origin_node_id.to_string(),
                    target_node_id: raw.to_string(),
                })
            }
        }
    }
}

fn path_error_to_parse_error(parser: &Parser<'_>, loc: SourceLocation, e: PathError) -> ParseError {
    let code = match e {
        PathError::EscapesRoot => ErrorCode::ProjectPathEscapesRoot,
        PathError::EmptyDialogueName => ErrorCode::ProjectEmptyDialogueName,
    };
    parser.err(loc, code, e.to_string())
}

fn flush_text(body: &mut Body, text: &mut VariableString) {
    if !text.is_empty() {
        body.push_segment(Segment::Text(std::mem::take(text)));
    }
}

/// Render a body that is expected to contain only plain text (no
/// commands, no replies) back into a flat string, for pointer fields.
/// Returns the location of the first offending segment on failure.
fn plain_text_of(body: &Body) -> Result<String, SourceLocation> {
    if !body.replies.is_empty() {
        return Err(SourceLocation::start());
    }
    let mut out = String::new();
    for seg in &body.segments {
        match seg {
            Segment::Text(vs) => {
                for part in &vs.parts {
                    match part {
                        StringPart::Text(t) => out.push_str(t),
                        StringPart::Variable(_) => return Err(SourceLocation::start()),
                    }
                }
            }
            Segment::Command(_) => return Err(SourceLocation::start()),
        }
    }
    Ok(out)
}

/// Re-quote a string value so the expression grammar (C1) can re-tokenize
/// it as an equivalent string literal.
fn quote_for_expr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
