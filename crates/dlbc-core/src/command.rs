//! Commands: `if`, `random`, `set`, `input`, and generic actions.

use crate::body::Body;
use dlbc_expr::{Assignment, Expression};
use std::fmt;

/// A single `key="value"`-style option attached to an `<<input>>` command.
pub type InputOption = (String, String);

/// A generic, opaque action invocation, e.g. `<<play_sound "ding">>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// The action's type/name (first token after `action`, or the bare
    /// command name for an unrecognized-but-whitelisted command).
    pub action_type: String,
    /// Raw, unparsed argument tokens.
    pub arguments: Vec<String>,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<action {}", self.action_type)?;
        for a in &self.arguments {
            write!(f, " {a}")?;
        }
        write!(f, ">>")
    }
}

/// A node body command: one of `if`, `random`, `set`, `input`, or a generic
/// action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `<<if cond>> ... <<elseif cond>> ... <<else>> ... <<endif>>`.
    If {
        /// `(condition, body)` pairs in source order; the `if` clause is
        /// first, followed by zero or more `elseif` clauses.
        clauses: Vec<(Expression, Body)>,
        /// The `<<else>> ... <<endif>>` body, if present.
        else_branch: Option<Body>,
    },
    /// `<<random>> ... <<or>> ... <<endrandom>>`.
    Random {
        /// The bodies of each `<<or>>`-separated clause, in source order.
        clauses: Vec<Body>,
    },
    /// `<<set $a = 1; $b += 2>>`.
    Set {
        /// The assignments, in source order.
        assignments: Vec<Assignment>,
    },
    /// `<<input type="..." variable="$x" ...>>`. Treated as an opaque
    /// translatable unit by the extractor (C6).
    Input {
        /// The declared input type (e.g. `"text"`, `"numeric"`).
        input_type: String,
        /// The variable the input result is stored into.
        variable: String,
        /// Any further `key="value"` options, in source order.
        options: Vec<InputOption>,
    },
    /// Any other command name, treated as a generic action.
    Action(Action),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::If { clauses, else_branch } => {
                for (i, (cond, body)) in clauses.iter().enumerate() {
                    if i == 0 {
                        write!(f, "<<if {cond}>>{body}")?;
                    } else {
                        write!(f, "<<elseif {cond}>>{body}")?;
                    }
                }
                if let Some(else_body) = else_branch {
                    write!(f, "<<else>>{else_body}")?;
                }
                write!(f, "<<endif>>")
            }
            Self::Random { clauses } => {
                write!(f, "<<random>>")?;
                for (i, body) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, "<<or>>")?;
                    }
                    write!(f, "{body}")?;
                }
                write!(f, "<<endrandom>>")
            }
            Self::Set { assignments } => {
                write!(f, "<<set ")?;
                for (i, a) in assignments.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ">>")
            }
            Self::Input { input_type, variable, options } => {
                write!(f, "<<input type=\"{input_type}\" variable=\"${variable}\"")?;
                for (k, v) in options {
                    write!(f, " {k}=\"{v}\"")?;
                }
                write!(f, ">>")
            }
            Self::Action(action) => write!(f, "{action}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlbc_expr::{parse_assignments, parse_expression};

    #[test]
    fn set_command_renders_assignments() {
        let cmd = Command::Set {
            assignments: parse_assignments("$x = 1; $y += 2").unwrap(),
        };
        assert_eq!(cmd.to_string(), "<<set $x = 1; $y += 2>>");
    }

    #[test]
    fn if_command_without_else() {
        let cmd = Command::If {
            clauses: vec![(parse_expression("$x > 0").unwrap(), Body::new())],
            else_branch: None,
        };
        assert_eq!(cmd.to_string(), "<<if $x > 0>><<endif>>");
    }

    #[test]
    fn action_renders_with_arguments() {
        let action = Action { action_type: "play_sound".into(), arguments: vec!["\"ding\"".into()] };
        assert_eq!(action.to_string(), "<<action play_sound \"ding\">>");
    }
}
