//! Node bodies: ordered segments plus an ordered list of replies.

use crate::command::{Action, Command};
use crate::pointer::NodePointer;
use crate::variable_string::VariableString;
use std::fmt;

/// One piece of a [`Body`]: either plain (variable-interpolated) text or a
/// command.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A run of text, possibly containing `$variable` references.
    Text(VariableString),
    /// A command (`if`, `random`, `set`, `input`, or a generic action).
    Command(Command),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(vs) => write!(f, "{vs}"),
            Self::Command(cmd) => write!(f, "{cmd}"),
        }
    }
}

/// A user-selectable outgoing edge from a node.
///
/// A reply with no `statement` is an "auto-forward": taken immediately,
/// with nothing shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// 1-based index, auto-assigned in source order, unique per node.
    pub reply_id: u32,
    /// What the user says when picking this reply, if anything.
    pub statement: Option<Body>,
    /// Where this reply leads.
    pub next: NodePointer,
    /// Actions attached to this reply (fired when the reply is taken).
    pub actions: Vec<Action>,
}

/// An ordered sequence of [`Segment`]s plus the node's outgoing [`Reply`]
/// list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    /// The segments, in source order.
    pub segments: Vec<Segment>,
    /// The replies, in source order; `reply_id` is assigned 1..N.
    pub replies: Vec<Reply>,
}

impl Body {
    /// An empty body (no segments, no replies). Legal per spec §4.3.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment, flushing nothing — callers are responsible for
    /// merging adjacent text runs if desired (the body parser does this via
    /// [`VariableString::push_text`] before flushing).
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Append a reply, auto-assigning the next `reply_id`.
    pub fn push_reply(&mut self, statement: Option<Body>, next: NodePointer, actions: Vec<Action>) {
        let reply_id = self.replies.len() as u32 + 1;
        self.replies.push(Reply { reply_id, statement, next, actions });
    }

    /// `true` if this body has neither segments nor replies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.replies.is_empty()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(f, "{seg}")?;
        }
        for reply in &self.replies {
            write!(f, "[[")?;
            if let Some(stmt) = &reply.statement {
                write!(f, "{stmt}|")?;
            }
            write!(f, "{}", reply.next)?;
            for action in &reply.actions {
                write!(f, "|{action}")?;
            }
            write!(f, "]]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty() {
        assert!(Body::new().is_empty());
    }

    #[test]
    fn push_reply_assigns_sequential_ids() {
        let mut body = Body::new();
        body.push_reply(None, NodePointer::Internal { origin_node_id: "Start".into(), target_node_id: "N2".into() }, vec![]);
        body.push_reply(None, NodePointer::Internal { origin_node_id: "Start".into(), target_node_id: "N3".into() }, vec![]);
        assert_eq!(body.replies[0].reply_id, 1);
        assert_eq!(body.replies[1].reply_id, 2);
    }

    #[test]
    fn display_renders_text_and_reply() {
        let mut body = Body::new();
        body.push_segment(Segment::Text(VariableString::from_text("Hello!")));
        body.push_reply(
            Some(Body {
                segments: vec![Segment::Text(VariableString::from_text("Bye"))],
                replies: vec![],
            }),
            NodePointer::Internal { origin_node_id: "N1".into(), target_node_id: "N2".into() },
            vec![],
        );
        assert_eq!(body.to_string(), "Hello![[Bye|N2]]");
    }
}
