// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translatable extractor (C6): walks a node [`Body`] and yields every
//! user-facing span of text as a [`SourceTranslatable`], in depth-first
//! source order.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use dlbc_core::{Body, Command, Segment, Translatable};

/// One extracted translatable span, tagged with who says it and who it is
/// said to.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTranslatable {
    /// The node's speaker (or, for a reply statement, the addressee — roles
    /// are swapped for anything spoken by the user).
    pub speaker: String,
    /// The node's addressee (or, for a reply statement, the speaker).
    pub addressee: String,
    /// The extracted span.
    pub translatable: Translatable,
}

/// Extract every translatable span from `body`, in depth-first source order.
///
/// `speaker`/`addressee` label every span directly owned by this body; a
/// reply's own statement is extracted with the roles swapped, since replies
/// are spoken by the user.
#[must_use]
pub fn extract(speaker: &str, addressee: &str, body: &Body) -> Vec<SourceTranslatable> {
    let mut out = Vec::new();
    let mut group: Vec<Segment> = Vec::new();

    for segment in &body.segments {
        match segment {
            Segment::Text(_) => group.push(segment.clone()),
            Segment::Command(Command::Input { .. }) => group.push(segment.clone()),
            Segment::Command(Command::If { clauses, else_branch }) => {
                flush(&mut group, speaker, addressee, &mut out);
                for (_, clause_body) in clauses {
                    out.extend(extract(speaker, addressee, clause_body));
                }
                if let Some(else_body) = else_branch {
                    out.extend(extract(speaker, addressee, else_body));
                }
            }
            Segment::Command(Command::Random { clauses }) => {
                flush(&mut group, speaker, addressee, &mut out);
                for clause_body in clauses {
                    out.extend(extract(speaker, addressee, clause_body));
                }
            }
            Segment::Command(Command::Set { .. }) | Segment::Command(Command::Action(_)) => {
                flush(&mut group, speaker, addressee, &mut out);
            }
        }
    }
    flush(&mut group, speaker, addressee, &mut out);

    for reply in &body.replies {
        if let Some(statement) = &reply.statement {
            out.extend(extract(addressee, speaker, statement));
        }
    }

    out
}

/// Emit `group` as a `SourceTranslatable` if it has content, then clear it.
fn flush(group: &mut Vec<Segment>, speaker: &str, addressee: &str, out: &mut Vec<SourceTranslatable>) {
    if group.is_empty() {
        return;
    }
    if has_content(group) {
        out.push(SourceTranslatable {
            speaker: speaker.to_string(),
            addressee: addressee.to_string(),
            translatable: Translatable::new(std::mem::take(group)),
        });
    } else {
        group.clear();
    }
}

/// `true` if any segment in `group` carries user-facing content: non-whitespace
/// text, a `$variable` reference, or an `<<input>>` command.
fn has_content(group: &[Segment]) -> bool {
    group.iter().any(|segment| match segment {
        Segment::Text(vs) => vs.has_content(),
        Segment::Command(Command::Input { .. }) => true,
        Segment::Command(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlbc_core::{Action, InputOption, NodePointer, VariableString};
    use dlbc_expr::parse_expression;

    fn text(s: &str) -> Segment {
        Segment::Text(VariableString::from_text(s))
    }

    #[test]
    fn plain_text_yields_one_translatable() {
        let mut body = Body::new();
        body.push_segment(text("Hello!"));
        let result = extract("Agent", "_user", &body);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].translatable.canonical_string(), "Hello!");
        assert_eq!(result[0].speaker, "Agent");
        assert_eq!(result[0].addressee, "_user");
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        let mut body = Body::new();
        body.push_segment(text("   \n"));
        assert!(extract("Agent", "_user", &body).is_empty());
    }

    #[test]
    fn set_command_flushes_and_is_ignored() {
        let mut body = Body::new();
        body.push_segment(text("Hi"));
        body.push_segment(Segment::Command(Command::Set { assignments: vec![] }));
        body.push_segment(text("there"));
        let result = extract("Agent", "_user", &body);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].translatable.canonical_string(), "Hi");
        assert_eq!(result[1].translatable.canonical_string(), "there");
    }

    #[test]
    fn set_only_body_yields_zero_translatables() {
        let mut body = Body::new();
        body.push_segment(Segment::Command(Command::Set { assignments: vec![] }));
        assert!(extract("Agent", "_user", &body).is_empty());
    }

    #[test]
    fn if_clauses_recurse_with_unchanged_roles() {
        let mut then_body = Body::new();
        then_body.push_segment(text("yes"));
        let mut body = Body::new();
        body.push_segment(Segment::Command(Command::If {
            clauses: vec![(parse_expression("$x > 0").unwrap(), then_body)],
            else_branch: None,
        }));
        let result = extract("Agent", "_user", &body);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].translatable.canonical_string(), "yes");
        assert_eq!(result[0].speaker, "Agent");
    }

    #[test]
    fn input_command_counts_as_content() {
        let mut body = Body::new();
        body.push_segment(Segment::Command(Command::Input {
            input_type: "text".into(),
            variable: "name".into(),
            options: Vec::<InputOption>::new(),
        }));
        let result = extract("Agent", "_user", &body);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn reply_statement_swaps_roles() {
        let mut body = Body::new();
        body.push_reply(
            Some(Body { segments: vec![text("Yes")], replies: vec![] }),
            NodePointer::Internal { origin_node_id: "N1".into(), target_node_id: "N2".into() },
            vec![],
        );
        let result = extract("Agent", "_user", &body);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].speaker, "_user");
        assert_eq!(result[0].addressee, "Agent");
        assert_eq!(result[0].translatable.canonical_string(), "Yes");
    }

    #[test]
    fn reply_with_no_statement_yields_nothing() {
        let mut body = Body::new();
        body.push_reply(
            None,
            NodePointer::Internal { origin_node_id: "N1".into(), target_node_id: "N2".into() },
            vec![Action { action_type: "noop".into(), arguments: vec![] }],
        );
        assert!(extract("Agent", "_user", &body).is_empty());
    }
}
