//! The translation pass itself (spec §4.8).

use crate::select::select_variant;
use crate::tables::TranslationTables;
use dlbc_core::{Body, Command, Dialogue, Node, Reply, Segment, Translatable, TranslationContext, TranslationMap, VariableString};

/// Produce a translated clone of `dialogue`. The source is never mutated;
/// every node is deep-cloned and then has its bodies rewritten in place on
/// the clone.
#[must_use]
pub fn translate_dialogue(dialogue: &Dialogue, context: &TranslationContext, map: &TranslationMap) -> Dialogue {
    let span = tracing::debug_span!("translate_dialogue", dialogue = %dialogue.name, node_count = dialogue.nodes.len());
    let _enter = span.enter();

    let tables = TranslationTables::build(map);
    let mut translated = dialogue.clone();
    for node in &mut translated.nodes {
        node.body = translate_body_tree(&node.body, &node.header.speaker, "_user", context, &tables);
    }
    translated
}

/// Produce a translated clone of a single `node`.
#[must_use]
pub fn translate_node(node: &Node, context: &TranslationContext, map: &TranslationMap) -> Node {
    let tables = TranslationTables::build(map);
    let mut translated = node.clone();
    translated.body = translate_body_tree(&node.body, &node.header.speaker, "_user", context, &tables);
    translated
}

/// Rewrite `body`'s segments and replies, translating in place on a fresh
/// clone. Mirrors `dlbc-extract`'s segment grouping (same flush points)
/// since a translatable span's boundaries must line up exactly with what
/// C6 would have extracted, but performs the splice inline rather than
/// against C6's flattened output — see the crate README.
fn translate_body_tree(
    body: &Body,
    speaker: &str,
    addressee: &str,
    context: &TranslationContext,
    tables: &TranslationTables<'_>,
) -> Body {
    let mut out = Body::new();
    let mut group: Vec<Segment> = Vec::new();

    for segment in &body.segments {
        match segment {
            Segment::Text(_) | Segment::Command(Command::Input { .. }) => group.push(segment.clone()),
            Segment::Command(Command::If { clauses, else_branch }) => {
                flush_group(&mut group, speaker, addressee, context, tables, &mut out);
                let new_clauses = clauses
                    .iter()
                    .map(|(expr, clause_body)| {
                        (expr.clone(), translate_body_tree(clause_body, speaker, addressee, context, tables))
                    })
                    .collect();
                let new_else = else_branch
                    .as_ref()
                    .map(|else_body| translate_body_tree(else_body, speaker, addressee, context, tables));
                out.push_segment(Segment::Command(Command::If { clauses: new_clauses, else_branch: new_else }));
            }
            Segment::Command(Command::Random { clauses }) => {
                flush_group(&mut group, speaker, addressee, context, tables, &mut out);
                let new_clauses = clauses
                    .iter()
                    .map(|clause_body| translate_body_tree(clause_body, speaker, addressee, context, tables))
                    .collect();
                out.push_segment(Segment::Command(Command::Random { clauses: new_clauses }));
            }
            Segment::Command(Command::Set { .. }) | Segment::Command(Command::Action(_)) => {
                flush_group(&mut group, speaker, addressee, context, tables, &mut out);
                out.push_segment(segment.clone());
            }
        }
    }
    flush_group(&mut group, speaker, addressee, context, tables, &mut out);

    for reply in &body.replies {
        let new_statement = reply
            .statement
            .as_ref()
            .map(|statement| translate_body_tree(statement, addressee, speaker, context, tables));
        out.replies.push(Reply {
            reply_id: reply.reply_id,
            statement: new_statement,
            next: reply.next.clone(),
            actions: reply.actions.clone(),
        });
    }
    out
}

/// `true` if any segment in `group` carries user-facing content (same rule
/// as `dlbc-extract`'s `has_content`).
fn has_content(group: &[Segment]) -> bool {
    group.iter().any(|segment| match segment {
        Segment::Text(vs) => vs.has_content(),
        Segment::Command(Command::Input { .. }) => true,
        Segment::Command(_) => false,
    })
}

/// Flush the accumulated `group` into `out`: if it carries no translatable
/// content it passes through unchanged; otherwise it is looked up (exact,
/// then normalized) and, on a hit, the context-appropriate variant's
/// segments replace it, bracketed by the leading/trailing whitespace the
/// source had (spec §4.8 step 4). A lookup miss also passes the group
/// through unchanged — translation misses are silent by design (spec §7).
fn flush_group(
    group: &mut Vec<Segment>,
    speaker: &str,
    addressee: &str,
    context: &TranslationContext,
    tables: &TranslationTables<'_>,
    out: &mut Body,
) {
    if group.is_empty() {
        return;
    }
    if !has_content(group) {
        out.segments.append(group);
        return;
    }

    let taken = std::mem::take(group);
    let translatable = Translatable::new(taken);
    let canonical = translatable.canonical_string();
    let trimmed = canonical.trim();
    let pre_ws = &canonical[..canonical.len() - canonical.trim_start().len()];
    let post_ws = &canonical[canonical.trim_end().len()..];

    let Some(variants) = tables.lookup(trimmed) else {
        out.segments.extend(translatable.segments);
        return;
    };
    let Some(selected) = select_variant(variants, speaker, addressee, context) else {
        out.segments.extend(translatable.segments);
        return;
    };

    if !pre_ws.is_empty() {
        out.push_segment(Segment::Text(VariableString::from_text(pre_ws)));
    }
    out.segments.extend(selected.translation.segments.clone());
    if !post_ws.is_empty() {
        out.push_segment(Segment::Text(VariableString::from_text(post_ws)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlbc_core::{ContextTranslation, Dialogue, Header, NodePointer};
    use std::collections::BTreeSet;

    fn node_with_text(title: &str, speaker: &str, text: &str) -> Node {
        let mut body = Body::new();
        body.push_segment(Segment::Text(VariableString::from_text(text)));
        Node::new(Header::new(title, speaker), body)
    }

    fn flat_map(entries: &[(&str, &str)]) -> TranslationMap {
        let mut map = TranslationMap::new();
        for (source, translation) in entries {
            map.push(
                Translatable::new(vec![Segment::Text(VariableString::from_text(*source))]),
                ContextTranslation {
                    context: BTreeSet::new(),
                    translation: Translatable::new(vec![Segment::Text(VariableString::from_text(*translation))]),
                },
            );
        }
        map
    }

    #[test]
    fn empty_translation_map_leaves_dialogue_structurally_unchanged() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        dialogue.nodes.push(node_with_text("Start", "S", "Hello!"));
        let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &TranslationMap::new());
        assert_eq!(translated.nodes[0].body.to_string(), dialogue.nodes[0].body.to_string());
    }

    #[test]
    fn matching_source_is_spliced_in() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        dialogue.nodes.push(node_with_text("Start", "Agent", "Hello $name!"));
        let map = flat_map(&[("Hello $name!", "Hola $name!")]);
        let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &map);
        assert_eq!(translated.nodes[0].body.to_string(), "Hola $name!");
    }

    #[test]
    fn reply_statement_unchanged_when_not_in_map() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        let mut n1 = node_with_text("N1", "Agent", "Hello $name!");
        n1.body.push_reply(
            Some(Body { segments: vec![Segment::Text(VariableString::from_text("Bye"))], replies: vec![] }),
            NodePointer::Internal { origin_node_id: "N1".into(), target_node_id: "N2".into() },
            vec![],
        );
        dialogue.nodes.push(n1);
        let map = flat_map(&[("Hello $name!", "Hola $name!")]);
        let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &map);
        let reply_text = translated.nodes[0].body.replies[0].statement.as_ref().unwrap().to_string();
        assert_eq!(reply_text, "Bye");
    }

    #[test]
    fn source_dialogue_is_not_mutated() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        dialogue.nodes.push(node_with_text("Start", "Agent", "Hello!"));
        let map = flat_map(&[("Hello!", "Hola!")]);
        let before = dialogue.clone();
        let _ = translate_dialogue(&dialogue, &TranslationContext::new(), &map);
        assert_eq!(dialogue, before);
    }

    #[test]
    fn set_only_body_has_zero_translatables_and_is_unaffected() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        let mut n1 = Node::new(Header::new("N1", "S"), Body::new());
        n1.body.push_segment(Segment::Command(Command::Set { assignments: vec![] }));
        dialogue.nodes.push(n1);
        let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &TranslationMap::new());
        assert_eq!(translated.nodes[0].body.segments.len(), 1);
    }

    #[test]
    fn preserves_node_titles_and_reply_graph() {
        let mut dialogue = Dialogue::new("zone1/npc", "en");
        let mut n1 = node_with_text("N1", "Agent", "Hi");
        n1.body.push_reply(
            None,
            NodePointer::Internal { origin_node_id: "N1".into(), target_node_id: "N2".into() },
            vec![],
        );
        dialogue.nodes.push(n1);
        dialogue.nodes.push(node_with_text("N2", "Agent", "Bye"));
        let map = flat_map(&[("Hi", "Hola")]);
        let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &map);

        let titles_before: Vec<&str> = dialogue.nodes.iter().map(|n| n.title()).collect();
        let titles_after: Vec<&str> = translated.nodes.iter().map(|n| n.title()).collect();
        assert_eq!(titles_before, titles_after);

        let reply_tuples_before: Vec<(u32, String)> = dialogue.nodes[0]
            .body
            .replies
            .iter()
            .map(|r| (r.reply_id, r.next.to_source()))
            .collect();
        let reply_tuples_after: Vec<(u32, String)> = translated.nodes[0]
            .body
            .replies
            .iter()
            .map(|r| (r.reply_id, r.next.to_source()))
            .collect();
        assert_eq!(reply_tuples_before, reply_tuples_after);
    }

    proptest::proptest! {
        #[test]
        fn empty_map_is_a_structural_no_op_across_node_counts(n in 1usize..6, words in "[A-Za-z]{1,8}") {
            let mut dialogue = Dialogue::new("zone1/npc", "en");
            for i in 0..n {
                dialogue.nodes.push(node_with_text(&format!("N{i}"), "S", &words));
            }
            let translated = translate_dialogue(&dialogue, &TranslationContext::new(), &TranslationMap::new());
            prop_assert_eq!(translated, dialogue);
        }
    }
}
