//! Context-appropriate variant selection (spec §4.8 step 3).

use dlbc_core::{ContextTranslation, Gender, TranslationContext};

fn is_gender_label(label: &str) -> bool {
    matches!(label, "male_speaker" | "female_speaker" | "male_addressee" | "female_addressee")
}

fn gender_of(context: &TranslationContext, role_label: &str) -> Gender {
    if role_label == "_user" {
        context.user_gender()
    } else {
        context.gender_for_speaker(role_label)
    }
}

/// Pick the first context translation whose context is compatible with
/// `speaker`/`addressee`, or `None` if `variants` is empty.
///
/// Filtering happens in two passes, each of which falls back to its input
/// list (rather than emptying it) if it would otherwise discard every
/// candidate (spec §4.8: "preserving the list if the filter would empty
/// it").
#[must_use]
pub fn select_variant<'a>(
    variants: &'a [ContextTranslation],
    speaker: &str,
    addressee: &str,
    context: &TranslationContext,
) -> Option<&'a ContextTranslation> {
    if variants.is_empty() {
        return None;
    }

    let speaker_filtered: Vec<&ContextTranslation> = variants
        .iter()
        .filter(|v| {
            let speaker_labels: Vec<&String> =
                v.context.iter().filter(|l| !is_gender_label(l)).collect();
            speaker_labels.is_empty() || speaker_labels.iter().any(|l| l.as_str() == speaker)
        })
        .collect();
    let speaker_pool: Vec<&ContextTranslation> =
        if speaker_filtered.is_empty() { variants.iter().collect() } else { speaker_filtered };

    let speaker_gender = gender_of(context, speaker);
    let addressee_gender = gender_of(context, addressee);
    let gender_filtered: Vec<&ContextTranslation> = speaker_pool
        .iter()
        .copied()
        .filter(|v| {
            if v.context.contains("female_speaker") && speaker_gender == Gender::Male {
                return false;
            }
            if v.context.contains("male_speaker") && speaker_gender == Gender::Female {
                return false;
            }
            if v.context.contains("female_addressee") && addressee_gender == Gender::Male {
                return false;
            }
            if v.context.contains("male_addressee") && addressee_gender == Gender::Female {
                return false;
            }
            true
        })
        .collect();

    let final_pool = if gender_filtered.is_empty() { speaker_pool } else { gender_filtered };
    final_pool.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlbc_core::{Segment, Translatable, VariableString};
    use std::collections::BTreeSet;

    fn variant(context_labels: &[&str], text: &str) -> ContextTranslation {
        ContextTranslation {
            context: context_labels.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            translation: Translatable::new(vec![Segment::Text(VariableString::from_text(text))]),
        }
    }

    #[test]
    fn empty_context_always_matches() {
        let variants = vec![variant(&[], "Oui")];
        let selected = select_variant(&variants, "Agent", "_user", &TranslationContext::new());
        assert_eq!(selected.unwrap().translation.canonical_string(), "Oui");
    }

    #[test]
    fn speaker_label_filters_by_name() {
        let variants = vec![variant(&["Other"], "Nope"), variant(&["Agent"], "Si, señor")];
        let selected = select_variant(&variants, "Agent", "_user", &TranslationContext::new());
        assert_eq!(selected.unwrap().translation.canonical_string(), "Si, señor");
    }

    #[test]
    fn user_context_label_matches_reply_statements() {
        let variants = vec![variant(&["_user"], "Sí")];
        let selected = select_variant(&variants, "_user", "Agent", &TranslationContext::new());
        assert_eq!(selected.unwrap().translation.canonical_string(), "Sí");
    }

    #[test]
    fn gender_filter_selects_female_variant() {
        let variants = vec![variant(&["male_speaker"], "Ciao"), variant(&["female_speaker"], "Ciaa")];
        let mut ctx = TranslationContext::new();
        ctx.agent_genders.insert("Agent".to_string(), Gender::Female);
        let selected = select_variant(&variants, "Agent", "_user", &ctx);
        assert_eq!(selected.unwrap().translation.canonical_string(), "Ciaa");
    }

    #[test]
    fn gender_defaults_to_male_when_unset() {
        let variants = vec![variant(&["male_speaker"], "Ciao"), variant(&["female_speaker"], "Ciaa")];
        let selected = select_variant(&variants, "Agent", "_user", &TranslationContext::new());
        assert_eq!(selected.unwrap().translation.canonical_string(), "Ciao");
    }

    #[test]
    fn filter_falls_back_to_full_list_when_it_would_empty() {
        // No variant matches "Agent" by name, but filtering shouldn't discard
        // everything -- the first (only) candidate still wins.
        let variants = vec![variant(&["SomeoneElse"], "Hmm")];
        let selected = select_variant(&variants, "Agent", "_user", &TranslationContext::new());
        assert_eq!(selected.unwrap().translation.canonical_string(), "Hmm");
    }

    #[test]
    fn empty_variant_list_yields_none() {
        assert!(select_variant(&[], "Agent", "_user", &TranslationContext::new()).is_none());
    }
}
