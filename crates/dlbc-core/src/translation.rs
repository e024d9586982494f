//! Translatable spans, translation maps, and translation context.

use crate::body::Segment;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// A speaker or addressee's grammatical gender, used to select between
/// `male_speaker`/`female_speaker`/`male_addressee`/`female_addressee`
/// context-tagged translation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// Per-speaker gender assignments used to select context-appropriate
/// translation variants.
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    /// Gender of the player/user, for `_user`-context translations.
    pub user_gender: Option<Gender>,
    /// Default gender assumed for agents without an explicit entry in
    /// `agent_genders`.
    pub default_agent_gender: Option<Gender>,
    /// Gender assigned to specific named speakers.
    pub agent_genders: BTreeMap<String, Gender>,
}

impl TranslationContext {
    /// Construct an empty context (all genders default to
    /// [`Gender::Male`], per spec §4.8 rule 3).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The gender to use for a named speaker, falling back to
    /// `default_agent_gender`, then [`Gender::Male`].
    #[must_use]
    pub fn gender_for_speaker(&self, speaker: &str) -> Gender {
        self.agent_genders
            .get(speaker)
            .copied()
            .or(self.default_agent_gender)
            .unwrap_or(Gender::Male)
    }

    /// The gender to use for the user, defaulting to [`Gender::Male`].
    #[must_use]
    pub fn user_gender(&self) -> Gender {
        self.user_gender.unwrap_or(Gender::Male)
    }
}

/// Render a segment's canonical textual form, used for `Translatable`
/// equality/hashing and for translation-table lookups.
///
/// Text segments render as their plain `$variable`-interpolated text;
/// `<<input>>` commands (the only command kind allowed inside a
/// translatable, per spec §4.6) render as their full source form so that a
/// translation file entry can match against it verbatim.
#[must_use]
pub fn segment_canonical_text(segment: &Segment) -> String {
    match segment {
        Segment::Text(vs) => vs.canonical_text(),
        Segment::Command(cmd) => cmd.to_string(),
    }
}

/// A maximal span of user-facing text within a body, eligible for
/// translation.
///
/// Equality and hashing are defined on the canonical string (the
/// concatenation of the segments' canonical textual forms), not on the
/// segment list's structural identity — two `Translatable`s built from
/// differently-shaped but textually-identical segment runs are equal.
#[derive(Debug, Clone)]
pub struct Translatable {
    /// The segments making up this translatable span, in source order.
    pub segments: Vec<Segment>,
}

impl Translatable {
    /// Construct a translatable from its segments.
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The canonical string: concatenation of each segment's canonical
    /// textual form.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        self.segments.iter().map(segment_canonical_text).collect()
    }
}

impl PartialEq for Translatable {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_string() == other.canonical_string()
    }
}

impl Eq for Translatable {}

impl Hash for Translatable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_string().hash(state);
    }
}

/// A single translated variant of a [`Translatable`], qualified by context
/// labels (speaker names, `_user`, gender tags).
#[derive(Debug, Clone)]
pub struct ContextTranslation {
    /// Context labels qualifying this variant (speaker names, `_user`,
    /// `male_speaker`, `female_speaker`, `male_addressee`, `female_addressee`).
    pub context: BTreeSet<String>,
    /// The translated text.
    pub translation: Translatable,
}

/// A parsed translation file: every distinct source [`Translatable`] found,
/// mapped to its (possibly empty) list of context-qualified variants, in
/// insertion order.
///
/// Per design note §9, this crate resolves the "exact vs. normalized table"
/// ambiguity in the original system by preserving strict insertion order
/// throughout — later entries never silently shadow earlier ones except
/// where spec §4.7 explicitly defines that as an error (duplicate
/// `(source, context)` pairs), so callers can rely on first-seen-wins
/// without surprises from iteration-order-dependent collections.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    entries: IndexMap<String, (Translatable, Vec<ContextTranslation>)>,
}

impl TranslationMap {
    /// An empty translation map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct source translatables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if this map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the context-translation list for a source's canonical string.
    #[must_use]
    pub fn get(&self, canonical_source: &str) -> Option<&Vec<ContextTranslation>> {
        self.entries.get(canonical_source).map(|(_, v)| v)
    }

    /// Append a context translation for `source`, creating the entry if this
    /// is the first time `source`'s canonical string has been seen.
    pub fn push(&mut self, source: Translatable, context_translation: ContextTranslation) {
        let key = source.canonical_string();
        self.entries
            .entry(key)
            .or_insert_with(|| (source, Vec::new()))
            .1
            .push(context_translation);
    }

    /// Iterate `(source, variants)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Translatable, &Vec<ContextTranslation>)> {
        self.entries.values().map(|(src, variants)| (src, variants))
    }
}
