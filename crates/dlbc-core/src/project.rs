//! A linked project: dialogues grouped by logical name and language.

use crate::dialogue::Dialogue;
use crate::file::FileDescription;
use crate::translation::TranslationMap;
use indexmap::IndexMap;

/// A fully linked set of dialogues, grouped by logical dialogue name and
/// then by language code.
///
/// Insertion order is preserved at both levels: `dialogues` iterates
/// dialogue names in the order their first file was registered, and each
/// inner map iterates language codes in the order that language's file for
/// this dialogue was registered.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Logical dialogue name -> language code -> parsed dialogue.
    dialogues: IndexMap<String, IndexMap<String, Dialogue>>,
    /// Logical dialogue name -> language code -> translation map loaded from
    /// that language's `.json` translation file, if any. A source-language
    /// entry never has a translation map of its own.
    translations: IndexMap<String, IndexMap<String, TranslationMap>>,
    /// The language code translations are written against when a dialogue
    /// has no explicit source-language marker (spec §4.5: the language with
    /// the most registered files, ties broken by first-registered).
    pub source_language: Option<String>,
}

impl Project {
    /// An empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parsed dialogue under its logical name and language.
    pub fn insert(&mut self, dialogue: Dialogue) {
        self.dialogues
            .entry(dialogue.name.clone())
            .or_default()
            .insert(dialogue.language_code.clone(), dialogue);
    }

    /// Look up a dialogue by logical name and language.
    #[must_use]
    pub fn get(&self, name: &str, language_code: &str) -> Option<&Dialogue> {
        self.dialogues.get(name)?.get(language_code)
    }

    /// All language codes present for a given logical dialogue name, in
    /// registration order.
    #[must_use]
    pub fn languages_for(&self, name: &str) -> Vec<&str> {
        self.dialogues
            .get(name)
            .map(|langs| langs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every distinct language code present anywhere in the project, in
    /// first-seen order.
    #[must_use]
    pub fn all_language_codes(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for langs in self.dialogues.values() {
            for code in langs.keys() {
                if !seen.contains(code) {
                    seen.push(code.clone());
                }
            }
        }
        seen
    }

    /// Every `(name, language_code)` pair registered, in outer-then-inner
    /// insertion order.
    pub fn file_descriptions(&self) -> impl Iterator<Item = FileDescription> + '_ {
        self.dialogues.iter().flat_map(|(name, langs)| {
            langs.keys().map(move |lang| FileDescription::new(lang.clone(), name.clone()))
        })
    }

    /// Logical dialogue names, in registration order.
    pub fn dialogue_names(&self) -> impl Iterator<Item = &str> {
        self.dialogues.keys().map(String::as_str)
    }

    /// Total number of registered dialogue files (summed across languages).
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.dialogues.values().map(IndexMap::len).sum()
    }

    /// Register a translation map for a logical dialogue name in a given
    /// language, loaded from that language's `.json` translation file.
    pub fn insert_translation(
        &mut self,
        name: impl Into<String>,
        language_code: impl Into<String>,
        map: TranslationMap,
    ) {
        self.translations
            .entry(name.into())
            .or_default()
            .insert(language_code.into(), map);
    }

    /// Look up the translation map registered for a logical dialogue name
    /// in a given language.
    #[must_use]
    pub fn get_translation(&self, name: &str, language_code: &str) -> Option<&TranslationMap> {
        self.translations.get(name)?.get(language_code)
    }
}
