//! Exact and normalized lookup tables built once per translation pass
//! (spec §4.8).

use dlbc_core::{ContextTranslation, TranslationMap};
use std::collections::HashMap;

/// Collapse internal runs of whitespace to a single space (spec §4.8: "a
/// source differing only in internal whitespace still matches").
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed-source lookup tables derived from a [`TranslationMap`].
///
/// Per the open question in spec §9, later entries win on a normalized-key
/// collision — insertion order (the order [`TranslationMap::iter`] yields)
/// determines which of two textually-close sources shadows the other, and
/// that choice is deterministic and documented rather than left to an
/// unordered map's iteration order.
pub struct TranslationTables<'a> {
    map: &'a TranslationMap,
    exact: HashMap<String, String>,
    normalized: HashMap<String, String>,
}

impl<'a> TranslationTables<'a> {
    /// Build both tables from `map`.
    #[must_use]
    pub fn build(map: &'a TranslationMap) -> Self {
        let mut exact = HashMap::new();
        let mut normalized = HashMap::new();
        for (source, _variants) in map.iter() {
            let canonical = source.canonical_string();
            let trimmed = canonical.trim().to_string();
            let norm = normalize_whitespace(&trimmed);
            exact.insert(trimmed, canonical.clone());
            normalized.insert(norm, canonical);
        }
        Self { map, exact, normalized }
    }

    /// Look up `trimmed_source`, falling back from the exact table to the
    /// normalized table exactly once.
    #[must_use]
    pub fn lookup(&self, trimmed_source: &str) -> Option<&'a Vec<ContextTranslation>> {
        if let Some(key) = self.exact.get(trimmed_source) {
            if let Some(variants) = self.map.get(key) {
                return Some(variants);
            }
        }
        let norm = normalize_whitespace(trimmed_source);
        let key = self.normalized.get(&norm)?;
        self.map.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlbc_core::{Segment, Translatable, VariableString};
    use std::collections::BTreeSet;

    fn map_with(source: &str, translation: &str) -> TranslationMap {
        let mut map = TranslationMap::new();
        map.push(
            Translatable::new(vec![Segment::Text(VariableString::from_text(source))]),
            ContextTranslation {
                context: BTreeSet::new(),
                translation: Translatable::new(vec![Segment::Text(VariableString::from_text(translation))]),
            },
        );
        map
    }

    #[test]
    fn exact_match() {
        let map = map_with("Hello", "Hola");
        let tables = TranslationTables::build(&map);
        let variants = tables.lookup("Hello").unwrap();
        assert_eq!(variants[0].translation.canonical_string(), "Hola");
    }

    #[test]
    fn normalized_fallback_matches_extra_internal_whitespace() {
        let map = map_with("Hello  world", "Hola mundo");
        let tables = TranslationTables::build(&map);
        assert!(tables.lookup("Hello  world").is_some());
        let variants = tables.lookup("Hello world").unwrap();
        assert_eq!(variants[0].translation.canonical_string(), "Hola mundo");
    }

    #[test]
    fn unmatched_source_is_none() {
        let map = map_with("Hello", "Hola");
        let tables = TranslationTables::build(&map);
        assert!(tables.lookup("Goodbye").is_none());
    }
}
