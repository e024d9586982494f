//! Linker configuration (spec §4.10 / SPEC_FULL §4.10).
//!
//! Small, explicit `*Options` structs rather than hidden global state or
//! environment variables, following the teacher's `RuntimeConfig`
//! convention.

use std::collections::BTreeSet;

/// One language declared by an external `language-map` descriptor.
///
/// XML deserialization of the descriptor itself is out of scope for this
/// core (spec §1) — a caller that owns a `language-map.xml` parses it with
/// its own XML layer and hands the result in here as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDeclaration {
    /// The declared language code (e.g. `"en"`).
    pub code: String,
    /// The declared display name (e.g. `"English"`).
    pub name: String,
}

impl LanguageDeclaration {
    /// Construct a new declaration.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }
}

/// A parsed `language-map` descriptor: exactly one source language plus
/// zero or more translation languages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageMapDescriptor {
    /// The declared source language.
    pub source: Option<LanguageDeclaration>,
    /// The declared translation languages.
    pub translations: Vec<LanguageDeclaration>,
}

impl LanguageMapDescriptor {
    /// Every declared language code, source first, in declaration order.
    #[must_use]
    pub fn all_codes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(source) = &self.source {
            out.push(source.code.as_str());
        }
        out.extend(self.translations.iter().map(|d| d.code.as_str()));
        out
    }
}

/// Options controlling how [`crate::link_project`] behaves.
///
/// Mirrors the flags the excluded CLI would otherwise have parsed from
/// arguments.
#[derive(Debug, Clone, Default)]
pub struct ProjectLinkOptions {
    /// A caller-supplied `language-map` descriptor. When absent, the source
    /// language is inferred as the first language code the loader yields
    /// (spec §4.5 step 1).
    pub language_map: Option<LanguageMapDescriptor>,
    /// When `Some`, only these translation language codes are parsed; every
    /// other non-source language's files are skipped. `None` loads every
    /// translation language the loader yields.
    pub translation_languages: Option<BTreeSet<String>>,
    /// Promotes missing-reference-target issues (spec §7 `ReferenceError`)
    /// from warnings to errors.
    pub strict: bool,
}

impl ProjectLinkOptions {
    /// Default options: no descriptor, load every translation language,
    /// missing references are warnings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `language_code` should be loaded as a translation language
    /// under these options.
    #[must_use]
    pub fn loads_translation_language(&self, language_code: &str) -> bool {
        match &self.translation_languages {
            Some(allowed) => allowed.contains(language_code),
            None => true,
        }
    }
}
