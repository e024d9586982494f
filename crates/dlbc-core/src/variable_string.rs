//! Text interleaved with `$variable` references.

use std::fmt;

/// One piece of a [`VariableString`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringPart {
    /// A raw run of text, already unescaped.
    Text(String),
    /// A `$name` variable reference (name excludes the `$`).
    Variable(String),
}

/// An ordered sequence of text fragments and variable references, e.g. the
/// body text `"Hello $name, welcome!"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableString {
    /// The parts, in source order.
    pub parts: Vec<StringPart>,
}

impl VariableString {
    /// An empty variable string.
    #[must_use]
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Construct from a single plain-text run (no variables).
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::new()
        } else {
            Self { parts: vec![StringPart::Text(text)] }
        }
    }

    /// Append a text fragment, merging with a trailing text part if present.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(StringPart::Text(existing)) = self.parts.last_mut() {
            existing.push_str(text);
        } else {
            self.parts.push(StringPart::Text(text.to_string()));
        }
    }

    /// Append a variable reference.
    pub fn push_variable(&mut self, name: impl Into<String>) {
        self.parts.push(StringPart::Variable(name.into()));
    }

    /// Whether this string is empty (no parts at all).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `true` iff this string contains any variable reference, or any
    /// non-whitespace text (spec §3: "has content").
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.parts.iter().any(|p| match p {
            StringPart::Variable(_) => true,
            StringPart::Text(t) => t.chars().any(|c| !c.is_whitespace()),
        })
    }

    /// Concatenated plain-text form, rendering each variable as `$name`.
    ///
    /// This is the canonical string used for translation lookups and
    /// `Translatable` equality.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                StringPart::Text(t) => out.push_str(t),
                StringPart::Variable(name) => {
                    out.push('$');
                    out.push_str(name);
                }
            }
        }
        out
    }

    /// Re-escape this string back into valid `.dlb` body source text.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                StringPart::Text(t) => out.push_str(&escape_body_text(t)),
                StringPart::Variable(name) => {
                    out.push('$');
                    out.push_str(name);
                }
            }
        }
        out
    }
}

impl fmt::Display for VariableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// Escape characters in plain body text that would otherwise be read as
/// syntax by the body tokenizer (spec §4.2): `< > [ ] | $ \`.
#[must_use]
pub fn escape_body_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' | '>' | '[' | ']' | '|' | '$' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_content_true_for_variable_only() {
        let mut vs = VariableString::new();
        vs.push_variable("name");
        assert!(vs.has_content());
    }

    #[test]
    fn has_content_false_for_whitespace_only() {
        let vs = VariableString::from_text("   \n\t");
        assert!(!vs.has_content());
    }

    #[test]
    fn has_content_false_for_empty() {
        assert!(!VariableString::new().has_content());
    }

    #[test]
    fn canonical_text_renders_variables() {
        let mut vs = VariableString::new();
        vs.push_text("Hello ");
        vs.push_variable("name");
        vs.push_text("!");
        assert_eq!(vs.canonical_text(), "Hello $name!");
    }

    #[test]
    fn to_source_escapes_special_characters() {
        let vs = VariableString::from_text("a < b [c] | d $e \\f");
        assert_eq!(vs.to_source(), "a \\< b \\[c\\] \\| d \\$e \\\\f");
    }

    #[test]
    fn push_text_merges_consecutive_runs() {
        let mut vs = VariableString::new();
        vs.push_text("a");
        vs.push_text("b");
        assert_eq!(vs.parts.len(), 1);
        assert_eq!(vs.canonical_text(), "ab");
    }
}
