//! Node headers: `key: value` lines preceding the `---` separator.

use std::collections::BTreeMap;

/// A node's header block.
///
/// `title` and `speaker` are required and non-empty (enforced by the
/// script parser, not by this type — a parser that fails validation still
/// needs to construct a partial [`crate::Node`] to report errors against).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// The node's title. Must match `[A-Za-z_][A-Za-z0-9_]*` and be unique
    /// within its dialogue.
    pub title: String,
    /// The speaker for this node's body text.
    pub speaker: String,
    /// Optional UI color identifier.
    pub color_id: Option<String>,
    /// Any further `key: value` pairs, preserved verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Header {
    /// Construct a header with just a title and speaker.
    #[must_use]
    pub fn new(title: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            speaker: speaker.into(),
            color_id: None,
            extra: BTreeMap::new(),
        }
    }
}

/// `true` iff `title` matches `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_valid_title(title: &str) -> bool {
    let mut chars = title.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Case-insensitive check for the literal node title `Start`.
#[must_use]
pub fn is_start_title(title: &str) -> bool {
    title.eq_ignore_ascii_case("start")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_titles() {
        assert!(is_valid_title("Start"));
        assert!(is_valid_title("_private"));
        assert!(is_valid_title("node_42"));
    }

    #[test]
    fn invalid_titles() {
        assert!(!is_valid_title(""));
        assert!(!is_valid_title("42node"));
        assert!(!is_valid_title("has space"));
        assert!(!is_valid_title("has-dash"));
    }

    #[test]
    fn start_title_is_case_insensitive() {
        assert!(is_start_title("Start"));
        assert!(is_start_title("START"));
        assert!(is_start_title("start"));
        assert!(!is_start_title("Started"));
    }
}
