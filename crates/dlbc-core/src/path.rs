//! Logical path resolution for inter-dialogue node pointers (spec §3/§6).
//!
//! Paths always use `/` regardless of host OS; dialogue identifiers never
//! carry a `.dlb`/`.json` extension.

use std::fmt;

/// A problem resolving a relative dialogue reference to an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A `..` segment would ascend above the language root.
    EscapesRoot,
    /// The reference resolves to an empty dialogue name.
    EmptyDialogueName,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EscapesRoot => f.write_str("'..' traversal ascends above the language root"),
            Self::EmptyDialogueName => f.write_str("dialogue reference is empty"),
        }
    }
}

impl std::error::Error for PathError {}

/// Directory component of a logical dialogue path (`"zone1/npc"` -> `"zone1"`).
fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Resolve a (possibly relative) dialogue reference against the dialogue it
/// was written in, producing an absolute, normalized logical path.
///
/// - A reference starting with `/` is absolute from the language root.
/// - `./` and `../` are resolved relative to `origin_dialogue_path`'s
///   directory (not the origin path itself — a dialogue is a file, not a
///   directory).
/// - A bare reference with no leading `/`, `./` or `../` resolves the same
///   way as `./reference`.
pub fn resolve_absolute_dialogue_path(
    origin_dialogue_path: &str,
    reference: &str,
) -> Result<String, PathError> {
    let mut stack: Vec<&str> = Vec::new();
    if !reference.starts_with('/') {
        stack.extend(dirname(origin_dialogue_path).split('/').filter(|s| !s.is_empty()));
    }

    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(PathError::EscapesRoot);
                }
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        return Err(PathError::EmptyDialogueName);
    }
    Ok(stack.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_resolves_relative_to_origin_directory() {
        let resolved = resolve_absolute_dialogue_path("zone1/npc", "other").unwrap();
        assert_eq!(resolved, "zone1/other");
    }

    #[test]
    fn dot_slash_resolves_relative_to_origin_directory() {
        let resolved = resolve_absolute_dialogue_path("zone1/npc", "./other").unwrap();
        assert_eq!(resolved, "zone1/other");
    }

    #[test]
    fn dot_dot_ascends_one_level() {
        let resolved = resolve_absolute_dialogue_path("zone1/npc", "../shared/intro").unwrap();
        assert_eq!(resolved, "shared/intro");
    }

    #[test]
    fn leading_slash_is_root_absolute() {
        let resolved = resolve_absolute_dialogue_path("zone1/sub/npc", "/shared/intro").unwrap();
        assert_eq!(resolved, "shared/intro");
    }

    #[test]
    fn dot_dot_exactly_to_root_is_allowed() {
        let resolved = resolve_absolute_dialogue_path("zone1/npc", "../npc2").unwrap();
        assert_eq!(resolved, "npc2");
    }

    #[test]
    fn dot_dot_past_root_is_an_error() {
        let err = resolve_absolute_dialogue_path("npc", "../npc2").unwrap_err();
        assert_eq!(err, PathError::EscapesRoot);
    }

    #[test]
    fn empty_reference_is_an_error() {
        let err = resolve_absolute_dialogue_path("zone1/npc", "").unwrap_err();
        assert_eq!(err, PathError::EmptyDialogueName);
    }

    #[test]
    fn dot_dot_only_with_nothing_after_is_empty_name() {
        let err = resolve_absolute_dialogue_path("zone1/sub/npc", "..").unwrap_err();
        assert_eq!(err, PathError::EmptyDialogueName);
    }

    #[test]
    fn stable_across_reparses() {
        let a = resolve_absolute_dialogue_path("zone1/npc", "../shared/intro").unwrap();
        let b = resolve_absolute_dialogue_path("zone1/npc", "../shared/intro").unwrap();
        assert_eq!(a, b);
    }
}
