//! The `FileLoader` capability the linker consumes (spec §6).
//!
//! The core never touches host paths directly; a project's files reach it
//! only through this trait. No filesystem-backed implementation ships here
//! — `DirectoryFileLoader` is an excluded external collaborator (spec §1).

use std::fmt;

/// The two file kinds a DialogueBranch project is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileExtension {
    /// A dialogue script (`.dlb`).
    Dlb,
    /// A translation file (`.json`).
    Json,
}

impl FileExtension {
    /// The extension string, without the leading dot.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dlb => "dlb",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file a [`FileLoader`] knows how to list and open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// The language code this file belongs to (e.g. `"en"`, `"nl"`).
    pub language_code: String,
    /// Forward-slash logical path, relative to the language root, without
    /// an extension.
    pub logical_path: String,
    /// Which kind of file this is.
    pub extension: FileExtension,
}

impl FileEntry {
    /// Construct a new file entry.
    #[must_use]
    pub fn new(
        language_code: impl Into<String>,
        logical_path: impl Into<String>,
        extension: FileExtension,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            logical_path: logical_path.into(),
            extension,
        }
    }
}

/// A source of project files: a directory tree, an archive, or (in tests)
/// an in-memory map.
///
/// Implementations own whatever file handles they use internally and must
/// release them once `open` returns (spec §5). This core treats every file
/// as UTF-8 text, so `open` returns a decoded `String` rather than a raw
/// byte reader — there is no binary content anywhere in a DialogueBranch
/// project for a byte-oriented interface to earn its keep.
pub trait FileLoader {
    /// Every file belonging to this project, in an order the caller should
    /// treat as significant for determinism (implementations should yield
    /// in sorted order; spec §5).
    fn list(&self) -> Vec<FileEntry>;

    /// Read one file's full UTF-8 content.
    fn open(&self, entry: &FileEntry) -> std::io::Result<String>;
}

/// An in-memory [`FileLoader`], for tests only.
///
/// Preserves insertion order in [`MapFileLoader::list`], so test fixtures
/// can rely on deterministic language/source ordering the same way a
/// real directory walk sorted by path would.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct MapFileLoader {
    files: Vec<(FileEntry, String)>,
}

#[cfg(any(test, feature = "test-util"))]
impl MapFileLoader {
    /// An empty in-memory project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `.dlb` file's content.
    #[must_use]
    pub fn with_dlb(mut self, language_code: &str, logical_path: &str, content: &str) -> Self {
        self.files.push((
            FileEntry::new(language_code, logical_path, FileExtension::Dlb),
            content.to_string(),
        ));
        self
    }

    /// Register a `.json` translation file's content.
    #[must_use]
    pub fn with_json(mut self, language_code: &str, logical_path: &str, content: &str) -> Self {
        self.files.push((
            FileEntry::new(language_code, logical_path, FileExtension::Json),
            content.to_string(),
        ));
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl FileLoader for MapFileLoader {
    fn list(&self) -> Vec<FileEntry> {
        self.files.iter().map(|(entry, _)| entry.clone()).collect()
    }

    fn open(&self, entry: &FileEntry) -> std::io::Result<String> {
        self.files
            .iter()
            .find(|(e, _)| e == entry)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no such file: {}:{} ({})", entry.language_code, entry.logical_path, entry.extension),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_loader_lists_in_insertion_order() {
        let loader = MapFileLoader::new()
            .with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\nHi")
            .with_json("nl", "zone1/npc", "{}");
        let entries = loader.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].language_code, "en");
        assert_eq!(entries[1].language_code, "nl");
    }

    #[test]
    fn open_missing_entry_is_an_io_error() {
        let loader = MapFileLoader::new();
        let entry = FileEntry::new("en", "missing", FileExtension::Dlb);
        assert!(loader.open(&entry).is_err());
    }
}
