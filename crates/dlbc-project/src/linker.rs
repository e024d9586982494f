//! The project linker itself (spec §4.5).

use crate::loader::{FileEntry, FileExtension, FileLoader};
use crate::options::ProjectLinkOptions;
use dlbc_core::{FileDescription, NodePointer, Project};
use dlbc_error::{DuplicateLanguageCodeError, ParseError, ReferenceIssue, Severity};
use std::collections::BTreeMap;

/// Everything produced by linking a project (spec §4.5 step 5).
#[derive(Debug, Clone, Default)]
pub struct ProjectParserResult {
    /// The linked project: every source dialogue and translation map that
    /// parsed at all (a file-level parse failure still yields a dialogue,
    /// possibly with zero nodes; see [`dlbc_script::ParserResult`]).
    pub project: Project,
    /// Every parse error, keyed by the file it occurred in.
    pub parse_errors: BTreeMap<FileDescription, Vec<ParseError>>,
    /// Every non-fatal diagnostic, keyed by the file it occurred in.
    pub warnings: BTreeMap<FileDescription, Vec<String>>,
    /// Node pointers (internal or external) whose target dialogue or node
    /// could not be found, in the order they were discovered.
    pub reference_issues: Vec<ReferenceIssue>,
    /// Language codes declared more than once by the `language-map`
    /// descriptor.
    pub duplicate_language_errors: Vec<DuplicateLanguageCodeError>,
    /// The language this project's dialogues are authored in.
    pub source_language: String,
}

impl ProjectParserResult {
    /// `true` if any file has at least one parse error. A caller may choose
    /// to treat this as a hard stop (spec §7).
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.parse_errors.values().any(|errors| !errors.is_empty())
    }
}

/// Link a whole project: parse every source-language `.dlb` file and every
/// loaded `.json` translation file, then resolve inter-dialogue node
/// pointers against the result.
#[must_use]
pub fn link_project(loader: &dyn FileLoader, options: &ProjectLinkOptions) -> ProjectParserResult {
    let span = tracing::debug_span!("link_project");
    let _enter = span.enter();

    let mut result = ProjectParserResult::default();
    let entries = loader.list();

    let duplicate_errors = check_duplicate_language_declarations(options);
    result.duplicate_language_errors = duplicate_errors;

    let source_language = determine_source_language(options, &entries);
    result.source_language = source_language.clone();
    result.project.source_language = Some(source_language.clone());
    tracing::debug!(%source_language, file_count = entries.len(), "resolved source language");

    for entry in &entries {
        match entry.extension {
            FileExtension::Dlb => link_dlb_entry(loader, entry, &source_language, &mut result),
            FileExtension::Json => link_json_entry(loader, entry, &source_language, options, &mut result),
        }
    }

    result.reference_issues = resolve_references(&result.project, options.strict);
    for issue in &result.reference_issues {
        if issue.severity == Severity::Warning {
            tracing::warn!(%issue, "unresolved node pointer");
        }
    }
    tracing::debug!(
        dialogue_count = result.project.file_count(),
        reference_issue_count = result.reference_issues.len(),
        "linked project"
    );
    result
}

fn check_duplicate_language_declarations(options: &ProjectLinkOptions) -> Vec<DuplicateLanguageCodeError> {
    let Some(descriptor) = &options.language_map else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    let mut first_seen: BTreeMap<&str, &str> = BTreeMap::new();
    let labeled = descriptor
        .source
        .as_ref()
        .map(|d| (d.code.as_str(), "source"))
        .into_iter()
        .chain(descriptor.translations.iter().map(|d| (d.code.as_str(), "translation")));
    for (code, role) in labeled {
        match first_seen.get(code) {
            Some(first_role) => errors.push(DuplicateLanguageCodeError {
                code: code.to_string(),
                first_declared_in: (*first_role).to_string(),
                duplicate_in: role.to_string(),
            }),
            None => {
                first_seen.insert(code, role);
            }
        }
    }
    errors
}

fn determine_source_language(options: &ProjectLinkOptions, entries: &[FileEntry]) -> String {
    if let Some(descriptor) = &options.language_map {
        if let Some(source) = &descriptor.source {
            return source.code.clone();
        }
    }
    entries
        .first()
        .map(|e| e.language_code.clone())
        .unwrap_or_default()
}

fn link_dlb_entry(
    loader: &dyn FileLoader,
    entry: &FileEntry,
    source_language: &str,
    result: &mut ProjectParserResult,
) {
    let fd = FileDescription::new(entry.language_code.clone(), entry.logical_path.clone());
    if entry.language_code != source_language {
        result
            .warnings
            .entry(fd)
            .or_default()
            .push(format!(
                "'.dlb' file found in non-source language '{}', skipped",
                entry.language_code
            ));
        return;
    }
    let content = match loader.open(entry) {
        Ok(c) => c,
        Err(e) => {
            result.warnings.entry(fd).or_default().push(format!("could not read file: {e}"));
            return;
        }
    };
    let parsed = dlbc_script::parse_script(&entry.logical_path, &entry.language_code, &content);
    if !parsed.errors.is_empty() {
        result.parse_errors.entry(fd.clone()).or_default().extend(parsed.errors);
    }
    if !parsed.warnings.is_empty() {
        result.warnings.entry(fd).or_default().extend(parsed.warnings);
    }
    result.project.insert(parsed.dialogue);
}

fn link_json_entry(
    loader: &dyn FileLoader,
    entry: &FileEntry,
    source_language: &str,
    options: &ProjectLinkOptions,
    result: &mut ProjectParserResult,
) {
    if entry.language_code == source_language || !options.loads_translation_language(&entry.language_code) {
        return;
    }
    let fd = FileDescription::new(entry.language_code.clone(), entry.logical_path.clone());
    let content = match loader.open(entry) {
        Ok(c) => c,
        Err(e) => {
            result.warnings.entry(fd).or_default().push(format!("could not read file: {e}"));
            return;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            result
                .parse_errors
                .entry(fd)
                .or_default()
                .push(ParseError::new(
                    &entry.logical_path,
                    dlbc_error::SourceLocation::new(e.line(), e.column()),
                    dlbc_error::ErrorCode::TranslationInvalidValue,
                    format!("invalid JSON: {e}"),
                ));
            return;
        }
    };
    let parsed = dlbc_i18n::parse_translation_file(&entry.logical_path, &value);
    if !parsed.errors.is_empty() {
        result.parse_errors.entry(fd.clone()).or_default().extend(parsed.errors);
    }
    if !parsed.warnings.is_empty() {
        result.warnings.entry(fd).or_default().extend(parsed.warnings);
    }
    result
        .project
        .insert_translation(entry.logical_path.clone(), entry.language_code.clone(), parsed.map);
}

/// Resolve every internal and external node pointer against the project,
/// recording a [`ReferenceIssue`] for any target that cannot be found (spec
/// §4.5 step 4). `strict` promotes a missing target from a warning to an
/// error (spec §7).
///
/// Spec §4.5 step 4 names external pointers explicitly; an internal
/// pointer whose target node is missing is exactly as dangling and just as
/// cheap to catch, so this resolves both (documented in `DESIGN.md`).
fn resolve_references(project: &Project, strict: bool) -> Vec<ReferenceIssue> {
    let mut issues = Vec::new();
    for name in project.dialogue_names().map(str::to_string).collect::<Vec<_>>() {
        for lang in project.languages_for(&name).into_iter().map(str::to_string).collect::<Vec<_>>() {
            let Some(dialogue) = project.get(&name, &lang) else { continue };
            for pointer in dialogue.internal_references.iter().chain(dialogue.external_references.iter()) {
                check_pointer(project, &name, &lang, pointer, strict, &mut issues);
            }
        }
    }
    issues
}

fn check_pointer(
    project: &Project,
    origin_dialogue: &str,
    origin_language: &str,
    pointer: &NodePointer,
    strict: bool,
    issues: &mut Vec<ReferenceIssue>,
) {
    let target_dialogue_name = pointer.absolute_target_dialogue(origin_dialogue).to_string();
    let target_node_id = pointer.target_node_id().to_string();
    let origin_node_id = match pointer {
        NodePointer::Internal { origin_node_id, .. } => origin_node_id.clone(),
        NodePointer::External { origin_node_id, .. } => origin_node_id.clone(),
    };

    let severity = if strict { Severity::Error } else { Severity::Warning };

    let Some(target_dialogue) = project.get(&target_dialogue_name, origin_language) else {
        issues.push(ReferenceIssue {
            origin_dialogue: origin_dialogue.to_string(),
            origin_node_id,
            target_dialogue: target_dialogue_name,
            target_node_id,
            severity,
            message: "target dialogue does not exist".to_string(),
        });
        return;
    };
    if target_dialogue.find_node(&target_node_id).is_none() {
        issues.push(ReferenceIssue {
            origin_dialogue: origin_dialogue.to_string(),
            origin_node_id,
            target_dialogue: target_dialogue_name,
            target_node_id,
            severity,
            message: "target node does not exist in target dialogue".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MapFileLoader;

    #[test]
    fn single_dialogue_links_with_no_issues() {
        let loader = MapFileLoader::new().with_dlb(
            "en",
            "zone1/npc",
            "title: Start\nspeaker: S\n---\nHi[[Bye|N2]]\n===\ntitle: N2\nspeaker: S\n---\nBye",
        );
        let result = link_project(&loader, &ProjectLinkOptions::new());
        assert!(!result.has_errors());
        assert_eq!(result.source_language, "en");
        assert!(result.project.get("zone1/npc", "en").is_some());
    }

    #[test]
    fn external_reference_resolves_across_dialogues() {
        let loader = MapFileLoader::new()
            .with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\n[[Go|../shared/intro.Start]]")
            .with_dlb("en", "shared/intro", "title: Start\nspeaker: S\n---\nWelcome");
        let result = link_project(&loader, &ProjectLinkOptions::new());
        assert!(result.reference_issues.is_empty(), "{:?}", result.reference_issues);
    }

    #[test]
    fn missing_external_target_is_a_warning() {
        let loader = MapFileLoader::new().with_dlb(
            "en",
            "zone1/npc",
            "title: Start\nspeaker: S\n---\n[[Go|../shared/intro.Start]]",
        );
        let result = link_project(&loader, &ProjectLinkOptions::new());
        assert_eq!(result.reference_issues.len(), 1);
        assert_eq!(result.reference_issues[0].severity, Severity::Warning);
        assert_eq!(result.reference_issues[0].target_dialogue, "shared/intro");
    }

    #[test]
    fn missing_target_is_an_error_under_strict_mode() {
        let loader = MapFileLoader::new().with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\n[[Go|N2]]");
        let options = ProjectLinkOptions { strict: true, ..Default::default() };
        let result = link_project(&loader, &options);
        assert_eq!(result.reference_issues.len(), 1);
        assert_eq!(result.reference_issues[0].severity, Severity::Error);
    }

    #[test]
    fn duplicate_language_code_in_descriptor_is_detected() {
        use crate::options::{LanguageDeclaration, LanguageMapDescriptor};
        let descriptor = LanguageMapDescriptor {
            source: Some(LanguageDeclaration::new("en", "English")),
            translations: vec![LanguageDeclaration::new("en", "English (duplicate)")],
        };
        let options = ProjectLinkOptions { language_map: Some(descriptor), ..Default::default() };
        let loader = MapFileLoader::new();
        let result = link_project(&loader, &options);
        assert_eq!(result.duplicate_language_errors.len(), 1);
        assert_eq!(result.duplicate_language_errors[0].code, "en");
    }

    #[test]
    fn translation_file_is_attached_under_its_language() {
        let loader = MapFileLoader::new()
            .with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\nHello")
            .with_json("nl", "zone1/npc", r#"{"Hello":"Hallo"}"#);
        let result = link_project(&loader, &ProjectLinkOptions::new());
        assert!(!result.has_errors(), "{:?}", result.parse_errors);
        let map = result.project.get_translation("zone1/npc", "nl").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn non_source_language_dlb_file_is_skipped_with_a_warning() {
        let loader = MapFileLoader::new()
            .with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\nHi")
            .with_dlb("nl", "zone1/npc", "title: Start\nspeaker: S\n---\nHoi");
        let result = link_project(&loader, &ProjectLinkOptions::new());
        assert!(result.project.get("zone1/npc", "nl").is_none());
        let fd = FileDescription::new("nl", "zone1/npc");
        assert!(result.warnings.get(&fd).is_some());
    }

    #[test]
    fn translation_language_allowlist_skips_others() {
        let loader = MapFileLoader::new()
            .with_dlb("en", "zone1/npc", "title: Start\nspeaker: S\n---\nHi")
            .with_json("nl", "zone1/npc", r#"{"Hi":"Hoi"}"#)
            .with_json("de", "zone1/npc", r#"{"Hi":"Hallo"}"#);
        let mut allowed = std::collections::BTreeSet::new();
        allowed.insert("nl".to_string());
        let options = ProjectLinkOptions { translation_languages: Some(allowed), ..Default::default() };
        let result = link_project(&loader, &options);
        assert!(result.project.get_translation("zone1/npc", "nl").is_some());
        assert!(result.project.get_translation("zone1/npc", "de").is_none());
    }
}
