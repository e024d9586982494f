//! Integration coverage against real parser output rather than hand-built
//! fixtures: a `.dlb` script parsed by `dlbc-script` and a `.json`
//! translation file parsed by `dlbc-i18n`, spliced together.

use dlbc_core::TranslationContext;
use dlbc_translate::translate_dialogue;
use serde_json::json;

#[test]
fn translates_a_parsed_dialogue_against_a_parsed_translation_file() {
    let script = "title: Start\nspeaker: Agent\n---\nWelcome, traveler![[Leave|Bye]]\n===\ntitle: Bye\nspeaker: Agent\n---\nFarewell.";
    let parsed = dlbc_script::parse_script("zone1/npc", "en", script);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let translation_file = json!({ "Welcome, traveler!": "Bienvenido, viajero!" });
    let parsed_translation = dlbc_i18n::parse_translation_file("zone1/npc", &translation_file);
    assert!(parsed_translation.errors.is_empty(), "{:?}", parsed_translation.errors);

    let translated = translate_dialogue(&parsed.dialogue, &TranslationContext::new(), &parsed_translation.map);
    assert_eq!(translated.nodes[0].body.to_string(), "Bienvenido, viajero![[Leave|Bye]]");
    assert_eq!(translated.nodes[1].body.to_string(), parsed.dialogue.nodes[1].body.to_string());
}

#[test]
fn lookup_miss_leaves_the_body_untouched() {
    let script = "title: Start\nspeaker: Agent\n---\nUnseen line.";
    let parsed = dlbc_script::parse_script("zone1/npc", "en", script);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let translation_file = json!({ "Some other line.": "Otra linea." });
    let parsed_translation = dlbc_i18n::parse_translation_file("zone1/npc", &translation_file);

    let translated = translate_dialogue(&parsed.dialogue, &TranslationContext::new(), &parsed_translation.map);
    assert_eq!(translated.nodes[0].body.to_string(), "Unseen line.");
}
