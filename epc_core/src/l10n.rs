//! Localized strings.
//!
//! Column names, headers and some cells store a JSON object of language
//! codes, e.g. `{"en":"Month","lv":"Mēnesis"}`. Anything that is not such an
//! object is a literal and passes through unchanged.

use std::collections::BTreeMap;

/// Language codes a localized string may carry.
pub const LANGUAGES: [&str; 6] = ["en", "pl", "ro", "au", "lv", "bg"];

/// Fallback language when the requested one is missing.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Pick the text for `lang` out of a localized string.
///
/// Falls back to English, then to the empty string. Non-JSON input is
/// returned verbatim.
pub fn localize(raw: &str, lang: &str) -> String {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') {
        return raw.to_string();
    }
    match serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
        Ok(map) => map
            .get(lang)
            .or_else(|| map.get(DEFAULT_LANGUAGE))
            .cloned()
            .unwrap_or_default(),
        Err(_) => raw.to_string(),
    }
}

/// Build a localized string from `(language, text)` pairs.
pub fn localized(pairs: &[(&str, &str)]) -> String {
    let map: BTreeMap<&str, &str> = pairs.iter().copied().collect();
    serde_json::to_string(&map).unwrap_or_default()
}

/// Localized string with the same text in every language.
pub fn everywhere(text: &str) -> String {
    let pairs: Vec<(&str, &str)> = LANGUAGES.iter().map(|lang| (*lang, text)).collect();
    localized(&pairs)
}
