/*!
 * Offline fallback translation.
 *
 * Used once every backend has failed for a chunk. A handful of common
 * English words and phrases are substituted for Spanish, French and German;
 * any other pair is returned with an "unavailable" marker.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::language_utils::detect_language;

/// Prefix added to text that could not be translated at all
pub const UNAVAILABLE_MARKER: &str = "[Translation unavailable] ";

const EN_ES: &[(&str, &str)] = &[
    ("hello", "hola"),
    ("goodbye", "adiós"),
    ("thank you", "gracias"),
    ("please", "por favor"),
    ("yes", "sí"),
    ("no", "no"),
    ("the", "el/la"),
    ("and", "y"),
    ("or", "o"),
    ("but", "pero"),
    ("with", "con"),
    ("without", "sin"),
];

const EN_FR: &[(&str, &str)] = &[
    ("hello", "bonjour"),
    ("goodbye", "au revoir"),
    ("thank you", "merci"),
    ("please", "s'il vous plaît"),
    ("yes", "oui"),
    ("no", "non"),
    ("the", "le/la"),
    ("and", "et"),
    ("or", "ou"),
    ("but", "mais"),
    ("with", "avec"),
    ("without", "sans"),
];

const EN_DE: &[(&str, &str)] = &[
    ("hello", "hallo"),
    ("goodbye", "auf wiedersehen"),
    ("thank you", "danke"),
    ("please", "bitte"),
    ("yes", "ja"),
    ("no", "nein"),
    ("the", "der/die/das"),
    ("and", "und"),
    ("or", "oder"),
    ("but", "aber"),
    ("with", "mit"),
    ("without", "ohne"),
];

/// One language pair's dictionary and its matcher
struct Dictionary {
    pattern: Regex,
    words: HashMap<&'static str, &'static str>,
}

impl Dictionary {
    fn build(entries: &'static [(&'static str, &'static str)]) -> Option<Self> {
        let mut keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        // longest first so phrases win over the words they contain
        keys.sort_by(|a, b| b.len().cmp(&a.len()));

        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)) {
            Ok(pattern) => Some(Self {
                pattern,
                words: entries.iter().copied().collect(),
            }),
            Err(e) => {
                log::error!("Invalid fallback dictionary pattern: {}", e);
                None
            }
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let matched = &caps[0];
                self.words
                    .get(matched.to_lowercase().as_str())
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| matched.to_string())
            })
            .into_owned()
    }
}

static DICTIONARIES: Lazy<HashMap<&'static str, Dictionary>> = Lazy::new(|| {
    [("en-es", EN_ES), ("en-fr", EN_FR), ("en-de", EN_DE)]
        .into_iter()
        .filter_map(|(pair, entries)| Dictionary::build(entries).map(|d| (pair, d)))
        .collect()
});

/// Whether an offline dictionary exists for the pair
pub fn has_dictionary(source_language: &str, target_language: &str) -> bool {
    DICTIONARIES.contains_key(format!("{}-{}", source_language, target_language).as_str())
}

/// Translate `text` with the offline dictionaries
///
/// A source of `auto` is resolved with the language detector first. Unknown
/// words are left as they are.
pub fn translate(text: &str, source_language: &str, target_language: &str) -> String {
    let source = if source_language == "auto" {
        detect_language(text)
    } else {
        source_language.to_string()
    };

    let pair = format!("{}-{}", source, target_language);
    match DICTIONARIES.get(pair.as_str()) {
        Some(dictionary) => dictionary.apply(text),
        None => format!("{}{}", UNAVAILABLE_MARKER, text),
    }
}
