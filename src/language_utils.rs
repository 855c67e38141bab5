use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities
///
/// This module provides the table of languages offered to users, ISO code
/// validation and normalization, and a lightweight pattern-based detector
/// for the language of a text sample.
/// Languages offered for selection, in display order
static SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("auto", "Auto-detect"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("tr", "Turkish"),
    ("pl", "Polish"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
];

/// Detection patterns, scored in this order
static DETECTION_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("en", r"\b(the|and|for|are|but|not|you|all|can|her|was|one|our|had|day)\b"),
        ("es", r"\b(que|con|una|para|son|por|como|pero|sus|las|los|del|muy)\b"),
        ("fr", r"\b(que|des|les|une|dans|est|pour|qui|sur|avec|son|être)\b"),
        ("de", r"\b(der|die|und|den|das|von|ist|mit|dem|des|auf|ein)\b"),
        ("it", r"\b(che|con|una|per|sono|come|della|anche|dalla|questa)\b"),
        ("pt", r"\b(que|com|uma|para|são|como|pela|esta|seus)\b"),
        ("ru", r"[а-я]{3,}"),
        ("ja", r"[\x{3040}-\x{30ff}]"),
        ("ko", r"[ㄱ-ㅎㅏ-ㅣ가-힣]"),
        ("zh", r"[\x{4e00}-\x{9fff}]"),
        ("ar", r"[\x{0600}-\x{06ff}]"),
    ]
    .into_iter()
    .filter_map(|(code, pattern)| match Regex::new(pattern) {
        Ok(regex) => Some((code, regex)),
        Err(e) => {
            log::error!("Invalid detection pattern for {}: {}", code, e);
            None
        }
    })
    .collect()
});

/// Number of characters inspected by the detector
const DETECTION_SAMPLE_CHARS: usize = 1000;

/// Minimum match count required to trust a detection
const DETECTION_THRESHOLD: usize = 3;

/// Returns the supported language table, starting with `auto`
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_LANGUAGES
}

/// Guess the language of `text`
///
/// The lowercased first 1000 characters are scored against each language's
/// pattern; the best score wins if it exceeds 3 matches, otherwise `"auto"`
/// is returned. Ties go to the language scored first.
pub fn detect_language(text: &str) -> String {
    let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect::<String>().to_lowercase();

    let mut best_count = 0;
    let mut best_lang = "auto";

    for (lang, pattern) in DETECTION_PATTERNS.iter() {
        let count = pattern.find_iter(&sample).count();
        if count > best_count {
            best_count = count;
            best_lang = lang;
        }
    }

    if best_count > DETECTION_THRESHOLD {
        best_lang.to_string()
    } else {
        "auto".to_string()
    }
}

/// Map ISO 639-2/B codes to their ISO 639-2/T equivalent
fn bibliographic_to_terminology(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => code,
    }
}

fn lookup(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();
    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(bibliographic_to_terminology(&normalized_code)),
        _ => None,
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
///
/// Backends expect two-letter codes. `auto` is passed through; codes without
/// a two-letter form fall back to ISO 639-2/T.
pub fn normalize_code(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();
    if normalized_code == "auto" {
        return Ok(normalized_code);
    }

    let lang = lookup(&normalized_code)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    Ok(match lang.to_639_1() {
        Some(part1) => part1.to_string(),
        None => lang.to_639_3().to_string(),
    })
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();
    if normalized_code == "auto" {
        return Ok("Auto-detect".to_string());
    }

    if let Some((_, name)) = SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == normalized_code) {
        return Ok(name.to_string());
    }

    let lang = lookup(&normalized_code)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    Ok(lang.to_name().to_string())
}
