//! Lightweight language detection for task notes.
//!
//! Detects Romanian vs English using keyword frequency and diacritics.
//! Detection is implicit: nothing in the extraction tier branches on an
//! explicit language tag, but the model prompt carries the detected hint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Romanian,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Romanian => "ro",
        }
    }

    /// Parse a caller-supplied hint ("ro", "en", "romanian", "english", "ro-RO").
    pub fn from_hint(hint: &str) -> Option<Self> {
        let lower = hint.trim().to_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "ro" | "ron" | "rum" | "romanian" | "română" | "romana" => Some(Self::Romanian),
            "en" | "eng" | "english" => Some(Self::English),
            _ => None,
        }
    }
}

const ROMANIAN_INDICATORS: &[&str] = &[
    " și ", " si ", " să ", " sa ", " la ", " pe ", " cu ", " de ", " din ", " pentru ",
    " trebuie", " vreau", " voi ", " am ", " mâine", " maine", " azi", " astăzi",
    " mama", " copii", " factura", " magazin", " cumpăr", " programare", " întâlnire",
];

const ENGLISH_INDICATORS: &[&str] = &[
    " the ", " and ", " to ", " for ", " with ", " on ", " at ", " by ", " my ",
    " need ", " must ", " should ", " will ", " have ", " tomorrow", " today",
    " buy ", " call ", " meeting", " finish", " pay ",
];

/// Detect the primary language of a note.
///
/// Romanian wins ties and is assumed for very short input.
pub fn detect_language(text: &str) -> Language {
    if text.trim().chars().count() < 8 {
        return Language::Romanian;
    }

    // Pad so indicators with surrounding spaces also hit the first/last word.
    let padded = format!(" {} ", normalize_romanian(text));

    let romanian_score =
        count_indicators(&padded, ROMANIAN_INDICATORS) + count_romanian_diacritics(&padded);
    let english_score = count_indicators(&padded, ENGLISH_INDICATORS);

    if romanian_score >= english_score {
        Language::Romanian
    } else {
        Language::English
    }
}

fn count_indicators(lower_text: &str, indicators: &[&str]) -> u32 {
    indicators
        .iter()
        .map(|indicator| lower_text.matches(indicator).count() as u32)
        .sum()
}

/// Each Romanian-only letter is one point.
fn count_romanian_diacritics(lower_text: &str) -> u32 {
    lower_text
        .chars()
        .filter(|ch| matches!(ch, 'ă' | 'â' | 'î' | 'ș' | 'ț'))
        .count() as u32
}

/// Lowercase and unify the cedilla forms (ş, ţ) with the comma-below forms
/// (ș, ț) so keyword tables only need one spelling.
pub fn normalize_romanian(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'ş' => 'ș',
            'ţ' => 'ț',
            other => other,
        })
        .collect()
}

/// Lowercase and strip Romanian diacritics (ă â → a, î → i, ș ş → s, ț ţ → t).
pub fn fold_ascii(text: &str) -> String {
    normalize_romanian(text)
        .chars()
        .map(|ch| match ch {
            'ă' | 'â' => 'a',
            'î' => 'i',
            'ș' => 's',
            'ț' => 't',
            other => other,
        })
        .collect()
}
