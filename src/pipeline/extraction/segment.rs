use std::sync::LazyLock;

use regex::Regex;

use super::patterns::mentions_romanian_date;

const BULLETS: &[char] = &['•', '◦', '▪', '‣', '●', '·'];

/// Romanian task-intent markers, matched on word boundaries.
static ROMANIAN_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:trebuie|ar trebui|va trebui|vreau|voi|o s[ăa]|s[ăa]|am nevoie|am de|programare|programat|m[ăa] duc|duc|merg)\b",
    )
    .unwrap()
});

/// Candidate clauses of one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segmentation {
    pub clauses: Vec<String>,
    /// Single Romanian clause that must not be decomposed further.
    pub keep_whole: bool,
}

/// Split input into candidate clauses on `.`, newlines, `;` and bullets.
///
/// A `.` between two digits ("10.30", "15.03.2026") is not a delimiter.
pub fn segment(text: &str) -> Segmentation {
    let clauses: Vec<String> = split_clauses(text)
        .into_iter()
        .map(trim_clause)
        .filter(|clause| !clause.is_empty())
        .map(str::to_string)
        .collect();

    let keep_whole = clauses.len() == 1 && is_romanian_task(&clauses[0]);
    Segmentation { clauses, keep_whole }
}

/// True when a clause carries a Romanian intent marker or relative date.
pub fn is_romanian_task(clause: &str) -> bool {
    ROMANIAN_INTENT.is_match(clause) || mentions_romanian_date(clause)
}

fn split_clauses(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    for (i, &(offset, ch)) in chars.iter().enumerate() {
        let is_delimiter = match ch {
            '\n' | '\r' | ';' => true,
            '.' => {
                let prev_digit = i > 0 && chars[i - 1].1.is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            c => BULLETS.contains(&c),
        };
        if is_delimiter {
            parts.push(&text[start..offset]);
            start = offset + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn trim_clause(raw: &str) -> &str {
    raw.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '–' | '—' | '*') || BULLETS.contains(&c)
    })
}
