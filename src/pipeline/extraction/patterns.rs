//! Time and deadline extraction from a single clause.
//!
//! Each tier is an ordered list of rules evaluated top to bottom; the first
//! rule with an acceptable match wins. Prefixed forms ("at 5pm", "by friday")
//! come before bare forms and are consumed out of the task text; bare forms
//! are recorded but left in place.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::dates::DateNormalizer;

const EN_WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const RO_WEEKDAYS: &str = "luni|mar[țţt]i|miercuri|joi|vineri|s[âa]mb[ăa]t[ăa]|duminic[ăa]";
const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|\
november|december|ianuarie|februarie|martie|aprilie|mai|iunie|iulie|septembrie|octombrie|\
noiembrie|decembrie|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec|ian|iun|iul";

fn relative_dates() -> String {
    let mut alternation =
        String::from(r"day\s+after\s+tomorrow|tomorrow|today|poim[âa]ine|m[âa]ine|ast[ăa]zi|azi");
    alternation.push_str(r"|s[ăa]pt[ăa]m[âa]na\s+viitoare|luna\s+viitoare");
    alternation.push_str(&format!(
        r"|next\s+(?:week|month|s[ăa]pt[ăa]m[âa]n[ăa]|{EN_WEEKDAYS}|{RO_WEEKDAYS})"
    ));
    alternation.push_str(&format!("|{EN_WEEKDAYS}|{RO_WEEKDAYS}"));
    alternation
}

fn absolute_dates() -> String {
    let mut alternation = String::from(r"\d{4}-\d{1,2}-\d{1,2}");
    alternation.push_str(r"|\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{2,4})?");
    alternation.push_str(r"|\d{1,2}\.\d{1,2}\.\d{2,4}");
    alternation.push_str(&format!(
        r"|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})(?:\s+\d{{4}})?"
    ));
    alternation
}

/// A clock value: `hh:mm`, `hh.mm` or an hour with am/pm. A bare number is
/// never a time on its own.
const TIME_VALUE: &str = r"\d{1,2}[:.]\d{2}(?:\s*(?:am|pm))?|\d{1,2}\s*(?:am|pm)";

/// A compiled extraction pattern. Capture group 1 holds the value.
struct ExtractionRule {
    name: &'static str,
    regex: Regex,
    /// Remove the whole match from the task text when it is used.
    consume: bool,
}

fn rule(name: &'static str, regex_str: &str, consume: bool) -> ExtractionRule {
    ExtractionRule {
        name,
        regex: Regex::new(regex_str).expect("Invalid extraction regex pattern"),
        consume,
    }
}

fn prefixed_time_rule() -> ExtractionRule {
    rule(
        "prefixed_time",
        &format!(r"(?i)(?:\b(?:la\s+ora|ora|at|la)\s+|@\s*)({TIME_VALUE})\b"),
        true,
    )
}

/// "la ora 5": the Romanian word for "hour" makes a bare number a time.
fn romanian_hour_rule() -> ExtractionRule {
    rule("romanian_hour", r"(?i)\b(?:la\s+)?ora\s+(\d{1,2})\b", true)
}

fn bare_time_rule() -> ExtractionRule {
    rule("bare_time", &format!(r"(?i)\b({TIME_VALUE})\b"), false)
}

fn prefixed_deadline_rule() -> ExtractionRule {
    rule(
        "prefixed_deadline",
        &format!(
            r"(?i)\b(?:by|until|till|before|due(?:\s+(?:on|by))?|deadline(?:\s*:|\s+(?:on|is))?|p[âa]n[ăa]\s+(?:la|pe|[îi]n)|[îi]nainte\s+de)\s+({}|{})\b",
            absolute_dates(),
            relative_dates()
        ),
        true,
    )
}

fn absolute_date_rule() -> ExtractionRule {
    rule("absolute_date", &format!(r"(?i)\b({})\b", absolute_dates()), false)
}

fn relative_date_rule() -> ExtractionRule {
    rule("relative_date", &format!(r"(?i)\b({})\b", relative_dates()), false)
}

static TIME_RULES: LazyLock<Vec<ExtractionRule>> =
    LazyLock::new(|| vec![prefixed_time_rule(), romanian_hour_rule(), bare_time_rule()]);

static DEADLINE_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        prefixed_deadline_rule(),
        absolute_date_rule(),
        relative_date_rule(),
    ]
});

/// Romanian single-clause inputs prefer the Romanian relative words.
static ROMANIAN_DEADLINE_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        rule("ro_tomorrow", r"(?i)\b(poim[âa]ine|m[âa]ine)\b", false),
        rule("ro_today", r"(?i)\b(ast[ăa]zi|azi)\b", false),
        rule("ro_weekday", &format!(r"(?i)\b({RO_WEEKDAYS})\b"), false),
        prefixed_deadline_rule(),
        absolute_date_rule(),
        relative_date_rule(),
    ]
});

static ROMANIAN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:poim[âa]ine|m[âa]ine|ast[ăa]zi|azi|s[ăa]pt[ăa]m[âa]na\s+viitoare|luna\s+viitoare|{RO_WEEKDAYS})\b"
    ))
    .unwrap()
});

/// Text right after a number that turns it into a date ("5 martie", "15.03").
static DATE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:[/.\-]\d|(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})\b)"
    ))
    .unwrap()
});

/// How a clause is treated by [`extract_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseMode {
    /// Prefixed matches are stripped from the description.
    Standard,
    /// Whole-input Romanian clause: nothing is stripped and Romanian
    /// relative dates win the deadline.
    WholeRomanian,
}

/// Time, deadline and residual description of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseFields {
    pub text: String,
    pub time: Option<String>,
    pub deadline: Option<String>,
}

struct RuleMatch {
    rule: &'static str,
    value: String,
    span: Range<usize>,
    consume: bool,
}

/// Extract time and deadline from a clause, normalizing the deadline.
pub fn extract_fields(clause: &str, normalizer: &DateNormalizer, mode: ClauseMode) -> ClauseFields {
    let strip = mode == ClauseMode::Standard;
    let mut text = clause.to_string();

    let time = first_match(TIME_RULES.as_slice(), &text, is_plausible_time).map(|m| {
        tracing::trace!(rule = m.rule, "time matched");
        if strip && m.consume {
            text.replace_range(m.span, " ");
        }
        m.value
    });

    let deadline_rules: &[ExtractionRule] = match mode {
        ClauseMode::Standard => DEADLINE_RULES.as_slice(),
        ClauseMode::WholeRomanian => ROMANIAN_DEADLINE_RULES.as_slice(),
    };
    let deadline = first_match(deadline_rules, &text, |_, _| true).map(|m| {
        tracing::trace!(rule = m.rule, "deadline matched");
        if strip && m.consume {
            text.replace_range(m.span, " ");
        }
        normalizer.normalize(&m.value)
    });

    ClauseFields {
        text: collapse_whitespace(&text),
        time,
        deadline,
    }
}

fn first_match(
    rules: &[ExtractionRule],
    text: &str,
    accept: impl Fn(&str, &regex::Captures<'_>) -> bool,
) -> Option<RuleMatch> {
    rules.iter().find_map(|rule| {
        rule.regex
            .captures_iter(text)
            .find(|caps| accept(text, caps))
            .and_then(|caps| {
                let whole = caps.get(0)?;
                let value = caps.get(1)?;
                Some(RuleMatch {
                    rule: rule.name,
                    value: value.as_str().trim().to_string(),
                    span: whole.range(),
                    consume: rule.consume,
                })
            })
    })
}

/// Rejects numbers that belong to a date and out-of-range clock values.
fn is_plausible_time(text: &str, caps: &regex::Captures<'_>) -> bool {
    let Some(value) = caps.get(1) else {
        return false;
    };

    if DATE_CONTINUATION.is_match(&text[value.end()..]) {
        return false;
    }
    let before: Vec<char> = text[..value.start()].chars().rev().take(2).collect();
    if let [sep, digit] = before.as_slice() {
        if matches!(sep, '/' | '.' | '-') && digit.is_ascii_digit() {
            return false;
        }
    }

    is_valid_clock(value.as_str())
}

fn is_valid_clock(value: &str) -> bool {
    let lower = value.to_lowercase();
    let meridiem = lower.ends_with("am") || lower.ends_with("pm");
    let digits = lower.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace());

    let mut parts = digits.split([':', '.']);
    let hour: u32 = match parts.next().and_then(|h| h.parse().ok()) {
        Some(h) => h,
        None => return false,
    };
    let minute: u32 = match parts.next() {
        Some(m) => match m.parse() {
            Ok(m) => m,
            Err(_) => return false,
        },
        None => 0,
    };

    let hour_ok = if meridiem { (1..=12).contains(&hour) } else { hour <= 23 };
    hour_ok && minute <= 59
}

/// True when the text carries any time, date, relative-date or weekday token.
pub fn mentions_date_or_time(text: &str) -> bool {
    TIME_RULES
        .iter()
        .chain(DEADLINE_RULES.iter())
        .any(|rule| rule.regex.is_match(text))
}

/// True when the text carries a Romanian relative date or weekday.
pub fn mentions_romanian_date(text: &str) -> bool {
    ROMANIAN_DATE.is_match(text)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
