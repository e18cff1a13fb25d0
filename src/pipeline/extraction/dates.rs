use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use regex::Regex;

use super::language_detect::fold_ascii;

/// Converts relative and loosely formatted date tokens into ISO dates
/// relative to a fixed reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    today: NaiveDate,
}

impl DateNormalizer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Normalizer anchored on the local calendar day.
    pub fn for_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Normalize a date token to `YYYY-MM-DD`, or return the trimmed token
    /// unchanged when it is not recognized.
    pub fn normalize(&self, token: &str) -> String {
        match self.resolve(token) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => token.trim().to_string(),
        }
    }

    /// Resolve a token to a calendar date.
    ///
    /// A bare weekday resolves to the next occurrence counting today
    /// ("friday" on a Friday is today); "next <weekday>" is strictly after
    /// today.
    pub fn resolve(&self, token: &str) -> Option<NaiveDate> {
        let key = fold_ascii(token)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if key.is_empty() {
            return None;
        }

        match key.as_str() {
            "today" | "azi" | "astazi" => return Some(self.today),
            "tomorrow" | "maine" => return self.today.checked_add_signed(Duration::days(1)),
            "day after tomorrow" | "poimaine" => {
                return self.today.checked_add_signed(Duration::days(2))
            }
            "next week" | "next saptamana" | "saptamana viitoare" => {
                return self.today.checked_add_signed(Duration::days(7))
            }
            "next month" | "luna viitoare" => return self.today.checked_add_months(Months::new(1)),
            _ => {}
        }

        if let Some(day) = key.strip_prefix("next ") {
            return weekday_from_name(day.trim()).map(|wd| self.next_weekday(wd, false));
        }

        if let Some(weekday) = weekday_from_name(&key) {
            return Some(self.next_weekday(weekday, true));
        }

        self.parse_absolute(&key)
    }

    fn next_weekday(&self, target: Weekday, include_today: bool) -> NaiveDate {
        let current = self.today.weekday().num_days_from_monday() as i64;
        let wanted = target.num_days_from_monday() as i64;
        let mut days_ahead = (wanted - current).rem_euclid(7);
        if days_ahead == 0 && !include_today {
            days_ahead = 7;
        }
        self.today + Duration::days(days_ahead)
    }

    fn parse_absolute(&self, key: &str) -> Option<NaiveDate> {
        if let Some(caps) = ISO_DATE.captures(key) {
            return NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            );
        }

        if let Some(caps) = NUMERIC_DATE.captures(key) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            return match caps.get(3) {
                Some(year) => NaiveDate::from_ymd_opt(expand_year(year.as_str())?, month, day),
                None => self.upcoming(month, day),
            };
        }

        if let Some(caps) = TEXTUAL_DATE.captures(key) {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_from_name(&caps[2])?;
            return match caps.get(3) {
                Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
                None => self.upcoming(month, day),
            };
        }

        None
    }

    /// First valid `month/day` on or after today (covers Feb 29).
    fn upcoming(&self, month: u32, day: u32) -> Option<NaiveDate> {
        (self.today.year()..=self.today.year() + 4)
            .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
            .find(|date| *date >= self.today)
    }
}

/// Normalize a date token against the local calendar day.
pub fn normalize_date(token: &str) -> String {
    DateNormalizer::for_today().normalize(token)
}

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})(?:[/.\-](\d{2}|\d{4}))?$").unwrap()
});

static TEXTUAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)\.?(?:\s+(\d{4}))?$").unwrap()
});

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + year } else { year })
}

/// Weekday from an English or (ASCII-folded) Romanian name.
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "luni" => Some(Weekday::Mon),
        "tuesday" | "marti" => Some(Weekday::Tue),
        "wednesday" | "miercuri" => Some(Weekday::Wed),
        "thursday" | "joi" => Some(Weekday::Thu),
        "friday" | "vineri" => Some(Weekday::Fri),
        "saturday" | "sambata" => Some(Weekday::Sat),
        "sunday" | "duminica" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Month number from an English or (ASCII-folded) Romanian name or abbreviation.
fn month_from_name(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" | "ianuarie" | "ian" => 1,
        "february" | "feb" | "februarie" => 2,
        "march" | "mar" | "martie" => 3,
        "april" | "apr" | "aprilie" => 4,
        "may" | "mai" => 5,
        "june" | "jun" | "iunie" | "iun" => 6,
        "july" | "jul" | "iulie" | "iul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" | "septembrie" => 9,
        "october" | "oct" | "octombrie" => 10,
        "november" | "nov" | "noiembrie" => 11,
        "december" | "dec" | "decembrie" => 12,
        _ => return None,
    };
    Some(month)
}
