//! Rule-based task extraction: the tier that always produces a result.

use chrono::NaiveDate;

use super::categorize::categorize;
use super::dates::DateNormalizer;
use super::filter::{dedup_tasks, is_noise};
use super::greeting::is_greeting;
use super::language_detect::normalize_romanian;
use super::patterns::{extract_fields, ClauseMode};
use super::segment::segment;
use super::types::{Category, Task};

/// Extract tasks using the local calendar day as the date reference.
pub fn extract_tasks_deterministic(text: &str) -> Vec<Task> {
    extract_with(text, &DateNormalizer::for_today())
}

/// Extract tasks with relative dates resolved against `today`.
pub fn extract_tasks_on(text: &str, today: NaiveDate) -> Vec<Task> {
    extract_with(text, &DateNormalizer::new(today))
}

pub(crate) fn extract_with(text: &str, normalizer: &DateNormalizer) -> Vec<Task> {
    if is_greeting(text) {
        tracing::debug!("Input is a greeting, no tasks");
        return Vec::new();
    }

    let segmentation = segment(text);
    let mode = if segmentation.keep_whole {
        ClauseMode::WholeRomanian
    } else {
        ClauseMode::Standard
    };

    let tasks: Vec<Task> = segmentation
        .clauses
        .iter()
        .filter(|clause| !is_noise(clause))
        .filter_map(|clause| {
            let fields = extract_fields(clause, normalizer, mode);
            if is_noise(&fields.text) {
                return None;
            }
            let category = categorize_clause(&fields.text, mode);
            Some(
                Task::new(fields.text)
                    .with_time(fields.time)
                    .with_deadline(fields.deadline)
                    .with_category(Some(category.as_str().to_string())),
            )
        })
        .collect();

    let tasks = dedup_tasks(tasks);
    tracing::debug!(
        clauses = segmentation.clauses.len(),
        tasks = tasks.len(),
        keep_whole = segmentation.keep_whole,
        "Deterministic extraction complete"
    );
    tasks
}

/// A whole Romanian clause that mentions a shop is a shopping errand even
/// when it also names family members ("duc copiii la magazin").
fn categorize_clause(text: &str, mode: ClauseMode) -> Category {
    if mode == ClauseMode::WholeRomanian && normalize_romanian(text).contains("magazin") {
        return Category::Shopping;
    }
    categorize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monday 2026-10-19.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn multi_clause_note() {
        let tasks = extract_tasks_on(
            "Buy bread at 6pm. Finish report by friday\n• Dentist 15/11",
            today(),
        );
        assert_eq!(tasks.len(), 3);

        assert_eq!(tasks[0].text, "Buy bread");
        assert_eq!(tasks[0].time.as_deref(), Some("6pm"));
        assert_eq!(tasks[0].category.as_deref(), Some("Shopping"));

        assert_eq!(tasks[1].text, "Finish report");
        assert_eq!(tasks[1].deadline.as_deref(), Some("2026-10-23"));
        assert_eq!(tasks[1].category.as_deref(), Some("Work"));

        assert_eq!(tasks[2].text, "Dentist 15/11");
        assert_eq!(tasks[2].deadline.as_deref(), Some("2026-11-15"));
        assert_eq!(tasks[2].category.as_deref(), Some("Health"));
    }

    #[test]
    fn romanian_single_clause_is_one_task() {
        let tasks = extract_tasks_on("Trebuie să duc copiii la școală mâine la 8:00", today());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Trebuie să duc copiii la școală mâine la 8:00");
        assert_eq!(tasks[0].time.as_deref(), Some("8:00"));
        assert_eq!(tasks[0].deadline.as_deref(), Some("2026-10-20"));
        assert_eq!(tasks[0].category.as_deref(), Some("Family"));
    }

    #[test]
    fn romanian_shop_errand_is_shopping() {
        let tasks = extract_tasks_on("Mâine duc copiii la magazin", today());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category.as_deref(), Some("Shopping"));
    }

    #[test]
    fn noise_clauses_are_dropped() {
        let tasks = extract_tasks_on("ok. Call the bank. thanks!", today());
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Call the bank"]);
    }

    #[test]
    fn clause_reduced_to_noise_is_dropped() {
        // Only the prefixed time remains after stripping.
        assert!(extract_tasks_on("at 5pm", today()).is_empty());
    }

    #[test]
    fn uncategorized_clause_is_general() {
        let tasks = extract_tasks_on("water the plants", today());
        assert_eq!(tasks[0].category.as_deref(), Some("General"));
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert!(extract_tasks_on("   \n\t ", today()).is_empty());
    }
}
