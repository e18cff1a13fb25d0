use std::collections::HashSet;

use super::language_detect::normalize_romanian;
use super::types::Task;

/// Acknowledgements and greetings that are never tasks on their own.
const STOPLIST: &[&str] = &[
    "hi", "hello", "hey", "salut", "thanks", "thank you", "mulțumesc", "ok", "okay", "sure",
    "yes", "no", "da", "nu",
];

/// True for fragments that cannot stand as a task.
pub fn is_noise(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < 3 {
        return true;
    }

    let key = normalize_romanian(trimmed);
    let key = key.trim_end_matches(['!', '.', '?', ',']).trim();
    STOPLIST.contains(&key)
}

/// Drop later tasks whose text repeats an earlier one (case-insensitive).
pub fn dedup_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.text.trim().to_lowercase()))
        .collect()
}

/// Trim task texts, drop noise, then dedup.
pub fn clean_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let kept = tasks
        .into_iter()
        .filter_map(|mut task| {
            let trimmed = task.text.trim();
            if trimmed.len() != task.text.len() {
                task.text = trimmed.to_string();
            }
            (!is_noise(&task.text)).then_some(task)
        })
        .collect();
    dedup_tasks(kept)
}
