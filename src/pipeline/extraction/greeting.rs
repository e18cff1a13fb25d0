use std::sync::LazyLock;

use regex::Regex;

use super::patterns::mentions_date_or_time;

/// Longest input (in words) that can still be a greeting with small talk.
const MAX_GREETING_WORDS: usize = 10;

const GREETINGS: &str = "hello there|hi there|hey there|hello|hi|hey|good morning|good afternoon|\
good evening|greetings|salutare|salut|bun[ăa] ziua|bun[ăa] diminea[țţt]a|bun[ăa] seara|bun[ăa]|\
ce mai faci|ce faci|how are you doing|how are you|how's it going|what's up";

const SMALL_TALK: &str = "how are you doing|how are you|how's it going|what's up|ce mai faci|\
ce faci|cum e|cum e[șşs]ti|cum te sim[țţt]i";

/// Whole input is a greeting, optionally followed by small talk.
static PURE_GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?:{GREETINGS})(?:[\s,]+(?:all|everyone|team|guys|toat[ăa] lumea))?[\s.,!?]*(?:(?:{SMALL_TALK})[\s.,!?]*)?$"
    ))
    .unwrap()
});

static GREETING_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:hello|hi|hey|morning|afternoon|evening|greetings|salut|salutare|buna|bună|ziua|diminea[țţ]a|dimineata|seara)\b",
    )
    .unwrap()
});

static TASK_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:need|must|should|have to|want|will|trebuie|vreau|voi|am de|s[ăa]|m[âa]ine|today|tomorrow|azi|ast[ăa]zi)\b",
    )
    .unwrap()
});

/// True when the whole input is a greeting with no task content.
///
/// Short inputs count as greetings when they contain a greeting word but
/// no intent keyword and no date, time or weekday token.
pub fn is_greeting(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < 2 {
        return false;
    }

    if PURE_GREETING.is_match(text) {
        return true;
    }

    text.split_whitespace().count() <= MAX_GREETING_WORDS
        && GREETING_WORD.is_match(text)
        && !TASK_INTENT.is_match(text)
        && !mentions_date_or_time(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_greetings() {
        for text in [
            "Hello",
            "hi!",
            "Hey there",
            "Good morning!",
            "Salut",
            "Bună ziua",
            "buna dimineata",
            "Hello, how are you?",
            "Salut, ce mai faci?",
            "hi everyone!!",
        ] {
            assert!(is_greeting(text), "expected greeting: {text}");
        }
    }

    #[test]
    fn hello_there_is_a_greeting() {
        assert!(is_greeting("Hello there!"));
    }

    #[test]
    fn short_greeting_with_small_talk() {
        assert!(is_greeting("Hey, hope you had a lovely morning"));
        assert!(is_greeting("Salut! Sper că ești bine"));
    }

    #[test]
    fn intent_keywords_break_greeting() {
        assert!(!is_greeting("Hello! I need to finish my report"));
        assert!(!is_greeting("Salut, trebuie să sun la bancă"));
        assert!(!is_greeting("Hi, I will call you"));
    }

    #[test]
    fn dates_and_times_break_greeting() {
        assert!(!is_greeting("Hi, dentist on friday"));
        assert!(!is_greeting("Hey, gym at 6pm"));
        assert!(!is_greeting("Good morning, meeting 10:30"));
    }

    #[test]
    fn greeting_words_are_matched_as_words() {
        // "hi" inside "this"/"nothing" is not a greeting.
        assert!(!is_greeting("this is nothing"));
    }

    #[test]
    fn long_text_is_not_a_greeting() {
        let text = "hello hello hello hello hello hello hello hello hello hello hello";
        assert!(!is_greeting(text));
    }

    #[test]
    fn empty_and_tiny_input() {
        assert!(!is_greeting(""));
        assert!(!is_greeting("h"));
    }

    #[test]
    fn task_without_greeting() {
        assert!(!is_greeting("Buy milk"));
    }
}
