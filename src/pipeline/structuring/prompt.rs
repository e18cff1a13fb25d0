use crate::pipeline::extraction::Language;

pub const TASK_SYSTEM_PROMPT: &str = r#"
You are an expert task extraction engine. You read short personal notes and
turn them into a list of concrete tasks.

RULES:
1. The input may be written in Romanian or English. Keep each task in the
   language it was written in.
2. Each item has exactly these keys: task, time, category, deadline.
3. Use null for any field that is unknown.
4. Ignore greetings, filler, random characters and single letters.
5. Never split a word into letters.
6. If there are no tasks, return [].
"#;

/// Build the user prompt for one note.
pub fn build_task_prompt(text: &str, language: Language, force_structured_output: bool) -> String {
    let language_note = match language {
        Language::Romanian => "The note is most likely written in Romanian.",
        Language::English => "The note is most likely written in English.",
    };

    let format_note = if force_structured_output {
        "Output ONLY a valid JSON array (no markdown, no explanation)."
    } else {
        "Output a JSON array of tasks."
    };

    format!(
        r#"{language_note}
{format_note}
Fields: "task" (short description), "time" (time of day or null),
"category" (Work, Family, Shopping, Health, Finance, Travel, Social, Study, General or null),
"deadline" (date as written or YYYY-MM-DD, or null).

INPUT: {text}

JSON:"#
    )
}
