pub mod types;
pub mod language_detect;
pub mod greeting;
pub mod segment;
pub mod dates;
pub mod patterns;
pub mod categorize;
pub mod filter;
pub mod deterministic;


pub use types::*;
pub use language_detect::{detect_language, Language};
pub use greeting::is_greeting;
pub use segment::{segment, Segmentation};
pub use dates::{normalize_date, DateNormalizer};
pub use categorize::categorize;
pub use filter::{clean_tasks, dedup_tasks, is_noise};
pub use deterministic::{extract_tasks_deterministic, extract_tasks_on};
