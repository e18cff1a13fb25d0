use serde::{Deserialize, Serialize};

/// A single structured task extracted from free-form text.
///
/// `text` is trimmed, whitespace-collapsed and at least three characters long.
/// On the wire the description is named `task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task", alias = "text")]
    pub text: String,
    pub time: Option<String>,
    pub category: Option<String>,
    /// ISO `YYYY-MM-DD` when normalization succeeded, otherwise the raw token.
    pub deadline: Option<String>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            time: None,
            category: None,
            deadline: None,
        }
    }

    pub fn with_time(mut self, time: Option<String>) -> Self {
        self.time = time;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<String>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

/// Domain labels assigned by the categorizer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Family,
    Shopping,
    Health,
    Finance,
    Travel,
    Social,
    Study,
    General,
}

impl Category {
    /// Keyword-table categories in the order they are evaluated.
    pub const PRIORITY: [Category; 8] = [
        Category::Work,
        Category::Family,
        Category::Shopping,
        Category::Health,
        Category::Finance,
        Category::Travel,
        Category::Social,
        Category::Study,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Family => "Family",
            Self::Shopping => "Shopping",
            Self::Health => "Health",
            Self::Finance => "Finance",
            Self::Travel => "Travel",
            Self::Social => "Social",
            Self::Study => "Study",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
