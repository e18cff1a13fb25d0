use serde::{Deserialize, Serialize};

use super::lifecycle::ModelState;
use super::StructuringError;
use crate::pipeline::extraction::Task;

/// Ollama LLM client abstraction (allows mocking)
pub trait LlmClient: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError>;

    fn list_models(&self) -> Result<Vec<String>, StructuringError>;
}

/// Caller options for [`ModelOrchestrator::process_text`](super::ModelOrchestrator::process_text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractOptions {
    /// "ro", "en", ... Detected from the text when absent or unknown.
    #[serde(default, alias = "lang")]
    pub language_hint: Option<String>,
    /// Ask the model for a bare JSON array with no surrounding prose.
    #[serde(default = "default_force_structured", alias = "forceJson")]
    pub force_structured_output: bool,
}

fn default_force_structured() -> bool {
    true
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            language_hint: None,
            force_structured_output: true,
        }
    }
}

/// Which tier produced the tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Model,
    RegexFallback,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::RegexFallback => "regex_fallback",
        }
    }
}

/// Outcome of one extraction call, returned verbatim to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub tasks: Vec<Task>,
    pub method: Method,
    pub model_state: ModelState,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_structured_output() {
        let opts = ExtractOptions::default();
        assert!(opts.force_structured_output);
        assert!(opts.language_hint.is_none());
    }

    #[test]
    fn options_accept_wire_aliases() {
        let opts: ExtractOptions =
            serde_json::from_str(r#"{"lang": "en", "forceJson": false}"#).unwrap();
        assert_eq!(opts.language_hint.as_deref(), Some("en"));
        assert!(!opts.force_structured_output);

        let opts: ExtractOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.force_structured_output);
    }

    #[test]
    fn result_serializes_wire_shape() {
        let result = ExtractionResult {
            tasks: vec![Task::new("Buy milk")],
            method: Method::RegexFallback,
            model_state: ModelState::NotLoaded,
            message: Some("Using simplified parsing".into()),
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["method"], "regex_fallback");
        assert_eq!(json["model_state"], "not_loaded");
        assert_eq!(json["tasks"][0]["task"], "Buy milk");
        assert!(json["error"].is_null());
    }

    #[test]
    fn method_labels() {
        assert_eq!(Method::Model.as_str(), "model");
        assert_eq!(Method::RegexFallback.as_str(), "regex_fallback");
    }
}
