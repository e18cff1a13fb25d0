use std::env;

/// Application-level constants
pub const APP_NAME: &str = "TaskSync";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "tasksync_lib=info,tasksync=info"
}

/// Runtime configuration for the extraction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Base URL of the local Ollama instance.
    pub ollama_url: String,
    /// Model to load. `None` picks the first preferred model the server has.
    pub model_name: Option<String>,
    /// Timeout for a single model call. Expiry falls back to the rule engine.
    pub request_timeout_secs: u64,
    /// Trigger a model load as soon as the engine starts.
    pub autoload: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model_name: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            autoload: false,
        }
    }
}

impl EngineConfig {
    /// Build from `TASKSYNC_*` environment variables, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("TASKSYNC_OLLAMA_URL").filter(|v| !v.trim().is_empty()) {
            config.ollama_url = url.trim().to_string();
        }

        config.model_name = lookup("TASKSYNC_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if let Some(raw) = lookup("TASKSYNC_MODEL_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
                _ => tracing::warn!(
                    value = %raw,
                    default = DEFAULT_REQUEST_TIMEOUT_SECS,
                    "Invalid TASKSYNC_MODEL_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(raw) = lookup("TASKSYNC_AUTOLOAD") {
            match parse_flag(&raw) {
                Some(flag) => config.autoload = flag,
                None => tracing::warn!(value = %raw, "Invalid TASKSYNC_AUTOLOAD, using default"),
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
