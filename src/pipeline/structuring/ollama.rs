use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::StructuringError;

/// Instruction-following models known to handle the task prompt, best first.
pub const PREFERRED_MODELS: &[&str] = &["llama3.2", "qwen2.5", "mistral", "gemma2", "phi3"];

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pick the installed model to use.
    ///
    /// An explicitly requested model must be installed. Otherwise the first
    /// installed model from [`PREFERRED_MODELS`] wins, then any installed
    /// model at all. Returns the full installed name (with tag).
    pub fn find_best_model(&self, requested: Option<&str>) -> Result<String, StructuringError> {
        let available = self.list_models()?;
        select_model(&available, requested).ok_or(StructuringError::NoModelAvailable)
    }

    /// Ask Ollama to load the model into memory so the first real request
    /// does not pay the load cost.
    pub fn warm_up(&self, model: &str) -> Result<(), StructuringError> {
        self.generate(model, "", "").map(|_| ())
    }

    fn map_send_error(&self, e: reqwest::Error) -> StructuringError {
        if e.is_connect() {
            StructuringError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            StructuringError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            StructuringError::HttpClient(e.to_string())
        }
    }
}

/// Model choice over a list of installed model names.
pub(crate) fn select_model(available: &[String], requested: Option<&str>) -> Option<String> {
    if let Some(requested) = requested {
        return available
            .iter()
            .find(|m| m.as_str() == requested || m.starts_with(&format!("{requested}:")))
            .cloned();
    }

    PREFERRED_MODELS
        .iter()
        .find_map(|preferred| available.iter().find(|m| m.starts_with(*preferred)))
        .or_else(|| available.first())
        .cloned()
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Deterministic sampling for extraction.
#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl LlmClient for OllamaClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                num_predict: 512,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn list_models(&self) -> Result<Vec<String>, StructuringError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock LLM client for testing. Returns a configurable response (or a
/// connection failure) and records the last prompt it was given.
pub struct MockLlmClient {
    response: Option<String>,
    available_models: Vec<String>,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            available_models: vec!["llama3.2:latest".to_string()],
            last_prompt: Mutex::new(None),
        }
    }

    /// A client whose every generate call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            response: None,
            ..Self::new("")
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _system: &str,
    ) -> Result<String, StructuringError> {
        *self
            .last_prompt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(prompt.to_string());
        self.response
            .clone()
            .ok_or_else(|| StructuringError::OllamaConnection("mock".into()))
    }

    fn list_models(&self) -> Result<Vec<String>, StructuringError> {
        Ok(self.available_models.clone())
    }
}
