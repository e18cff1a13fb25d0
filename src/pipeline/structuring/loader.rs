use std::sync::Arc;

use super::lifecycle::LoadedModel;
use super::ollama::OllamaClient;
use super::StructuringError;
use crate::config::EngineConfig;

/// Acquires the generation capability. Runs on the background load thread.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<LoadedModel, StructuringError>;
}

/// Loads a model served by a local Ollama instance: connect, pick the
/// model, and warm it up.
pub struct OllamaLoader {
    base_url: String,
    requested_model: Option<String>,
    timeout_secs: u64,
}

impl OllamaLoader {
    pub fn new(base_url: &str, requested_model: Option<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            requested_model,
            timeout_secs,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            &config.ollama_url,
            config.model_name.clone(),
            config.request_timeout_secs,
        )
    }
}

impl ModelLoader for OllamaLoader {
    fn load(&self) -> Result<LoadedModel, StructuringError> {
        let client = OllamaClient::new(&self.base_url, self.timeout_secs)?;
        let model_name = client.find_best_model(self.requested_model.as_deref())?;
        tracing::info!(model = %model_name, url = %client.base_url(), "Selected task model");

        client.warm_up(&model_name)?;

        Ok(LoadedModel {
            client: Arc::new(client),
            model_name,
        })
    }
}
