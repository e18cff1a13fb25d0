pub mod types;
pub mod prompt;
pub mod parser;
pub mod ollama;
pub mod loader;
pub mod lifecycle;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use ollama::*;
pub use loader::*;
pub use lifecycle::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("No compatible task model installed in Ollama")]
    NoModelAvailable,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("No JSON array found in model output")]
    NoJsonArray,

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Model is not ready (state: {0})")]
    NotReady(ModelState),

    #[error("Model load failed: {0}")]
    LoadFailed(String),
}
