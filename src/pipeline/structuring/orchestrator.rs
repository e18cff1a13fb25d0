use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::NaiveDate;

use super::lifecycle::{ModelLifecycle, ModelState, ModelStatus};
use super::loader::{ModelLoader, OllamaLoader};
use super::parser::parse_model_tasks;
use super::prompt::{build_task_prompt, TASK_SYSTEM_PROMPT};
use super::types::{ExtractOptions, ExtractionResult, Method};
use super::StructuringError;
use crate::config::EngineConfig;
use crate::pipeline::extraction::deterministic::extract_with;
use crate::pipeline::extraction::{detect_language, DateNormalizer, Language, Task};

/// Outcome of the model pass. Only `Extracted` skips the rule engine.
enum ModelAttempt {
    Extracted(Vec<Task>),
    Unavailable(ModelState),
    Failed(StructuringError),
}

/// Owns the model lifecycle and routes each extraction request to the
/// model when it is ready, or to the rule engine otherwise.
///
/// Loading runs on a background thread; `process_text` never waits for it.
pub struct ModelOrchestrator {
    lifecycle: Arc<ModelLifecycle>,
    loader: Arc<dyn ModelLoader>,
    load_thread: Mutex<Option<JoinHandle<()>>>,
    reference_date: Option<NaiveDate>,
}

impl ModelOrchestrator {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            lifecycle: Arc::new(ModelLifecycle::new()),
            loader,
            load_thread: Mutex::new(None),
            reference_date: None,
        }
    }

    /// Orchestrator backed by the Ollama instance named in `config`.
    /// Starts loading right away when `autoload` is set.
    pub fn from_config(config: &EngineConfig) -> Self {
        let orchestrator = Self::new(Arc::new(OllamaLoader::from_config(config)));
        if config.autoload {
            orchestrator.start_loading();
        }
        orchestrator
    }

    /// Resolve relative dates against a fixed day instead of the local date.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }

    pub fn get_status(&self) -> ModelStatus {
        self.lifecycle.status()
    }

    /// Begin loading the model in the background.
    ///
    /// No-op while a load is in flight or after it succeeded. From ERROR a
    /// new attempt is started.
    pub fn start_loading(&self) {
        if !self.lifecycle.begin_loading() {
            tracing::debug!(state = %self.lifecycle.state(), "Model load already started");
            return;
        }

        let lifecycle = Arc::clone(&self.lifecycle);
        let loader = Arc::clone(&self.loader);
        let spawned = thread::Builder::new()
            .name("tasksync-model-load".into())
            .spawn(move || run_load(loader.as_ref(), &lifecycle));

        match spawned {
            Ok(handle) => {
                let mut slot = self
                    .load_thread
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                *slot = Some(handle);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn model load thread");
                self.lifecycle
                    .finish_loading(Err(format!("Failed to spawn load thread: {e}")));
            }
        }
    }

    /// Block until the current load (if any) finishes, then report status.
    pub fn wait_for_load(&self) -> ModelStatus {
        let handle = self
            .load_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Model load thread panicked");
            }
        }
        self.get_status()
    }

    /// Extract tasks from free text. Never fails: any problem on the model
    /// path falls back to the rule engine.
    pub fn process_text(&self, text: &str, options: &ExtractOptions) -> ExtractionResult {
        let span = tracing::info_span!("process_text", chars = text.chars().count());
        let _enter = span.enter();
        let start = Instant::now();

        let normalizer = self.normalizer();
        let result = match self.try_model(text, options, &normalizer) {
            ModelAttempt::Extracted(tasks) => ExtractionResult {
                tasks,
                method: Method::Model,
                model_state: ModelState::Ready,
                message: None,
                error: None,
            },
            ModelAttempt::Unavailable(state) => {
                let message = match state {
                    ModelState::NotLoaded => "Using simplified parsing as AI model is not loaded",
                    ModelState::Loading => "Using simplified parsing while AI model is loading",
                    _ => "Using simplified parsing as AI model failed to load",
                };
                let error = if state == ModelState::Error {
                    self.lifecycle.last_error()
                } else {
                    None
                };
                self.fallback(text, &normalizer, state, message, error)
            }
            ModelAttempt::Failed(error) => {
                tracing::warn!(error = %error, "Model extraction failed, using rule engine");
                self.fallback(
                    text,
                    &normalizer,
                    self.lifecycle.state(),
                    "Using simplified parsing as AI model output was unusable",
                    Some(error.to_string()),
                )
            }
        };

        tracing::info!(
            method = result.method.as_str(),
            model_state = %result.model_state,
            tasks = result.tasks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );
        result
    }

    fn try_model(
        &self,
        text: &str,
        options: &ExtractOptions,
        normalizer: &DateNormalizer,
    ) -> ModelAttempt {
        let model = match self.lifecycle.ready_model() {
            Ok(model) => model,
            Err(state) => return ModelAttempt::Unavailable(state),
        };

        let language = options
            .language_hint
            .as_deref()
            .and_then(Language::from_hint)
            .unwrap_or_else(|| detect_language(text));
        let prompt = build_task_prompt(text, language, options.force_structured_output);

        let outcome = model
            .client
            .generate(&model.model_name, &prompt, TASK_SYSTEM_PROMPT)
            .and_then(|raw| {
                tracing::debug!(model = %model.model_name, chars = raw.len(), "Model responded");
                parse_model_tasks(&raw, normalizer)
            });

        match outcome {
            Ok(tasks) => ModelAttempt::Extracted(tasks),
            Err(error) => ModelAttempt::Failed(error),
        }
    }

    fn fallback(
        &self,
        text: &str,
        normalizer: &DateNormalizer,
        model_state: ModelState,
        message: &str,
        error: Option<String>,
    ) -> ExtractionResult {
        ExtractionResult {
            tasks: extract_with(text, normalizer),
            method: Method::RegexFallback,
            model_state,
            message: Some(message.to_string()),
            error,
        }
    }

    fn normalizer(&self) -> DateNormalizer {
        match self.reference_date {
            Some(today) => DateNormalizer::new(today),
            None => DateNormalizer::for_today(),
        }
    }
}

fn run_load(loader: &dyn ModelLoader, lifecycle: &ModelLifecycle) {
    let span = tracing::info_span!("model_load");
    let _enter = span.enter();
    let start = Instant::now();
    tracing::info!("Loading task model");

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| loader.load())) {
        Ok(Ok(model)) => {
            tracing::info!(
                model = %model.model_name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Task model ready"
            );
            Ok(model)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Task model failed to load");
            Err(e.to_string())
        }
        Err(_) => {
            let e = StructuringError::LoadFailed("loader panicked".into());
            tracing::error!(error = %e, "Task model failed to load");
            Err(e.to_string())
        }
    };

    lifecycle.finish_loading(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::{LlmClient, LoadedModel, MockLlmClient};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    /// Monday 2026-10-19.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    /// Loader that hands out a mock client with a fixed response.
    struct MockLoader {
        response: Option<String>,
        calls: AtomicUsize,
    }

    impl MockLoader {
        fn ready(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn generating_errors() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ModelLoader for MockLoader {
        fn load(&self) -> Result<LoadedModel, StructuringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let client = match &self.response {
                Some(response) => MockLlmClient::new(response),
                None => MockLlmClient::failing(),
            };
            Ok(LoadedModel {
                client: Arc::new(client),
                model_name: "llama3.2:3b".into(),
            })
        }
    }

    /// Loader that hands out one shared mock client so tests can inspect it.
    struct SharedClientLoader {
        client: Arc<MockLlmClient>,
    }

    impl ModelLoader for SharedClientLoader {
        fn load(&self) -> Result<LoadedModel, StructuringError> {
            Ok(LoadedModel {
                client: Arc::clone(&self.client) as Arc<dyn LlmClient>,
                model_name: "llama3.2:3b".into(),
            })
        }
    }

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(&self) -> Result<LoadedModel, StructuringError> {
            Err(StructuringError::NoModelAvailable)
        }
    }

    struct PanickingLoader;

    impl ModelLoader for PanickingLoader {
        fn load(&self) -> Result<LoadedModel, StructuringError> {
            panic!("boom");
        }
    }

    /// Loader that blocks until the test releases it.
    struct GatedLoader {
        gate: Mutex<Receiver<()>>,
        calls: AtomicUsize,
    }

    impl GatedLoader {
        fn new() -> (Arc<Self>, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let loader = Arc::new(Self {
                gate: Mutex::new(rx),
                calls: AtomicUsize::new(0),
            });
            (loader, tx)
        }
    }

    impl ModelLoader for GatedLoader {
        fn load(&self) -> Result<LoadedModel, StructuringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self
                .gate
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(10));
            Ok(LoadedModel {
                client: Arc::new(MockLlmClient::new("[]")),
                model_name: "gated".into(),
            })
        }
    }

    fn ready_orchestrator(response: &str) -> ModelOrchestrator {
        let orchestrator = ModelOrchestrator::new(MockLoader::ready(response))
            .with_reference_date(today());
        orchestrator.start_loading();
        assert_eq!(orchestrator.wait_for_load().state, ModelState::Ready);
        orchestrator
    }

    #[test]
    fn not_loaded_falls_back_to_rules() {
        let orchestrator =
            ModelOrchestrator::new(MockLoader::ready("[]")).with_reference_date(today());
        let result = orchestrator.process_text("I need to buy milk tomorrow", &ExtractOptions::default());

        assert_eq!(result.method, Method::RegexFallback);
        assert_eq!(result.model_state, ModelState::NotLoaded);
        assert!(result.message.as_deref().unwrap().starts_with("Using simplified parsing"));
        assert!(result.error.is_none());
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].deadline.as_deref(), Some("2026-10-20"));
    }

    #[test]
    fn initial_status() {
        let orchestrator = ModelOrchestrator::new(MockLoader::ready("[]"));
        let status = orchestrator.get_status();
        assert_eq!(status.state, ModelState::NotLoaded);
        assert!(!status.loading_started);
        assert!(status.model.is_none());
    }

    #[test]
    fn ready_model_extracts_tasks() {
        let orchestrator = ready_orchestrator(
            r#"[{"task": "Buy milk", "time": null, "category": "Shopping", "deadline": "tomorrow"},
                {"task": "buy milk", "time": null, "category": null, "deadline": null},
                {"task": "hi", "time": null, "category": null, "deadline": null}]"#,
        );
        let status = orchestrator.get_status();
        assert_eq!(status.model.as_deref(), Some("llama3.2:3b"));
        assert!(status.loading_started);

        let result = orchestrator.process_text("Buy milk tomorrow", &ExtractOptions::default());
        assert_eq!(result.method, Method::Model);
        assert_eq!(result.model_state, ModelState::Ready);
        assert!(result.message.is_none());
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].deadline.as_deref(), Some("2026-10-20"));
    }

    #[test]
    fn options_shape_the_model_prompt() {
        let client = Arc::new(MockLlmClient::new("[]"));
        let orchestrator = ModelOrchestrator::new(Arc::new(SharedClientLoader {
            client: Arc::clone(&client),
        }))
        .with_reference_date(today());
        orchestrator.start_loading();
        orchestrator.wait_for_load();

        let text = "I need to buy milk tomorrow and call the bank";
        orchestrator.process_text(text, &ExtractOptions::default());
        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("written in English"));
        assert!(prompt.contains("ONLY a valid JSON array"));
        assert!(prompt.contains(&format!("INPUT: {text}")));

        let options = ExtractOptions {
            language_hint: Some("ro".into()),
            force_structured_output: false,
        };
        orchestrator.process_text(text, &options);
        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("written in Romanian"));
        assert!(!prompt.contains("ONLY"));
    }

    #[test]
    fn malformed_model_output_falls_back() {
        let orchestrator = ready_orchestrator("Sorry, I cannot help with that.");
        let result = orchestrator.process_text("Call John on Friday at 3pm", &ExtractOptions::default());

        assert_eq!(result.method, Method::RegexFallback);
        assert_eq!(result.model_state, ModelState::Ready);
        assert!(result.error.as_deref().unwrap().contains("No JSON array"));
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].time.as_deref(), Some("3pm"));
    }

    #[test]
    fn model_call_failure_falls_back() {
        let orchestrator = ModelOrchestrator::new(MockLoader::generating_errors())
            .with_reference_date(today());
        orchestrator.start_loading();
        orchestrator.wait_for_load();

        let result = orchestrator.process_text("Pay rent by friday", &ExtractOptions::default());
        assert_eq!(result.method, Method::RegexFallback);
        assert!(result.error.is_some());
        assert_eq!(result.tasks[0].deadline.as_deref(), Some("2026-10-23"));
    }

    #[test]
    fn failed_load_reports_error_and_falls_back() {
        let orchestrator = ModelOrchestrator::new(Arc::new(FailingLoader));
        orchestrator.start_loading();
        let status = orchestrator.wait_for_load();
        assert_eq!(status.state, ModelState::Error);
        assert!(status.error.as_deref().unwrap().contains("No compatible"));

        let result = orchestrator.process_text("Buy milk", &ExtractOptions::default());
        assert_eq!(result.method, Method::RegexFallback);
        assert_eq!(result.model_state, ModelState::Error);
        assert!(result.error.is_some());
        assert_eq!(result.tasks.len(), 1);
    }

    #[test]
    fn panicking_loader_ends_in_error() {
        let orchestrator = ModelOrchestrator::new(Arc::new(PanickingLoader));
        orchestrator.start_loading();
        let status = orchestrator.wait_for_load();
        assert_eq!(status.state, ModelState::Error);
        assert!(status.error.as_deref().unwrap().contains("panicked"));
    }

    #[test]
    fn load_is_single_flight_and_does_not_block_requests() {
        let (loader, release) = GatedLoader::new();
        let orchestrator = Arc::new(
            ModelOrchestrator::new(loader.clone()).with_reference_date(today()),
        );

        let starters: Vec<_> = (0..4)
            .map(|_| {
                let orchestrator = Arc::clone(&orchestrator);
                thread::spawn(move || orchestrator.start_loading())
            })
            .collect();
        for handle in starters {
            handle.join().unwrap();
        }
        assert_eq!(orchestrator.get_status().state, ModelState::Loading);

        // Requests during the load return immediately via the rule engine.
        let result = orchestrator.process_text("Buy milk", &ExtractOptions::default());
        assert_eq!(result.method, Method::RegexFallback);
        assert_eq!(result.model_state, ModelState::Loading);

        release.send(()).unwrap();
        assert_eq!(orchestrator.wait_for_load().state, ModelState::Ready);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_loading_after_ready_is_noop() {
        let loader = MockLoader::ready("[]");
        let orchestrator = ModelOrchestrator::new(loader.clone());
        orchestrator.start_loading();
        orchestrator.wait_for_load();
        orchestrator.start_loading();
        orchestrator.wait_for_load();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_state_can_be_retried() {
        let orchestrator = ModelOrchestrator::new(Arc::new(FailingLoader));
        orchestrator.start_loading();
        orchestrator.wait_for_load();
        orchestrator.start_loading();
        assert_eq!(orchestrator.wait_for_load().state, ModelState::Error);
    }

    #[test]
    fn greeting_yields_no_tasks_on_fallback() {
        let orchestrator = ModelOrchestrator::new(MockLoader::ready("[]"));
        let result = orchestrator.process_text("Hello there!", &ExtractOptions::default());
        assert!(result.tasks.is_empty());
        assert_eq!(result.method, Method::RegexFallback);
    }

    #[test]
    fn empty_input_never_fails() {
        let orchestrator = ready_orchestrator("[]");
        let result = orchestrator.process_text("", &ExtractOptions::default());
        assert!(result.tasks.is_empty());
        assert_eq!(result.method, Method::Model);
    }

    #[test]
    fn from_config_without_autoload_stays_idle() {
        let orchestrator = ModelOrchestrator::from_config(&EngineConfig::default());
        assert_eq!(orchestrator.get_status().state, ModelState::NotLoaded);
    }
}
