//! Process-wide model lifecycle: NOT_LOADED → LOADING → READY | ERROR.
//!
//! Writers are the load path only; extraction requests take a short read
//! lock to snapshot the state and never wait on a load in progress.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::types::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    NotLoaded,
    Loading,
    Ready,
    Error,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLoaded => "not_loaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view returned by `get_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub state: ModelState,
    pub model: Option<String>,
    pub error: Option<String>,
    pub loading_started: bool,
}

/// A model that finished loading.
#[derive(Clone)]
pub struct LoadedModel {
    pub client: Arc<dyn LlmClient>,
    pub model_name: String,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Inner {
    state: ModelState,
    model: Option<LoadedModel>,
    error: Option<String>,
    loading_started: bool,
}

#[derive(Debug)]
pub struct ModelLifecycle {
    inner: RwLock<Inner>,
}

impl Default for ModelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLifecycle {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                state: ModelState::NotLoaded,
                model: None,
                error: None,
                loading_started: false,
            }),
        }
    }

    // A panic while holding the lock leaves `Inner` consistent (every
    // write is a plain field assignment), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ModelState {
        self.read().state
    }

    pub fn status(&self) -> ModelStatus {
        let inner = self.read();
        ModelStatus {
            state: inner.state,
            model: inner.model.as_ref().map(|m| m.model_name.clone()),
            error: inner.error.clone(),
            loading_started: inner.loading_started,
        }
    }

    /// Atomically claim the load: NOT_LOADED or ERROR → LOADING.
    ///
    /// Returns false when a load is already in flight or finished, in which
    /// case the caller must not start another one.
    pub fn begin_loading(&self) -> bool {
        let mut inner = self.write();
        match inner.state {
            ModelState::Loading | ModelState::Ready => false,
            ModelState::NotLoaded | ModelState::Error => {
                inner.state = ModelState::Loading;
                inner.error = None;
                inner.loading_started = true;
                true
            }
        }
    }

    /// Record the load outcome. Only valid while LOADING.
    pub fn finish_loading(&self, outcome: Result<LoadedModel, String>) {
        let mut inner = self.write();
        if inner.state != ModelState::Loading {
            tracing::warn!(state = %inner.state, "Load finished outside LOADING, ignored");
            return;
        }
        match outcome {
            Ok(model) => {
                inner.state = ModelState::Ready;
                inner.model = Some(model);
                inner.error = None;
            }
            Err(error) => {
                inner.state = ModelState::Error;
                inner.model = None;
                inner.error = Some(error);
            }
        }
    }

    /// The loaded model if READY, otherwise the current state.
    pub fn ready_model(&self) -> Result<LoadedModel, ModelState> {
        let inner = self.read();
        match (&inner.state, &inner.model) {
            (ModelState::Ready, Some(model)) => Ok(model.clone()),
            (state, _) => Err(*state),
        }
    }

    /// Last load error, if the lifecycle is in ERROR.
    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }
}
