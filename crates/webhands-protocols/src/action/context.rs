//! Execution context handed to each action.

use std::path::PathBuf;
use std::sync::Arc;

use crate::dom::DomState;
use crate::page::BrowserPage;
use crate::provider::LLMProvider;
use crate::task::Variable;

/// Everything an action may touch while it runs.
#[derive(Clone)]
pub struct ActionContext {
    /// The task's live page.
    pub page: Arc<dyn BrowserPage>,

    /// Snapshot the model was shown for this step.
    pub dom_state: Arc<DomState>,

    pub llm: Arc<dyn LLMProvider>,

    /// Token budget for model-facing text produced by actions.
    pub token_limit: usize,

    pub variables: Vec<Variable>,

    /// Per-step debug directory, when debug mode is on.
    pub debug_dir: Option<PathBuf>,
}

impl ActionContext {
    pub fn new(
        page: Arc<dyn BrowserPage>,
        dom_state: Arc<DomState>,
        llm: Arc<dyn LLMProvider>,
    ) -> Self {
        Self {
            page,
            dom_state,
            llm,
            token_limit: 128_000,
            variables: Vec::new(),
            debug_dir: None,
        }
    }

    pub fn with_token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_debug_dir(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("elements", &self.dom_state.elements.len())
            .field("token_limit", &self.token_limit)
            .field("variables", &self.variables.len())
            .field("debug_dir", &self.debug_dir)
            .finish()
    }
}
