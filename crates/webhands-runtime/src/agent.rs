//! The browser agent: registry, variables, tool servers and task execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use webhands_core::ActionRegistry;
use webhands_dom::{DomEngine, LISTENER_TRACKER_JS, SnapshotOptions};
use webhands_protocols::action::Action;
use webhands_protocols::error::{AgentError, ToolServerError};
use webhands_protocols::page::{BrowserPage, BrowserProvider};
use webhands_protocols::provider::LLMProvider;
use webhands_protocols::task::{
    ActionCall, AgentOutput, AgentStep, TaskOutput, TaskStatus, Variable,
};
use webhands_protocols::tool_server::{ToolServer, ToolServerInfo};

use crate::complete::{CompleteAction, StructuredCompleteAction};
use crate::control::TaskControl;
use crate::prompts::system_prompt;
use crate::retry::RetryConfig;
use crate::step_loop::{StepLoop, StepLoopConfig, TaskHooks};
use crate::task::TaskState;
use crate::variables::VariableStore;

const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Agent-wide defaults. Per-task values in [`TaskParams`] take precedence.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub max_steps: Option<usize>,
    pub token_limit: usize,
    pub settle_delay: Duration,
    pub stop_on_complete: bool,
    /// Write debug artifacts for every task.
    pub debug: bool,
    pub debug_dir: PathBuf,
    pub snapshot: SnapshotOptions,
    pub retry: RetryConfig,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: None,
            token_limit: 128_000,
            settle_delay: Duration::from_secs(2),
            stop_on_complete: false,
            debug: false,
            debug_dir: PathBuf::from("debug"),
            snapshot: SnapshotOptions::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Per-task parameters.
#[derive(Default)]
pub struct TaskParams {
    pub max_steps: Option<usize>,
    pub debug_dir: Option<PathBuf>,
    /// JSON schema the final answer must follow.
    pub output_schema: Option<Value>,
    pub hooks: TaskHooks,
    /// Run on this page instead of the agent's current one.
    pub starting_page: Option<Arc<dyn BrowserPage>>,
}

impl TaskParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn on_step(mut self, f: impl Fn(&AgentStep) + Send + Sync + 'static) -> Self {
        self.hooks.on_step = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn(&TaskOutput) + Send + Sync + 'static) -> Self {
        self.hooks.on_complete = Some(Arc::new(f));
        self
    }

    pub fn debug_on_agent_output(
        mut self,
        f: impl Fn(&AgentOutput) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.debug_on_agent_output = Some(Arc::new(f));
        self
    }

    pub fn with_starting_page(mut self, page: Arc<dyn BrowserPage>) -> Self {
        self.starting_page = Some(page);
        self
    }
}

/// A browser automation agent.
pub struct WebAgent {
    llm: Arc<dyn LLMProvider>,
    browser: Arc<dyn BrowserProvider>,
    registry: ActionRegistry,
    variables: VariableStore,
    settings: AgentSettings,
    current_page: Mutex<Option<Arc<dyn BrowserPage>>>,
    tasks: DashMap<String, Arc<TaskState>>,
    tool_servers: DashMap<String, Arc<dyn ToolServer>>,
}

impl WebAgent {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        browser: Arc<dyn BrowserProvider>,
        settings: AgentSettings,
    ) -> Self {
        let registry = ActionRegistry::new();
        // Lets `pprint_action` describe `complete`; tasks bind their own.
        if let Err(e) = registry.install_complete_action(Arc::new(CompleteAction::new())) {
            warn!("Failed to install default complete action: {}", e);
        }
        Self {
            llm,
            browser,
            registry,
            variables: VariableStore::new(),
            settings,
            current_page: Mutex::new(None),
            tasks: DashMap::new(),
            tool_servers: DashMap::new(),
        }
    }

    /// Register a list of actions, failing on the first duplicate.
    pub fn with_actions(self, actions: Vec<Arc<dyn Action>>) -> Result<Self, AgentError> {
        for action in actions {
            self.register_action(action)?;
        }
        Ok(self)
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn register_action(&self, action: Arc<dyn Action>) -> Result<(), AgentError> {
        let action_type = action.action_type().to_string();
        self.registry.register(action)?;
        debug!("Registered action {}", action_type);
        Ok(())
    }

    pub fn action_types(&self) -> Vec<String> {
        self.registry
            .list()
            .into_iter()
            .map(|d| d.action_type)
            .collect()
    }

    pub fn pprint_action(&self, call: &ActionCall) -> String {
        self.registry.pprint(call)
    }

    pub fn add_variable(&self, variable: Variable) {
        self.variables.add(variable);
    }

    pub fn get_variable(&self, key: &str) -> Option<Variable> {
        self.variables.get(key)
    }

    pub fn delete_variable(&self, key: &str) -> Option<Variable> {
        self.variables.delete(key)
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.variables.list()
    }

    pub fn task(&self, id: &str) -> Option<Arc<TaskState>> {
        self.tasks.get(id).map(|t| t.clone())
    }

    /// The page tasks run on unless they bring their own. Opened on first use.
    pub async fn current_page(&self) -> Result<Arc<dyn BrowserPage>, AgentError> {
        let mut current = self.current_page.lock().await;
        if let Some(page) = current.as_ref() {
            return Ok(page.clone());
        }
        let page = self.new_page().await?;
        *current = Some(page.clone());
        Ok(page)
    }

    /// Open a fresh page prepared for snapshots. It does not replace the
    /// current page; pass it to a task with [`TaskParams::with_starting_page`].
    pub async fn new_page(&self) -> Result<Arc<dyn BrowserPage>, AgentError> {
        let page = self.browser.new_page().await?;
        page.add_init_script(LISTENER_TRACKER_JS).await?;
        Ok(page)
    }

    async fn prepare(
        &self,
        goal: &str,
        params: TaskParams,
    ) -> Result<(Arc<TaskState>, StepLoop), AgentError> {
        let page = match params.starting_page {
            Some(page) => {
                // The tracker script is a no-op on pages that already have it.
                page.add_init_script(LISTENER_TRACKER_JS).await?;
                page
            }
            None => self.current_page().await?,
        };

        let complete: Arc<dyn Action> = match params.output_schema {
            Some(schema) => Arc::new(StructuredCompleteAction::new(schema)),
            None => Arc::new(CompleteAction::new()),
        };
        let registry = self.registry.for_task(complete)?;

        let mut config = StepLoopConfig {
            max_steps: params.max_steps.or(self.settings.max_steps),
            settle_delay: self.settings.settle_delay,
            stop_on_complete: self.settings.stop_on_complete,
            token_limit: self.settings.token_limit,
            retry: self.settings.retry.clone(),
            ..StepLoopConfig::default()
        };
        if let Some(dir) = params.debug_dir {
            config.debug_dir = Some(dir);
        } else if self.settings.debug {
            config.debug_dir = Some(self.settings.debug_dir.clone());
        }

        let task = Arc::new(TaskState::new(Uuid::new_v4().to_string(), goal));
        self.tasks.insert(task.id().to_string(), task.clone());

        let step_loop = StepLoop {
            page,
            llm: self.llm.clone(),
            registry: Arc::new(registry),
            engine: DomEngine::new(self.settings.snapshot.clone()),
            system_prompt: system_prompt(),
            variables: self.variables.clone(),
            config,
            hooks: params.hooks,
        };
        Ok((task, step_loop))
    }

    /// Run a task to its end.
    ///
    /// Failures during the run come back as a `Failed` output with the step
    /// history kept; `Err` is reserved for problems setting the task up.
    pub async fn execute_task(
        &self,
        goal: &str,
        params: TaskParams,
    ) -> Result<TaskOutput, AgentError> {
        let (task, step_loop) = self.prepare(goal, params).await?;
        Ok(step_loop.drive(&task, None).await)
    }

    /// Start a task in the background and return its control handle.
    pub async fn execute_task_async(
        &self,
        goal: &str,
        params: TaskParams,
    ) -> Result<TaskControl, AgentError> {
        let (task, step_loop) = self.prepare(goal, params).await?;
        let (errors, first_errors) = broadcast::channel(ERROR_CHANNEL_CAPACITY);

        let handle = {
            let task = task.clone();
            let errors = errors.clone();
            tokio::spawn(async move { step_loop.drive(&task, Some(&errors)).await })
        };
        Ok(TaskControl::new(task, errors, first_errors, handle))
    }

    /// Register every action of a connected tool server. Returns its id.
    pub fn connect_tool_server(&self, server: Arc<dyn ToolServer>) -> Result<String, AgentError> {
        let id = server.id().to_string();
        if self.tool_servers.contains_key(&id) {
            return Err(ToolServerError::AlreadyConnected(id).into());
        }

        let actions = server.actions();
        let mut registered: Vec<String> = Vec::with_capacity(actions.len());
        for action in actions {
            let action_type = action.action_type().to_string();
            if let Err(e) = self.registry.register(action) {
                for done in &registered {
                    let _ = self.registry.unregister(done);
                }
                return Err(e.into());
            }
            registered.push(action_type);
        }

        info!("Connected tool server {} with {} tools", id, registered.len());
        self.tool_servers.insert(id.clone(), server);
        Ok(id)
    }

    /// Unregister a tool server's actions and close it.
    pub async fn disconnect_tool_server(&self, id: &str) -> Result<(), AgentError> {
        let (_, server) = self
            .tool_servers
            .remove(id)
            .ok_or_else(|| ToolServerError::NotFound(id.to_string()))?;
        for action in server.actions() {
            let _ = self.registry.unregister(action.action_type());
        }
        server.close().await?;
        info!("Disconnected tool server {}", id);
        Ok(())
    }

    pub fn is_connected(&self, id: &str) -> bool {
        self.tool_servers.contains_key(id)
    }

    pub fn server_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tool_servers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn server_info(&self) -> Vec<ToolServerInfo> {
        let mut info: Vec<ToolServerInfo> = self
            .tool_servers
            .iter()
            .map(|entry| {
                let tool_names: Vec<String> = entry
                    .value()
                    .actions()
                    .iter()
                    .map(|a| a.action_type().to_string())
                    .collect();
                ToolServerInfo {
                    id: entry.key().clone(),
                    tool_count: tool_names.len(),
                    tool_names,
                }
            })
            .collect();
        info.sort_by(|a, b| a.id.cmp(&b.id));
        info
    }

    /// Cancel unfinished tasks, disconnect tool servers and close the browser.
    pub async fn close(&self) -> Result<(), AgentError> {
        for entry in self.tasks.iter() {
            if !entry.value().status().is_terminal() {
                entry.value().cancel();
            }
        }

        for id in self.server_ids() {
            if let Err(e) = self.disconnect_tool_server(&id).await {
                warn!("Failed to disconnect tool server {}: {}", id, e);
            }
        }

        self.current_page.lock().await.take();
        self.browser.close().await?;
        Ok(())
    }

    /// Number of tasks that are not finished yet.
    pub fn active_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.value().status().is_terminal())
            .count()
    }

    /// Status of a known task.
    pub fn task_status(&self, id: &str) -> Result<TaskStatus, AgentError> {
        self.task(id)
            .map(|t| t.status())
            .ok_or_else(|| AgentError::TaskNotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
