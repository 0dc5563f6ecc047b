//! The observe, ask, act loop that drives one task.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use webhands_core::ActionRegistry;
use webhands_dom::DomEngine;
use webhands_protocols::action::{ActionContext, ActionOutcome, COMPLETE_ACTION};
use webhands_protocols::error::{AgentError, ProviderError};
use webhands_protocols::page::BrowserPage;
use webhands_protocols::provider::{CompletionRequest, LLMProvider};
use webhands_protocols::task::{AgentOutput, AgentStep, TaskOutput, TaskStatus};

use crate::debug::DebugWriter;
use crate::messages::{StepInput, build_step_messages};
use crate::retry::{RetryConfig, retry};
use crate::task::TaskState;
use crate::variables::VariableStore;

/// Output recorded when `complete` ran but produced no text.
pub const NO_COMPLETE_OUTPUT: &str = "No complete action found";

pub type StepCallback = Arc<dyn Fn(&AgentStep) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn(&TaskOutput) + Send + Sync>;
pub type AgentOutputCallback = Arc<dyn Fn(&AgentOutput) + Send + Sync>;

/// Caller hooks invoked by the loop.
#[derive(Clone, Default)]
pub struct TaskHooks {
    pub on_step: Option<StepCallback>,
    pub on_complete: Option<CompleteCallback>,
    pub debug_on_agent_output: Option<AgentOutputCallback>,
}

impl std::fmt::Debug for TaskHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHooks")
            .field("on_step", &self.on_step.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("debug_on_agent_output", &self.debug_on_agent_output.is_some())
            .finish()
    }
}

/// Configuration for the step loop.
#[derive(Debug, Clone)]
pub struct StepLoopConfig {
    /// Cancel the task once this many steps have been recorded. `0` means no limit.
    pub max_steps: Option<usize>,
    /// Pause after every executed action.
    pub settle_delay: Duration,
    /// Pause before retrying a step whose snapshot came back empty.
    pub empty_snapshot_delay: Duration,
    /// Skip the rest of the batch once `complete` has run.
    pub stop_on_complete: bool,
    pub token_limit: usize,
    pub retry: RetryConfig,
    /// Root directory for debug artifacts; `None` disables them.
    pub debug_dir: Option<PathBuf>,
}

impl Default for StepLoopConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            settle_delay: Duration::from_secs(2),
            empty_snapshot_delay: Duration::from_secs(1),
            stop_on_complete: false,
            token_limit: 128_000,
            retry: RetryConfig::default(),
            debug_dir: None,
        }
    }
}

impl StepLoopConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_empty_snapshot_delay(mut self, delay: Duration) -> Self {
        self.empty_snapshot_delay = delay;
        self
    }

    pub fn with_stop_on_complete(mut self, stop: bool) -> Self {
        self.stop_on_complete = stop;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }
}

/// Everything one task needs to run.
pub struct StepLoop {
    pub page: Arc<dyn BrowserPage>,
    pub llm: Arc<dyn LLMProvider>,
    /// Task-scoped registry, with `complete` already bound.
    pub registry: Arc<ActionRegistry>,
    pub engine: DomEngine,
    pub system_prompt: String,
    pub variables: VariableStore,
    pub config: StepLoopConfig,
    pub hooks: TaskHooks,
}

impl StepLoop {
    /// Run the task to its end and return its output.
    ///
    /// Errors end the task `Failed` with the message recorded; in async mode
    /// they are also sent on `errors`. A task that already reached a terminal
    /// status keeps it and no error is sent.
    pub async fn drive(
        &self,
        task: &TaskState,
        errors: Option<&broadcast::Sender<String>>,
    ) -> TaskOutput {
        if let Err(e) = self.run(task).await {
            let message = e.to_string();
            if task.fail(message.clone()) != TaskStatus::Failed {
                // Already finished, e.g. `complete` ran earlier in the batch.
                warn!(
                    "Task {} ended {} before error: {}",
                    task.id(),
                    task.status(),
                    message
                );
                return task.to_output();
            }
            error!("Task {} failed: {}", task.id(), message);
            if let Some(errors) = errors {
                let _ = errors.send(message);
            }
        }
        task.to_output()
    }

    /// Run steps until the task reaches a terminal status.
    pub async fn run(&self, task: &TaskState) -> Result<(), AgentError> {
        task.start();
        info!("Starting task {}: {}", task.id(), task.goal());

        let artifacts = self
            .config
            .debug_dir
            .as_ref()
            .map(|root| DebugWriter::new(root, task.id()));
        if let Some(artifacts) = &artifacts {
            info!("Debugging task {} in {}", task.id(), artifacts.task_dir().display());
        }

        let schema = self.registry.output_schema();
        let method = self.llm.structured_output_method();

        loop {
            let status = task.status();
            if status == TaskStatus::Paused {
                task.wait_while_paused().await;
                continue;
            }
            if status.is_terminal() {
                break;
            }

            let idx = task.step_count();
            if self.config.max_steps.is_some_and(|max| max > 0 && idx >= max) {
                info!("Task {} reached max steps ({})", task.id(), idx);
                task.cancel();
                break;
            }
            debug!("Task {} step {}", task.id(), idx);

            let step_dir = match &artifacts {
                Some(artifacts) => artifacts.prepare_step(idx).await,
                None => None,
            };

            let engine = &self.engine;
            let page = self.page.as_ref();
            let Some(dom_state) = retry(&self.config.retry, "DOM snapshot", move || {
                engine.capture(page)
            })
            .await?
            else {
                warn!("no dom state, waiting 1 second.");
                sleep(self.config.empty_snapshot_delay).await;
                continue;
            };

            if let (Some(artifacts), Some(dir)) = (&artifacts, &step_dir) {
                artifacts.write_text(&dir.join("elems.txt"), &dom_state.dom_text).await;
                if let Some(screenshot) = &dom_state.screenshot {
                    artifacts.write_png(&dir.join("screenshot.png"), screenshot).await;
                }
            }

            let url = self.page.url().await?;
            let variables = self.variables.list();
            let steps = task.steps();
            let messages = build_step_messages(StepInput {
                system_prompt: &self.system_prompt,
                goal: task.goal(),
                url: &url,
                variables: &variables,
                steps: &steps,
                dom_state: &dom_state,
            });
            if let (Some(artifacts), Some(dir)) = (&artifacts, &step_dir) {
                artifacts.write_json(&dir.join("msgs.json"), &messages).await;
            }

            let request = CompletionRequest::new(messages);
            let llm = self.llm.clone();
            let schema_ref = &schema;
            let agent_output = retry(&self.config.retry, "LLM call", move || {
                let llm = llm.clone();
                let request = request.clone();
                async move {
                    let value = llm.complete_structured(request, schema_ref, method).await?;
                    serde_json::from_value::<AgentOutput>(value).map_err(|e| {
                        ProviderError::InvalidResponse(format!("agent output: {}", e))
                    })
                }
            })
            .await?;

            if let Some(hook) = &self.hooks.debug_on_agent_output {
                hook(&agent_output);
            }

            let status = task.status();
            if status == TaskStatus::Paused {
                continue;
            }
            if status.is_terminal() {
                break;
            }

            self.engine.remove_highlights(self.page.as_ref()).await?;

            let mut ctx = ActionContext::new(self.page.clone(), Arc::new(dom_state), self.llm.clone())
                .with_token_limit(self.config.token_limit)
                .with_variables(variables);
            if let Some(dir) = &step_dir {
                ctx = ctx.with_debug_dir(dir.clone());
            }

            let mut action_outputs = Vec::with_capacity(agent_output.actions.len());
            let batch = self
                .run_actions(task, &agent_output, &ctx, &mut action_outputs)
                .await;

            let step = AgentStep {
                idx,
                agent_output,
                action_outputs,
            };
            task.push_step(step.clone());
            if let Some(hook) = &self.hooks.on_step {
                hook(&step);
            }
            if let (Some(artifacts), Some(dir)) = (&artifacts, &step_dir) {
                artifacts.write_json(&dir.join("stepOutput.json"), &step).await;
            }
            batch?;
        }

        let output = task.to_output();
        info!("Task {} finished: {}", task.id(), output.status);
        if let Some(artifacts) = &artifacts {
            artifacts.write_task_output(&output).await;
        }
        if let Some(hook) = &self.hooks.on_complete {
            hook(&output);
        }
        Ok(())
    }

    /// Run one batch in model order. Outcomes produced before an error stay
    /// in `outputs`.
    async fn run_actions(
        &self,
        task: &TaskState,
        agent_output: &AgentOutput,
        ctx: &ActionContext,
        outputs: &mut Vec<ActionOutcome>,
    ) -> Result<(), AgentError> {
        for call in &agent_output.actions {
            let completes = call.action_type == COMPLETE_ACTION;
            if completes {
                let output = self
                    .registry
                    .get(COMPLETE_ACTION)?
                    .complete(&call.params)
                    .unwrap_or_else(|| NO_COMPLETE_OUTPUT.to_string());
                task.complete(output);
            }

            debug!("Running {}", self.registry.pprint(call));
            let outcome = self.registry.dispatch(call, ctx).await?;
            outputs.push(outcome);
            sleep(self.config.settle_delay).await;

            if completes && self.config.stop_on_complete {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "step_loop_tests.rs"]
mod tests;
