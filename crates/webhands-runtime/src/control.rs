//! Handle returned by asynchronous task execution.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use webhands_protocols::error::AgentError;
use webhands_protocols::task::{AgentStep, TaskOutput, TaskStatus};

use crate::task::TaskState;

/// Control surface of a running task.
///
/// `pause`, `resume` and `cancel` return the status after the call; requests
/// that do not apply to the current status leave it unchanged.
pub struct TaskControl {
    task: Arc<TaskState>,
    errors: broadcast::Sender<String>,
    /// Subscribed before the task was spawned, so the first caller of
    /// `subscribe_errors` sees every error.
    first_errors: Mutex<Option<broadcast::Receiver<String>>>,
    handle: Mutex<Option<JoinHandle<TaskOutput>>>,
}

impl TaskControl {
    pub(crate) fn new(
        task: Arc<TaskState>,
        errors: broadcast::Sender<String>,
        first_errors: broadcast::Receiver<String>,
        handle: JoinHandle<TaskOutput>,
    ) -> Self {
        Self {
            task,
            errors,
            first_errors: Mutex::new(Some(first_errors)),
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn id(&self) -> &str {
        self.task.id()
    }

    pub fn status(&self) -> TaskStatus {
        self.task.status()
    }

    pub fn pause(&self) -> TaskStatus {
        self.task.pause()
    }

    pub fn resume(&self) -> TaskStatus {
        self.task.resume()
    }

    pub fn cancel(&self) -> TaskStatus {
        self.task.cancel()
    }

    pub fn steps(&self) -> Vec<AgentStep> {
        self.task.steps()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TaskStatus> {
        self.task.subscribe()
    }

    /// Task-level failures, one message per failed task.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.first_errors
            .lock()
            .take()
            .unwrap_or_else(|| self.errors.subscribe())
    }

    /// Wait for the task to finish and return its output.
    pub async fn wait(&self) -> Result<TaskOutput, AgentError> {
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => handle
                .await
                .map_err(|e| AgentError::Join(e.to_string())),
            None => {
                self.task.wait_terminal().await;
                Ok(self.task.to_output())
            }
        }
    }
}

impl std::fmt::Debug for TaskControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskControl")
            .field("id", &self.task.id())
            .field("status", &self.task.status())
            .finish()
    }
}
