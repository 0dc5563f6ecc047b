//! Task record and its status state machine.
//!
//! Status lives in a `watch` channel so a paused step loop can sleep until
//! someone resumes or cancels it instead of polling.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use webhands_protocols::task::{AgentStep, TaskOutput, TaskStatus};

#[derive(Debug, Default)]
struct TaskRecord {
    steps: Vec<AgentStep>,
    output: Option<String>,
    error: Option<String>,
}

/// Shared state of one task.
///
/// Terminal statuses are absorbing: every transition out of `Cancelled`,
/// `Completed` or `Failed` is refused.
#[derive(Debug)]
pub struct TaskState {
    id: String,
    goal: String,
    status: watch::Sender<TaskStatus>,
    record: Mutex<TaskRecord>,
}

impl TaskState {
    pub fn new(id: impl Into<String>, goal: impl Into<String>) -> Self {
        let (status, _) = watch::channel(TaskStatus::Pending);
        Self {
            id: id.into(),
            goal: goal.into(),
            status,
            record: Mutex::new(TaskRecord::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskStatus> {
        self.status.subscribe()
    }

    /// Move to `to` if `allowed(current)` holds and the current status is not
    /// terminal. Returns the status after the call.
    fn transition(&self, to: TaskStatus, allowed: impl Fn(TaskStatus) -> bool) -> TaskStatus {
        self.status.send_if_modified(|current| {
            if current.is_terminal() || !allowed(*current) || *current == to {
                return false;
            }
            debug!("Task {}: {} -> {}", self.id, current, to);
            *current = to;
            true
        });
        self.status()
    }

    /// `Pending` to `Running`.
    pub fn start(&self) -> TaskStatus {
        self.transition(TaskStatus::Running, |s| s == TaskStatus::Pending)
    }

    /// `Running` to `Paused`; no effect otherwise.
    pub fn pause(&self) -> TaskStatus {
        self.transition(TaskStatus::Paused, |s| s == TaskStatus::Running)
    }

    /// `Paused` to `Running`; no effect otherwise.
    pub fn resume(&self) -> TaskStatus {
        self.transition(TaskStatus::Running, |s| s == TaskStatus::Paused)
    }

    /// Any non-terminal status to `Cancelled`.
    pub fn cancel(&self) -> TaskStatus {
        self.transition(TaskStatus::Cancelled, |_| true)
    }

    /// Mark the task completed with its final answer.
    pub fn complete(&self, output: impl Into<String>) -> TaskStatus {
        let status = self.transition(TaskStatus::Completed, |_| true);
        if status == TaskStatus::Completed {
            self.record.lock().output = Some(output.into());
        }
        status
    }

    /// Mark the task failed. The step history is kept.
    pub fn fail(&self, error: impl Into<String>) -> TaskStatus {
        let status = self.transition(TaskStatus::Failed, |_| true);
        if status == TaskStatus::Failed {
            self.record.lock().error = Some(error.into());
        }
        status
    }

    /// Resolve once the task is no longer paused.
    pub async fn wait_while_paused(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|status| *status != TaskStatus::Paused).await;
    }

    /// Resolve once the task reaches a terminal status.
    pub async fn wait_terminal(&self) -> TaskStatus {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|status| status.is_terminal()).await;
        self.status()
    }

    pub fn push_step(&self, step: AgentStep) {
        self.record.lock().steps.push(step);
    }

    pub fn step_count(&self) -> usize {
        self.record.lock().steps.len()
    }

    pub fn steps(&self) -> Vec<AgentStep> {
        self.record.lock().steps.clone()
    }

    pub fn output(&self) -> Option<String> {
        self.record.lock().output.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.record.lock().error.clone()
    }

    pub fn to_output(&self) -> TaskOutput {
        let record = self.record.lock();
        TaskOutput {
            status: self.status(),
            steps: record.steps.clone(),
            output: record.output.clone(),
            error: record.error.clone(),
        }
    }
}
