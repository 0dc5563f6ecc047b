//! # WebHands Runtime
//!
//! Runs browser tasks: the step loop, its task state machine and control
//! handle, model message assembly, and retries.

pub mod agent;
pub mod complete;
pub mod control;
pub mod debug;
pub mod messages;
pub mod prompts;
pub mod retry;
pub mod step_loop;
pub mod task;
pub mod variables;

#[cfg(test)]
mod test_support;

pub use agent::{AgentSettings, TaskParams, WebAgent};
pub use complete::{CompleteAction, StructuredCompleteAction};
pub use control::TaskControl;
pub use messages::{StepInput, build_step_messages};
pub use retry::{RetryConfig, retry};
pub use step_loop::{StepLoop, StepLoopConfig, TaskHooks};
pub use task::TaskState;
pub use variables::VariableStore;
