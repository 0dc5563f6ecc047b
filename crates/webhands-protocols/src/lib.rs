//! # WebHands Protocols
//!
//! Protocol definitions (traits) and shared data types for the WebHands
//! browser agent. Contains only interfaces and plain data, no drivers.
//!
//! ## Core Traits
//!
//! - [`BrowserPage`] - Capability interface over a single browser page
//! - [`BrowserProvider`] - Source of fresh pages
//! - [`LLMProvider`] - Language model capability (free-form and structured)
//! - [`Action`] - A named, schema-typed operation the model can request
//! - [`ToolServer`] - External tool server contributing actions

pub mod action;
pub mod dom;
pub mod error;
pub mod page;
pub mod provider;
pub mod task;
pub mod tool_server;
pub mod types;

pub use action::{
    Action, ActionContext, ActionDefinition, ActionOutcome, COMPLETE_ACTION, parse_params,
};
pub use dom::{DomState, InteractiveElement, PageMetrics};
pub use error::{ActionError, AgentError, PageError, ProviderError, ToolServerError};
pub use page::{
    BrowserPage, BrowserProvider, ElementFingerprint, Locator, LocatorInfo, Rect, Selector,
};
pub use provider::{
    CompletionRequest, CompletionResponse, LLMProvider, OutputSchema, StructuredOutputMethod,
};
pub use task::{
    ActionCall, AgentOutput, AgentStep, TaskOutput, TaskStatus, Variable, substitute_variables,
};
pub use tool_server::{ToolServer, ToolServerInfo};
pub use types::*;
