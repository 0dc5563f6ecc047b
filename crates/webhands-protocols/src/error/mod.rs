//! Error types for the WebHands protocol layer.

mod action;
mod agent;
mod page;
mod provider;
mod tool_server;

pub use action::*;
pub use agent::*;
pub use page::*;
pub use provider::*;
pub use tool_server::*;
