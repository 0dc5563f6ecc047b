//! OpenAI-compatible LLM provider for WebHands.

mod api;
mod converter;
mod parser;
mod provider;

pub use provider::{DEFAULT_BASE_URL, OpenAIProvider};
