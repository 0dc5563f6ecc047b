//! # WebHands Core
//!
//! Registries shared by the agent runtime.
//!
//! - [`BaseRegistry`] - insertion-ordered, thread-safe map of named items
//! - [`ActionRegistry`] - action lookup, dispatch and model-facing schema

pub mod registry;

pub use registry::{ActionRegistry, BaseRegistry, Registerable, RegistryError};
