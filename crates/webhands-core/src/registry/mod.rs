//! Registries for actions and other named components.

mod action;
mod base;

pub use action::ActionRegistry;
pub use base::{BaseRegistry, Registerable, RegistryError};
