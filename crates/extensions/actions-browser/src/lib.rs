//! # WebHands Browser Actions
//!
//! The default action set a browser agent starts with: navigation, element
//! interaction by snapshot index, keyboard input, scrolling, content
//! extraction, and a couple of reasoning aids the model can call.
//!
//! [`builtin_actions`] returns the list for a given [`ActionFlags`]; nothing
//! here touches a registry.

pub mod actions;
pub mod markdown;

mod flags;

#[cfg(test)]
mod test_support;

pub use actions::*;
pub use flags::{ActionFlags, builtin_actions};
