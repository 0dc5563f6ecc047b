//! Conversation types shared by the runtime and the providers.

mod content;
mod message;

pub use content::*;
pub use message::*;
