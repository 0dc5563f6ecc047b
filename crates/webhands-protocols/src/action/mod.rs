//! Action abstractions: definitions, executors and their outcomes.

mod context;
mod definition;
mod outcome;
mod traits;

pub use context::*;
pub use definition::*;
pub use outcome::*;
pub use traits::*;
