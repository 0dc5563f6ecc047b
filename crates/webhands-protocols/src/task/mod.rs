//! Task status, step records and variables.

mod output;
mod status;
mod variable;

pub use output::*;
pub use status::*;
pub use variable::*;
