//! Browser capability interfaces.

mod locator;
mod traits;

pub use locator::*;
pub use traits::*;
