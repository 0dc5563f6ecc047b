//! Language model provider abstractions.

mod request;
mod response;
mod schema;
mod traits;

pub use request::*;
pub use response::*;
pub use schema::*;
pub use traits::*;
