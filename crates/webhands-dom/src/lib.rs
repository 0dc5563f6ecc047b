//! # WebHands DOM
//!
//! Turns a live page into a compact, indexed, model-readable snapshot and
//! maps indices back onto the page.
//!
//! - [`DomEngine`] - runs the capture script and builds a [`DomState`]
//! - [`resolver`] - index to locator, with fail-closed re-validation
//! - [`actionability`] - visibility/enabled/stable-box polling before clicks
//!
//! [`DomState`]: webhands_protocols::dom::DomState

pub mod actionability;
pub mod classify;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod path;
pub mod raw;
pub mod resolver;
pub mod serialize;
pub mod snapshot;

#[cfg(test)]
mod test_page;

pub use actionability::{DEFAULT_STABLE_TIMEOUT, wait_for_stable};
pub use engine::{CAPTURE_JS, DomEngine, LISTENER_TRACKER_JS};
pub use error::SnapshotError;
pub use resolver::{ResolveError, locate, locator_for, resolve_live};
pub use snapshot::{SnapshotOptions, build_dom_state};
