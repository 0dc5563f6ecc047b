//! Built-in actions.

mod click;
mod extract;
mod input;
mod key_press;
mod navigation;
mod pdf;
mod reasoning;
mod scroll;
mod select;

pub use click::ClickElementAction;
pub use extract::ExtractAction;
pub use input::InputTextAction;
pub use key_press::{KeyPressAction, translate_key};
pub use navigation::{GoToUrlAction, PageBackAction, PageForwardAction, RefreshPageAction};
pub use pdf::PdfAction;
pub use reasoning::{TaskCompleteValidationAction, ThinkAction};
pub use scroll::ScrollAction;
pub use select::SelectOptionAction;

use webhands_dom::ResolveError;
use webhands_protocols::{ActionError, ActionOutcome};

/// Map a resolution failure to the outcome the model sees.
///
/// Snapshot misses are reported, not raised; page errors propagate.
pub(crate) fn unresolved(err: ResolveError) -> Result<ActionOutcome, ActionError> {
    match err {
        ResolveError::NotInSnapshot(_) | ResolveError::NotOnPage(_) => {
            Ok(ActionOutcome::failure(err.to_string()))
        }
        ResolveError::Page(e) => Err(e.into()),
    }
}
