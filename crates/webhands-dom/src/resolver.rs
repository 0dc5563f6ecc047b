//! Snapshot index to live locator.

use thiserror::Error;

use webhands_protocols::dom::{DomState, InteractiveElement};
use webhands_protocols::error::{ActionError, PageError};
use webhands_protocols::page::{BrowserPage, Locator};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The index is not part of the snapshot the model saw.
    #[error("Element not found")]
    NotInSnapshot(u32),

    /// The page changed and the recorded path no longer matches.
    #[error("Element not found on page")]
    NotOnPage(u32),

    #[error(transparent)]
    Page(#[from] PageError),
}

impl From<ResolveError> for ActionError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotInSnapshot(index) => {
                ActionError::ElementNotFound(format!("no element with index {}", index))
            }
            ResolveError::NotOnPage(index) => {
                ActionError::ElementNotFound(format!("element {} is no longer on the page", index))
            }
            ResolveError::Page(e) => ActionError::Page(e),
        }
    }
}

/// Locator for a recorded element: CSS inside shadow roots, XPath elsewhere,
/// scoped to the owning iframe when there is one.
pub fn locator_for(element: &InteractiveElement) -> Locator {
    let locator = if element.is_under_shadow_root {
        Locator::css(&element.css_path)
    } else {
        Locator::xpath(&element.xpath)
    };
    match &element.frame {
        Some(frame) => locator.within_frame(frame.clone()),
        None => locator,
    }
}

pub fn locate(state: &DomState, index: u32) -> Result<Locator, ResolveError> {
    state
        .element(index)
        .map(locator_for)
        .ok_or(ResolveError::NotInSnapshot(index))
}

/// Resolve an index and check that it still names exactly one element with
/// the recorded tag, id and leading text.
pub async fn resolve_live(
    page: &dyn BrowserPage,
    state: &DomState,
    index: u32,
) -> Result<Locator, ResolveError> {
    let element = state
        .element(index)
        .ok_or(ResolveError::NotInSnapshot(index))?;
    let locator = locator_for(element);

    let info = page.inspect(&locator).await?;
    let tag_matches = info
        .tag
        .as_deref()
        .is_some_and(|tag| tag.eq_ignore_ascii_case(&element.tag));
    let same_element = info
        .fingerprint
        .as_ref()
        .is_some_and(|live| live.normalized() == element.fingerprint);
    if info.count != 1 || !tag_matches || !same_element {
        tracing::debug!(
            "Element {} failed re-validation: {} matches, tag {:?}, fingerprint {:?}",
            index,
            info.count,
            info.tag,
            info.fingerprint
        );
        return Err(ResolveError::NotOnPage(index));
    }
    Ok(locator)
}
