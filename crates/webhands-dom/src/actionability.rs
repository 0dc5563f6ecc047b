//! Waiting for an element to become safe to interact with.

use std::time::Duration;
use tokio::time::{Instant, sleep};

use webhands_protocols::error::PageError;
use webhands_protocols::page::{BrowserPage, Locator, Rect};

pub const DEFAULT_STABLE_TIMEOUT: Duration = Duration::from_millis(2500);
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll until the element is visible, enabled and its box is unchanged
/// across two consecutive polls.
///
/// Returns `Ok(false)` on timeout; the caller decides whether to proceed.
pub async fn wait_for_stable(
    page: &dyn BrowserPage,
    locator: &Locator,
    timeout: Duration,
) -> Result<bool, PageError> {
    let deadline = Instant::now() + timeout;
    let mut previous: Option<Rect> = None;

    loop {
        let info = page.inspect(locator).await?;
        let ready = info.count > 0 && info.visible && info.enabled;

        match (ready, info.rect) {
            (true, Some(rect)) if previous == Some(rect) => return Ok(true),
            (true, Some(rect)) => previous = Some(rect),
            _ => previous = None,
        }

        if Instant::now() + POLL_INTERVAL > deadline {
            return Ok(false);
        }
        sleep(POLL_INTERVAL).await;
    }
}
