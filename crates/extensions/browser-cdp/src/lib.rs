//! # WebHands Browser (CDP)
//!
//! [`BrowserProvider`](webhands_protocols::BrowserProvider) backed by a
//! Chromium-family browser over the Chrome DevTools Protocol.
//!
//! The browser is reached lazily on the first page request: an explicit
//! endpoint is used as is, otherwise `http://127.0.0.1:{debug_port}` is
//! probed and, when nothing answers and launching is allowed, a browser is
//! started with remote debugging on that port.

pub mod cdp;

mod browser;
mod keys;
mod locator;
mod page;

#[cfg(test)]
mod test_support;

pub use browser::{CdpBrowser, CdpBrowserConfig};
pub use cdp::{CdpClient, CdpError, PageSession};
pub use page::CdpPage;
