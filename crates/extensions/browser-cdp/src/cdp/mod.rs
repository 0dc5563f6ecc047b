//! Chrome DevTools Protocol (CDP) client.
//!
//! A browser-level WebSocket connection multiplexes one flattened session
//! per page. Requests are matched to responses by id; events are routed to
//! the owning session.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_page(None).await?;
//! page.navigate("https://example.com").await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
