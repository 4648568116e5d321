//! Iconseek Search - clients for the icon search API and the results-page
//! session that consumes them.
//!
//! [`UpstreamClient`] talks to the third-party API and is what the server
//! proxies through. [`ProxyClient`] is the consumer side: it talks to a
//! running server's `/api/icons` and needs no API key.

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;

pub use client::{IconSearch, ProxyClient, UpstreamClient};
pub use error::SearchError;
pub use protocol::{ErrorBody, SearchResults, FETCH_FAILED_MESSAGE, MISSING_QUERY_MESSAGE};
pub use session::{SearchSession, SearchTicket};
