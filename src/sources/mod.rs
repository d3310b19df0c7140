//! Source adapters.
//!
//! One module per upstream index. Each adapter performs one or two
//! HTTP GETs, parses the JSON body, and maps selected fields into a
//! flat record from `crate::types`. Adapters are independent of each
//! other and share no state; any failure (transport, non-2xx status,
//! missing field) surfaces as an `Err` and the run proceeds without
//! that source.

pub mod fx;
pub mod markets;
pub mod prices;
pub mod trending;
pub mod weather;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// User agent sent on every upstream request.
const USER_AGENT: &str = "DAYBRIEF/0.1.0";

/// Per-request timeout shared by all adapters.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Build the HTTP client used by a source adapter.
pub(crate) fn http_client(source: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| format!("Failed to build {source} HTTP client"))
}
