pub mod rate_limiter;

pub use rate_limiter::RateLimiter;

use std::time::Duration;

use reqwest::{header, Client};

use crate::error::Result;

pub const USER_AGENT: &str = "ptrsync/0.1 (+financial disclosure research)";

/// Plain client used for the House site and PDF downloads.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}
