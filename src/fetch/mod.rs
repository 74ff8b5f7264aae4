// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use tracing::{info, instrument};
use url::Url;

use crate::error::FeedError;

/// Upper bound for the whole request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the blocking HTTP client used for the feed download.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building HTTP client")
}

/// GET `url` once and return the raw body.
/// Any transport failure or non-success status is a `FeedError::Network`.
#[instrument(level = "info", skip(client))]
pub fn download_feed(client: &Client, url: &str) -> Result<Vec<u8>> {
    let parsed = Url::parse(url).map_err(|e| FeedError::network(url, e))?;

    info!("downloading feed");
    let start = Instant::now();
    let bytes = client
        .get(parsed)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(|e| FeedError::network(url, e))?;

    info!(bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");
    Ok(bytes.to_vec())
}
