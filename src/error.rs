// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::process::sniff::FeedFormat;

/// Every fatal condition the pipeline can stop on.
///
/// Library code returns `anyhow::Result` and raises these values, so callers
/// can recover the category with `err.downcast_ref::<FeedError>()`.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid config {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("code list not found: {}", .0.display())]
    CodeListMissing(PathBuf),

    #[error("code list is empty: {}", .0.display())]
    CodeListEmpty(PathBuf),

    #[error("FEED_URL is not set")]
    FeedUrlMissing,

    #[error("downloading {url} failed")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("reading {format} feed failed: {reason}")]
    Parse { format: FeedFormat, reason: String },

    #[error("columns not found: {missing:?}; columns in file: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
}

impl FeedError {
    pub fn parse(format: FeedFormat, reason: impl std::fmt::Display) -> Self {
        FeedError::Parse {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn network(url: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FeedError::Network {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
