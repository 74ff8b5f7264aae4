// src/skus.rs

use anyhow::{Context, Result};
use std::{collections::HashSet, fs, path::Path};
use tracing::{info, instrument};

use crate::error::FeedError;

/// Whitelist of product codes. Entries are stored uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuSet(HashSet<String>);

impl SkuSet {
    /// Parse one code per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .collect()
    }

    /// `code` must already be normalized (trimmed + uppercased).
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Codes are trimmed and uppercased; blank entries are dropped.
impl<S: AsRef<str>> FromIterator<S> for SkuSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkuSet(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

/// Load the code list at `path`. A missing or empty list is fatal.
#[instrument(level = "info", skip(path), fields(skus = %path.display()))]
pub fn load_skus(path: &Path) -> Result<SkuSet> {
    if !path.exists() {
        return Err(FeedError::CodeListMissing(path.to_path_buf()).into());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("reading code list {}", path.display()))?;

    let skus = SkuSet::parse(&text);
    if skus.is_empty() {
        return Err(FeedError::CodeListEmpty(path.to_path_buf()).into());
    }
    info!(count = skus.len(), "loaded codes");
    Ok(skus)
}
