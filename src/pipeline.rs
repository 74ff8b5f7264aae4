// src/pipeline.rs

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::{
    config::{self, FeedConfig},
    error::FeedError,
    fetch,
    output::{self, Projection},
    process::{self, FeedFormat},
    skus::{self, SkuSet},
};

/// Where to find the inputs of a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub skus_path: PathBuf,
    /// Raw `FEED_URL`; blank counts as unset.
    pub feed_url: Option<String>,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub format: FeedFormat,
    pub rows_read: usize,
    pub rows_written: usize,
    pub out_csv: PathBuf,
    pub out_json: PathBuf,
}

/// config → code list → download → process. Stops at the first failure.
#[instrument(level = "info", skip_all)]
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let cfg = config::load_config(&settings.config_path)?;
    let skus = skus::load_skus(&settings.skus_path)?;

    let url = settings
        .feed_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(FeedError::FeedUrlMissing)?;

    let client = fetch::build_client()?;
    let content = fetch::download_feed(&client, url)?;

    process_feed(&cfg, &skus, url, &content)
}

/// Everything after the download: sniff, parse, filter, sort, project, write.
#[instrument(level = "info", skip(cfg, skus, content), fields(bytes = content.len()))]
pub fn process_feed(
    cfg: &FeedConfig,
    skus: &SkuSet,
    url: &str,
    content: &[u8],
) -> Result<RunSummary> {
    let format = process::guess_format(url, content);
    info!(%format, "detected feed format");

    let table = process::read_table(format, content, cfg)?;
    let records = process::filter_records(&table, cfg, skus)?;
    let records = output::sort_records(records);

    let projection = Projection::resolve(&cfg.keep_columns);
    output::write_outputs(&records, &projection, &cfg.out_csv, &cfg.out_json)?;

    Ok(RunSummary {
        format,
        rows_read: table.rows.len(),
        rows_written: records.len(),
        out_csv: cfg.out_csv.clone(),
        out_json: cfg.out_json.clone(),
    })
}
