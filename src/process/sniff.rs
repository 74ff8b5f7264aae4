// src/process/sniff.rs

use std::fmt;
use url::Url;

/// How many leading bytes the content fallback inspects.
pub const SNIFF_WINDOW: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// Office Open XML workbook (`.xlsx` / `.xlsm`).
    Xlsx,
    /// Legacy BIFF workbook (`.xls`).
    Xls,
    /// Delimited text.
    Csv,
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedFormat::Xlsx => "xlsx",
            FeedFormat::Xls => "xls",
            FeedFormat::Csv => "csv",
        })
    }
}

/// Decide the feed format from the URL suffix, falling back to content.
///
/// The fallback calls anything with a `,` or `;` in its first 4 KiB CSV and
/// everything else xlsx. Binary workbooks can contain those bytes too, so a
/// suffix-less workbook URL may be misread as CSV.
pub fn guess_format(url: &str, content: &[u8]) -> FeedFormat {
    if let Some(fmt) = format_from_suffix(url) {
        return fmt;
    }
    let head = &content[..content.len().min(SNIFF_WINDOW)];
    if head.iter().any(|b| *b == b',' || *b == b';') {
        FeedFormat::Csv
    } else {
        FeedFormat::Xlsx
    }
}

fn format_from_suffix(url: &str) -> Option<FeedFormat> {
    // query strings and fragments must not hide the extension
    let path = match Url::parse(url) {
        Ok(u) => u.path().to_lowercase(),
        Err(_) => url.to_lowercase(),
    };
    if path.ends_with(".xlsx") || path.ends_with(".xlsm") {
        Some(FeedFormat::Xlsx)
    } else if path.ends_with(".xls") {
        Some(FeedFormat::Xls)
    } else if path.ends_with(".csv") {
        Some(FeedFormat::Csv)
    } else {
        None
    }
}
