// src/config.rs

use anyhow::{anyhow, bail, Context, Result};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, instrument};

use crate::error::FeedError;

pub const DEFAULT_OUT_CSV: &str = "public/filtered_products.csv";
pub const DEFAULT_OUT_JSON: &str = "public/filtered_products.json";

/// Which worksheet of a workbook feed to read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{}", i),
            SheetSelector::Name(n) => write!(f, "{:?}", n),
        }
    }
}

/// Decimal symbol used by the feed's numeric columns.
/// The other of `.`/`,` is treated as a thousands separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DecimalSeparator {
    #[default]
    #[serde(rename = ".")]
    Dot,
    #[serde(rename = ",")]
    Comma,
}

/// Source column names for the four fields we extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub sku: String,
    pub name: String,
    pub qty: String,
    pub price: String,
}

impl SourceColumns {
    /// In the order they are reported when missing.
    pub fn all(&self) -> [&str; 4] {
        [
            self.sku.as_str(),
            self.name.as_str(),
            self.qty.as_str(),
            self.price.as_str(),
        ]
    }
}

/// Validated, immutable run settings loaded from `config.yaml`.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub sheet: SheetSelector,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub columns: SourceColumns,
    pub decimal: DecimalSeparator,
    pub out_csv: PathBuf,
    pub out_json: PathBuf,
    /// Requested output columns, unresolved; empty means all.
    pub keep_columns: Vec<String>,
}

/// On-disk shape. `null` and missing keys both fall back to defaults.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    sheet_name: Option<SheetSelector>,
    #[serde(default)]
    delimiter: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    sku_column: String,
    name_column: String,
    qty_column: String,
    price_column: String,
    #[serde(default)]
    decimal: Option<DecimalSeparator>,
    #[serde(default)]
    out_csv: Option<PathBuf>,
    #[serde(default)]
    out_json: Option<PathBuf>,
    #[serde(default = "default_keep_columns")]
    keep_columns: Option<Vec<String>>,
}

fn default_keep_columns() -> Option<Vec<String>> {
    Some(
        ["sku", "name", "qty", "price"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

fn parse_delimiter(raw: Option<&str>) -> Result<u8> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(b','),
        Some(s) => match s.as_bytes() {
            [b] => Ok(*b),
            _ => bail!("delimiter must be a single ASCII character, got {:?}", s),
        },
    }
}

fn parse_encoding(raw: Option<&str>) -> Result<&'static Encoding> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(encoding_rs::UTF_8),
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| anyhow!("unknown encoding {:?}", label)),
    }
}

impl FromStr for FeedConfig {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(text).context("parsing YAML")?;

        Ok(FeedConfig {
            sheet: raw.sheet_name.unwrap_or_default(),
            delimiter: parse_delimiter(raw.delimiter.as_deref())?,
            encoding: parse_encoding(raw.encoding.as_deref())?,
            columns: SourceColumns {
                sku: raw.sku_column,
                name: raw.name_column,
                qty: raw.qty_column,
                price: raw.price_column,
            },
            decimal: raw.decimal.unwrap_or_default(),
            out_csv: raw.out_csv.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_CSV)),
            out_json: raw.out_json.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_JSON)),
            keep_columns: raw.keep_columns.unwrap_or_default(),
        })
    }
}

/// Load and validate the YAML config at `path`.
#[instrument(level = "info", skip(path), fields(config = %path.display()))]
pub fn load_config(path: &Path) -> Result<FeedConfig> {
    if !path.exists() {
        return Err(FeedError::ConfigMissing(path.to_path_buf()).into());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;

    let cfg: FeedConfig = text.parse().map_err(|e: anyhow::Error| FeedError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: format!("{:#}", e),
    })?;

    debug!(?cfg, "config loaded");
    info!(
        encoding = cfg.encoding.name(),
        delimiter = %(cfg.delimiter as char),
        decimal = ?cfg.decimal,
        "config ok"
    );
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
sku_column: Article
name_column: Title
qty_column: Stock
price_column: Price
"#;

    #[test]
    fn defaults_apply_when_keys_absent() -> Result<()> {
        let cfg: FeedConfig = MINIMAL.parse()?;
        assert_eq!(cfg.sheet, SheetSelector::Index(0));
        assert_eq!(cfg.delimiter, b',');
        assert_eq!(cfg.encoding, encoding_rs::UTF_8);
        assert_eq!(cfg.decimal, DecimalSeparator::Dot);
        assert_eq!(cfg.out_csv, PathBuf::from(DEFAULT_OUT_CSV));
        assert_eq!(cfg.out_json, PathBuf::from(DEFAULT_OUT_JSON));
        assert_eq!(cfg.keep_columns, vec!["sku", "name", "qty", "price"]);
        assert_eq!(cfg.columns.all(), ["Article", "Title", "Stock", "Price"]);
        Ok(())
    }

    #[test]
    fn explicit_values_override_defaults() -> Result<()> {
        let text = format!(
            "{}\nsheet_name: Prices\ndelimiter: \";\"\nencoding: cp1251\ndecimal: \",\"\n\
             out_csv: out/a.csv\nout_json: out/a.json\nkeep_columns: [sku, price]\n",
            MINIMAL
        );
        let cfg: FeedConfig = text.parse()?;
        assert_eq!(cfg.sheet, SheetSelector::Name("Prices".into()));
        assert_eq!(cfg.delimiter, b';');
        assert_eq!(cfg.encoding, encoding_rs::WINDOWS_1251);
        assert_eq!(cfg.decimal, DecimalSeparator::Comma);
        assert_eq!(cfg.out_csv, PathBuf::from("out/a.csv"));
        assert_eq!(cfg.keep_columns, vec!["sku", "price"]);
        Ok(())
    }

    #[test]
    fn null_values_fall_back() -> Result<()> {
        let text = format!(
            "{}\nsheet_name: 2\ndelimiter: null\nencoding: \"\"\nkeep_columns: null\n",
            MINIMAL
        );
        let cfg: FeedConfig = text.parse()?;
        assert_eq!(cfg.sheet, SheetSelector::Index(2));
        assert_eq!(cfg.delimiter, b',');
        assert_eq!(cfg.encoding, encoding_rs::UTF_8);
        assert!(cfg.keep_columns.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        let multi = format!("{}\ndelimiter: \";;\"\n", MINIMAL);
        assert!(multi.parse::<FeedConfig>().is_err());

        let enc = format!("{}\nencoding: klingon\n", MINIMAL);
        assert!(enc.parse::<FeedConfig>().is_err());

        let dec = format!("{}\ndecimal: \"'\"\n", MINIMAL);
        assert!(dec.parse::<FeedConfig>().is_err());

        assert!("name_column: x\n".parse::<FeedConfig>().is_err());
    }

    #[test]
    fn load_reports_missing_and_invalid_files() -> Result<()> {
        let dir = tempdir()?;

        let missing = dir.path().join("config.yaml");
        let err = load_config(&missing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::ConfigMissing(p)) if p == &missing
        ));

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "sku_column: [unterminated")?;
        let err = load_config(&bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::ConfigInvalid { .. })
        ));

        let good = dir.path().join("good.yaml");
        fs::write(&good, MINIMAL)?;
        assert_eq!(load_config(&good)?.columns.sku, "Article");
        Ok(())
    }
}
