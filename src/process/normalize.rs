// src/process/normalize.rs

use anyhow::Result;
use tracing::{error, info, instrument};

use super::raw_table::{Cell, RawTable};
use super::record::ProductRecord;
use crate::config::{DecimalSeparator, FeedConfig, SourceColumns};
use crate::error::FeedError;
use crate::skus::SkuSet;

/// Positions of the four source columns inside a `RawTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexes {
    pub sku: usize,
    pub name: usize,
    pub qty: usize,
    pub price: usize,
}

/// Locate every configured column, or report all that are missing at once.
pub fn locate_columns(table: &RawTable, columns: &SourceColumns) -> Result<ColumnIndexes> {
    let mut missing: Vec<String> = Vec::new();
    for name in columns.all() {
        if table.column_index(name).is_none() && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    if !missing.is_empty() {
        error!(?missing, available = ?table.headers, "required columns absent");
        return Err(FeedError::MissingColumns {
            missing,
            available: table.headers.clone(),
        }
        .into());
    }

    // every lookup succeeded above
    let idx = |name: &str| table.column_index(name).unwrap_or_default();
    Ok(ColumnIndexes {
        sku: idx(&columns.sku),
        name: idx(&columns.name),
        qty: idx(&columns.qty),
        price: idx(&columns.price),
    })
}

/// Trim and uppercase a product code.
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Coerce a feed number to `f64`.
///
/// With `Comma`, every `.` is a thousands separator and `,` is the decimal
/// point; with `Dot`, every `,` is a thousands separator. Empty, non-numeric
/// and non-finite input yields `None`.
pub fn to_number(raw: &str, decimal: DecimalSeparator) -> Option<f64> {
    let s = raw.trim();
    let canonical = match decimal {
        DecimalSeparator::Comma => s.replace('.', "").replace(',', "."),
        DecimalSeparator::Dot => s.replace(',', ""),
    };
    canonical
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Numeric value of a cell. Native workbook numbers are taken as they are;
/// only text goes through the decimal-convention rewrite.
pub fn cell_number(cell: &Cell, decimal: DecimalSeparator) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(s) => to_number(s, decimal),
    }
}

/// Quantities truncate toward zero; anything unparseable is 0.
pub fn to_quantity(cell: &Cell, decimal: DecimalSeparator) -> i64 {
    cell_number(cell, decimal)
        .map(|v| v.trunc() as i64)
        .unwrap_or(0)
}

/// Keep the rows whose normalized code is whitelisted, in source order.
#[instrument(level = "info", skip_all, fields(rows = table.rows.len()))]
pub fn filter_records(
    table: &RawTable,
    cfg: &FeedConfig,
    skus: &SkuSet,
) -> Result<Vec<ProductRecord>> {
    let cols = locate_columns(table, &cfg.columns)?;

    let records: Vec<ProductRecord> = table
        .rows
        .iter()
        .filter_map(|row| {
            let sku = normalize_sku(&row[cols.sku].to_string());
            if !skus.contains(&sku) {
                return None;
            }
            Some(ProductRecord {
                sku,
                name: row[cols.name].to_string().trim().to_string(),
                qty: to_quantity(&row[cols.qty], cfg.decimal),
                price: cell_number(&row[cols.price], cfg.decimal),
            })
        })
        .collect();

    info!(kept = records.len(), "filtered by code list");
    Ok(records)
}
