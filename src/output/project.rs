// src/output/project.rs

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::FromStr;
use tracing::warn;

use crate::process::ProductRecord;

/// The fixed external field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputColumn {
    Sku,
    Name,
    Qty,
    Price,
}

impl OutputColumn {
    pub const ALL: [OutputColumn; 4] = [
        OutputColumn::Sku,
        OutputColumn::Name,
        OutputColumn::Qty,
        OutputColumn::Price,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputColumn::Sku => "sku",
            OutputColumn::Name => "name",
            OutputColumn::Qty => "qty",
            OutputColumn::Price => "price",
        }
    }

    /// CSV cell text; a missing price is an empty field.
    pub fn csv_field(self, record: &ProductRecord) -> String {
        match self {
            OutputColumn::Sku => record.sku.clone(),
            OutputColumn::Name => record.name.clone(),
            OutputColumn::Qty => record.qty.to_string(),
            // shortest round-trip form, always with a fractional part
            OutputColumn::Price => record.price.map(|p| format!("{:?}", p)).unwrap_or_default(),
        }
    }
}

impl FromStr for OutputColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Ordered subset of output columns to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<OutputColumn>,
}

impl Default for Projection {
    fn default() -> Self {
        Projection {
            columns: OutputColumn::ALL.to_vec(),
        }
    }
}

impl Projection {
    /// Resolve `keep_columns` in order. Unknown names are dropped with a
    /// warning; an empty request keeps every column.
    pub fn resolve(requested: &[String]) -> Self {
        if requested.is_empty() {
            return Projection::default();
        }

        let mut columns = Vec::with_capacity(requested.len());
        let mut unknown = Vec::new();
        for name in requested {
            match name.parse::<OutputColumn>() {
                Ok(col) => columns.push(col),
                Err(name) => unknown.push(name),
            }
        }
        if !unknown.is_empty() {
            warn!(?unknown, "keep_columns lists fields that do not exist; skipping them");
        }
        Projection { columns }
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// View `record` through this projection for serialization.
    pub fn view<'a>(&'a self, record: &'a ProductRecord) -> ProjectedRecord<'a> {
        ProjectedRecord {
            record,
            columns: &self.columns,
        }
    }
}

/// Serializes as a map holding only the projected fields, in order.
pub struct ProjectedRecord<'a> {
    record: &'a ProductRecord,
    columns: &'a [OutputColumn],
}

impl Serialize for ProjectedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for col in self.columns {
            match col {
                OutputColumn::Sku => map.serialize_entry("sku", &self.record.sku)?,
                OutputColumn::Name => map.serialize_entry("name", &self.record.name)?,
                OutputColumn::Qty => map.serialize_entry("qty", &self.record.qty)?,
                OutputColumn::Price => map.serialize_entry("price", &self.record.price)?,
            }
        }
        map.end()
    }
}

/// Stable ascending sort by code; equal codes keep their input order.
pub fn sort_records(mut records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    records.sort_by(|a, b| a.sku.cmp(&b.sku));
    records
}
