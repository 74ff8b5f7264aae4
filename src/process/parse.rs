// src/process/parse.rs

use anyhow::Result;
use calamine::{Data, Range, Reader, Sheets, Xls, Xlsx};
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use std::io::Cursor;
use tracing::{debug, info, instrument};

use super::raw_table::{Cell, RawTable};
use super::sniff::FeedFormat;
use crate::config::{FeedConfig, SheetSelector};
use crate::error::FeedError;

/// Parse the downloaded bytes into a `RawTable` according to `format`.
#[instrument(level = "info", skip(content, cfg), fields(bytes = content.len()))]
pub fn read_table(format: FeedFormat, content: &[u8], cfg: &FeedConfig) -> Result<RawTable> {
    let table = match format {
        FeedFormat::Csv => read_csv(content, cfg.delimiter, cfg.encoding)?,
        FeedFormat::Xlsx | FeedFormat::Xls => read_workbook(format, content, &cfg.sheet)?,
    };
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "parsed feed"
    );
    Ok(table)
}

/// Decode with `encoding` (a BOM overrides it), then split on `delimiter`.
/// The first record is the header; rows wider than it are rejected.
pub fn read_csv(content: &[u8], delimiter: u8, encoding: &'static Encoding) -> Result<RawTable> {
    let fail = |reason: String| FeedError::parse(FeedFormat::Csv, reason);

    let (text, used, had_errors) = encoding.decode(content);
    if had_errors {
        return Err(fail(format!("content is not valid {}", used.name())).into());
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| fail(format!("header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(fail("no header row".into()).into());
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| fail(format!("record {}: {}", idx + 1, e)))?;
        if record.len() > width {
            return Err(fail(format!(
                "record {}: expected {} fields, saw {}",
                idx + 1,
                width,
                record.len()
            ))
            .into());
        }
        rows.push(record.iter().map(Cell::from).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Open an xlsx/xls workbook from memory and read one sheet.
pub fn read_workbook(format: FeedFormat, content: &[u8], sheet: &SheetSelector) -> Result<RawTable> {
    let fail = |reason: String| FeedError::parse(format, reason);
    let cursor = Cursor::new(content.to_vec());

    let mut workbook: Sheets<Cursor<Vec<u8>>> = match format {
        FeedFormat::Xls => Xls::new(cursor)
            .map(Sheets::Xls)
            .map_err(|e| fail(e.to_string()))?,
        _ => Xlsx::new(cursor)
            .map(Sheets::Xlsx)
            .map_err(|e| fail(e.to_string()))?,
    };

    let names = workbook.sheet_names();
    let name = match sheet {
        SheetSelector::Index(i) => names.get(*i).cloned(),
        SheetSelector::Name(n) => names.iter().find(|s| *s == n).cloned(),
    }
    .ok_or_else(|| fail(format!("sheet {} not found; sheets: {:?}", sheet, names)))?;
    debug!(sheet = %name, "reading worksheet");

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| fail(format!("sheet {:?}: {}", name, e)))?;

    range_to_table(&range).ok_or_else(|| fail(format!("sheet {:?} is empty", name)).into())
}

/// First row becomes the header. `None` for an empty range.
fn range_to_table(range: &Range<Data>) -> Option<RawTable> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows.next()?.iter().map(|c| to_cell(c).to_string()).collect();
    let data = rows.map(|r| r.iter().map(to_cell).collect()).collect();
    Some(RawTable::new(headers, data))
}

/// Native numbers stay numeric so no decimal convention is applied to them;
/// every other cell becomes its display text.
fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::default(),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        other => Cell::Text(other.to_string()),
    }
}
