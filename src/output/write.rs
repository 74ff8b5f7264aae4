// src/output/write.rs

use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};

use super::project::Projection;
use crate::process::ProductRecord;

/// Comma-delimited text with a header row. An empty projection yields an
/// empty file.
pub fn render_csv(records: &[ProductRecord], projection: &Projection) -> Result<Vec<u8>> {
    if projection.is_empty() {
        return Ok(Vec::new());
    }

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(projection.columns().iter().map(|c| c.as_str()))
        .context("writing CSV header")?;
    for record in records {
        wtr.write_record(projection.columns().iter().map(|c| c.csv_field(record)))
            .with_context(|| format!("writing CSV row for {}", record.sku))?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("flushing CSV buffer: {}", e.error()))
}

/// Pretty JSON array of objects, non-ASCII kept as is, trailing newline.
pub fn render_json(records: &[ProductRecord], projection: &Projection) -> Result<Vec<u8>> {
    let views: Vec<_> = records.iter().map(|r| projection.view(r)).collect();
    let mut buf = serde_json::to_vec_pretty(&views).context("serializing JSON")?;
    buf.push(b'\n');
    Ok(buf)
}

/// Hidden temp sibling of `path`.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("output path {:?} has no file name", path))?
        .to_string_lossy();
    Ok(path.with_file_name(format!(".{}.tmp", file_name)))
}

/// Write `bytes` next to `path` without touching `path` itself.
fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let tmp_path = temp_path(path)?;
    if let Err(e) = fs::write(&tmp_path, bytes) {
        discard(&tmp_path);
        return Err(e).with_context(|| format!("creating {:?}", tmp_path));
    }
    Ok(tmp_path)
}

fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp_path, path).with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
}

/// Best-effort removal during rollback; the original error is what gets reported.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove");
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).with_context(|| format!("creating directory {:?}", dir))
        }
        _ => Ok(()),
    }
}

/// Render both outputs in memory, stage both as temp files, then rename them
/// into place. Nothing touches the disk if rendering fails. A failed write or
/// rename removes every file this call created, including a placed CSV.
#[instrument(level = "info", skip(records, projection), fields(rows = records.len()))]
pub fn write_outputs(
    records: &[ProductRecord],
    projection: &Projection,
    out_csv: &Path,
    out_json: &Path,
) -> Result<()> {
    let csv_bytes = render_csv(records, projection)?;
    let json_bytes = render_json(records, projection)?;

    ensure_parent(out_csv)?;
    ensure_parent(out_json)?;

    let csv_tmp = stage(out_csv, &csv_bytes)?;
    let json_tmp = match stage(out_json, &json_bytes) {
        Ok(p) => p,
        Err(e) => {
            discard(&csv_tmp);
            return Err(e);
        }
    };

    if let Err(e) = commit(&csv_tmp, out_csv) {
        discard(&csv_tmp);
        discard(&json_tmp);
        return Err(e);
    }
    debug!(path = %out_csv.display(), bytes = csv_bytes.len(), "wrote CSV");

    if let Err(e) = commit(&json_tmp, out_json) {
        discard(&json_tmp);
        discard(out_csv);
        return Err(e);
    }
    debug!(path = %out_json.display(), bytes = json_bytes.len(), "wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        sku: String,
        name: String,
        qty: i64,
        price: Option<f64>,
    }

    fn sample() -> Vec<ProductRecord> {
        vec![
            ProductRecord {
                sku: "A1".into(),
                name: "Чайник, 2 л".into(),
                qty: 3,
                price: Some(1234.56),
            },
            ProductRecord {
                sku: "B2".into(),
                name: "Bolt \"M6\"".into(),
                qty: 0,
                price: None,
            },
        ]
    }

    #[test]
    fn csv_layout() -> Result<()> {
        let csv = String::from_utf8(render_csv(&sample(), &Projection::default())?)?;
        assert_eq!(
            csv,
            "sku,name,qty,price\nA1,\"Чайник, 2 л\",3,1234.56\nB2,\"Bolt \"\"M6\"\"\",0,\n"
        );
        Ok(())
    }

    #[test]
    fn json_layout_is_indented_and_keeps_unicode() -> Result<()> {
        let keep = vec!["sku".to_string(), "price".to_string()];
        let json = String::from_utf8(render_json(&sample()[..1], &Projection::resolve(&keep))?)?;
        assert_eq!(
            json,
            "[\n  {\n    \"sku\": \"A1\",\n    \"price\": 1234.56\n  }\n]\n"
        );

        let all = String::from_utf8(render_json(&sample(), &Projection::default())?)?;
        assert!(all.contains("Чайник"));
        assert!(all.contains("\"price\": null"));
        Ok(())
    }

    #[test]
    fn empty_projection_and_empty_records() -> Result<()> {
        let none = Projection::resolve(&["bogus".to_string()]);
        assert!(render_csv(&sample(), &none)?.is_empty());
        assert_eq!(render_json(&[], &Projection::default())?, b"[]\n");
        Ok(())
    }

    #[test]
    fn json_and_csv_hold_the_same_records() -> Result<()> {
        let dir = tempdir()?;
        let out_csv = dir.path().join("a/b/out.csv");
        let out_json = dir.path().join("c/out.json");
        write_outputs(&sample(), &Projection::default(), &out_csv, &out_json)?;

        let mut rdr = csv::Reader::from_path(&out_csv)?;
        let from_csv: Vec<Row> = rdr.deserialize().collect::<Result<_, _>>()?;
        let from_json: Vec<Row> = serde_json::from_slice(&fs::read(&out_json)?)?;

        assert_eq!(from_csv, from_json);
        assert_eq!(from_csv.len(), 2);
        assert_eq!(from_csv[1].price, None);
        Ok(())
    }

    #[test]
    fn overwrites_existing_outputs_without_leaving_temp_files() -> Result<()> {
        let dir = tempdir()?;
        let out_csv = dir.path().join("out.csv");
        let out_json = dir.path().join("out.json");
        fs::write(&out_csv, "stale")?;

        write_outputs(&sample(), &Projection::default(), &out_csv, &out_json)?;

        assert!(fs::read_to_string(&out_csv)?.starts_with("sku,name,qty,price\n"));
        assert!(temp_files_in(dir.path())?.is_empty());
        Ok(())
    }

    fn temp_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().ends_with(".tmp"))
            .collect())
    }

    #[test]
    fn failed_json_rename_leaves_no_csv_behind() -> Result<()> {
        let dir = tempdir()?;
        let out_csv = dir.path().join("out.csv");
        let out_json = dir.path().join("out.json");
        fs::create_dir(&out_json)?;
        fs::write(out_json.join("occupied"), "x")?;

        let err = write_outputs(&sample(), &Projection::default(), &out_csv, &out_json);
        assert!(err.is_err());

        assert!(!out_csv.exists());
        assert!(temp_files_in(dir.path())?.is_empty());
        assert!(out_json.join("occupied").exists());
        Ok(())
    }
}
