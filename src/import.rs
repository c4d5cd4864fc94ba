//! Fixture loading: newline-delimited JSON (or one JSON array) into a collection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::collection::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::utils::json::json_value_to_bson_document;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Skip lines that fail to parse or insert instead of aborting.
    pub skip_errors: bool,
    /// Input is a single JSON array rather than one object per line.
    pub array_mode: bool,
    pub progress_every: Option<u64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { skip_errors: true, array_mode: false, progress_every: Some(1000) }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: u64,
    pub skipped: u64,
}

/// # Errors
/// Returns an error if the file cannot be opened, or whatever [`import_ndjson`] returns.
pub fn import_file(collection: &Collection, path: &Path, opts: &ImportOptions) -> Result<ImportReport, DbError> {
    log::info!("import: path={}, collection={}", path.display(), collection.name());
    let file = File::open(path)?;
    import_ndjson(collection, BufReader::new(file), opts)
}

/// Loads JSON objects from `reader`. Blank lines are ignored.
///
/// # Errors
/// I/O failures always abort. Parse or insert failures abort unless `skip_errors` is set.
pub fn import_ndjson<R: Read>(collection: &Collection, reader: R, opts: &ImportOptions) -> Result<ImportReport, DbError> {
    let mut report = ImportReport::default();
    let mut reader = BufReader::new(reader);
    if opts.array_mode {
        let mut s = String::new();
        reader.read_to_string(&mut s)?;
        let val: Value = serde_json::from_str(&s)?;
        let Value::Array(items) = val else {
            return Err(DbError::bad_request("expected a JSON array"));
        };
        for (i, item) in items.iter().enumerate() {
            insert_one(collection, item, i + 1, opts, &mut report)?;
        }
    } else {
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                Ok(v) => insert_one(collection, &v, i + 1, opts, &mut report)?,
                Err(e) => skip_or_fail(DbError::from(e), i + 1, opts, &mut report)?,
            }
        }
    }
    log::info!(
        "import into {} finished: inserted={} skipped={}",
        collection.name(),
        report.inserted,
        report.skipped
    );
    Ok(report)
}

fn insert_one(
    collection: &Collection,
    value: &Value,
    row: usize,
    opts: &ImportOptions,
    report: &mut ImportReport,
) -> Result<(), DbError> {
    let outcome = json_value_to_bson_document(value)
        .map_err(|e| DbError::bad_request(e.to_string()))
        .and_then(Document::new)
        .and_then(|d| collection.insert_document(d));
    match outcome {
        Ok(_) => {
            report.inserted += 1;
            if let Some(n) = opts.progress_every
                && n > 0
                && report.inserted % n == 0
            {
                log::info!("imported {} records into {}", report.inserted, collection.name());
            }
            Ok(())
        }
        Err(e) => skip_or_fail(e, row, opts, report),
    }
}

fn skip_or_fail(e: DbError, row: usize, opts: &ImportOptions, report: &mut ImportReport) -> Result<(), DbError> {
    if opts.skip_errors {
        log::warn!("import: skipping row {row}: {e}");
        report.skipped += 1;
        Ok(())
    } else {
        Err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_skips_blank_and_bad_lines() {
        let col = Collection::new("products");
        let input = "{\"name\":\"mug\",\"price\":12}\n\n not json\n[1,2]\n{\"name\":\"cup\"}\n";
        let r = import_ndjson(&col, input.as_bytes(), &ImportOptions::default()).unwrap();
        assert_eq!(r, ImportReport { inserted: 2, skipped: 2 });
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn strict_mode_aborts_on_first_error() {
        let col = Collection::new("products");
        let opts = ImportOptions { skip_errors: false, ..ImportOptions::default() };
        let err = import_ndjson(&col, "{\"a\":1}\n{oops\n{\"a\":2}\n".as_bytes(), &opts).unwrap_err();
        assert!(matches!(err, DbError::Json(_)));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn array_mode_and_duplicate_ids() {
        let col = Collection::new("users");
        let opts = ImportOptions { array_mode: true, ..ImportOptions::default() };
        let input = r#"[{"_id":{"$oid":"64b7f0c2a1b2c3d4e5f60718"},"n":1},{"_id":"64b7f0c2a1b2c3d4e5f60718","n":2}]"#;
        let r = import_ndjson(&col, input.as_bytes(), &opts).unwrap();
        assert_eq!(r, ImportReport { inserted: 1, skipped: 1 });
    }

    #[test]
    fn import_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("users.ndjson");
        std::fs::write(&p, "{\"name\":\"ana\"}\n{\"name\":\"ben\"}\n").unwrap();
        let col = Collection::new("users");
        assert_eq!(import_file(&col, &p, &ImportOptions::default()).unwrap().inserted, 2);
    }
}
