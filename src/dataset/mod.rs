// Dataset module
// Line-delimited JSON loading and checkpointed saving.

#[cfg(test)]
mod tests;

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// One parsed input line. Enrichment adds fields to the map; every original
/// field is carried through to the output untouched.
pub type Record = Map<String, Value>;

/// Read a line-delimited JSON file into an ordered sequence of records.
///
/// Blank lines are ignored. A line that fails to parse as a JSON object is
/// skipped with a warning and does not abort the load. A missing or unreadable
/// file is an error, so the caller can abort before any service calls.
#[inline]
pub fn load_json_lines(path: &Path) -> crate::Result<Vec<Record>> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(record)) => records.push(record),
            Ok(other) => {
                warn!(
                    "Skipping line {}: expected a JSON object, got {}",
                    line_number + 1,
                    json_type_name(&other)
                );
            }
            Err(e) => {
                warn!("Skipping malformed JSON at line {}: {}", line_number + 1, e);
            }
        }
    }

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Write records as line-delimited JSON, one compact object per line.
///
/// Creates any missing parent directory. serde_json emits UTF-8 without
/// escaping non-ASCII characters, so multilingual text survives byte-for-byte.
#[inline]
pub fn save_json_lines(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Derive the path for a periodic checkpoint from the final output path and
/// the current success count. `out.json` becomes `out_temp_25.json`; a path
/// without an extension gets the suffix appended.
#[inline]
pub fn checkpoint_path(output_path: &Path, count: usize) -> PathBuf {
    match output_path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let stem = output_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            output_path.with_file_name(format!("{stem}_temp_{count}.{ext}"))
        }
        None => {
            let name = output_path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            output_path.with_file_name(format!("{name}_temp_{count}"))
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
