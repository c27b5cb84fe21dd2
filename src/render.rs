// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Write report rows to CSV and version history or branch lists to pretty JSON
// role: persistence/render
// inputs: Output path; fixed header; Serialize rows; raw version records or branch records
// outputs: UTF-8 CSV (comma, one header row) and UTF-8 pretty-printed JSON files
// side_effects: Creates parent directories; overwrites target files
// invariants:
// - The header row is written before any data, so zero-row files still parse
// - Rows never emit their own header (has_headers=false)
// errors: IO/serialization errors bubble with the file path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Write `header` then each row; returns the number of data rows written.
pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<usize> {
  ensure_parent(path)?;

  let mut wtr = csv::WriterBuilder::new()
    .has_headers(false)
    .from_path(path)
    .with_context(|| format!("creating {}", path.display()))?;

  wtr
    .write_record(header)
    .with_context(|| format!("writing header to {}", path.display()))?;

  for row in rows {
    wtr
      .serialize(row)
      .with_context(|| format!("writing row to {}", path.display()))?;
  }

  wtr.flush().with_context(|| format!("flushing {}", path.display()))?;

  Ok(rows.len())
}

/// Pretty JSON (two-space indent) plus a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
  ensure_parent(path)?;

  let mut bytes = serde_json::to_vec_pretty(value).with_context(|| format!("serializing {}", path.display()))?;
  bytes.push(b'\n');

  std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent.display()))?;
  }
  Ok(())
}
