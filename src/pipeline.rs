// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: generate subcommand: fetch library metadata once, run the eight report writers in order, print a summary
// role: processing/orchestrator
// inputs: &dyn FigmaApi; GenerateConfig (file key, absolute output dir, optional library name and DateRange)
// outputs: Eight CSV files in the output dir; summary of which files hold data on stdout
// side_effects: Creates the output dir; network calls; writes files; prints to stdout
// invariants:
// - Metadata is fetched exactly once and shared read-only by every writer
// - Writers run sequentially in ReportKind::ALL order
// - All eight files exist after a successful run, even when analytics are unavailable
// errors: Metadata fetch failure and local IO errors abort the run; analytics gaps never do
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::GenerateConfig;
use crate::figma::api::FigmaApi;
use crate::figma::pagination::fetch_file;
use crate::metadata::LibraryMetadata;
use crate::reports::{self, ReportContext, ReportKind, ReportOutcome};

pub fn run(api: &dyn FigmaApi, cfg: &GenerateConfig) -> Result<Vec<ReportOutcome>> {
  std::fs::create_dir_all(&cfg.output_dir)
    .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;

  println!("Fetching data from Figma API for file: {}", cfg.file_key);

  let file = fetch_file(api, &cfg.file_key)?;
  let metadata = LibraryMetadata::from_file(&file);

  info!(
    components = metadata.components.len(),
    named = metadata.name_to_key.len(),
    styles = metadata.styles.len(),
    "library metadata loaded"
  );

  let library = library_label(cfg, &metadata);

  if let Some(range) = &cfg.range {
    info!(start = %range.start_str(), end = %range.end_str(), "analytics window");
  }

  let ctx = ReportContext {
    api,
    file_key: &cfg.file_key,
    out_dir: &cfg.output_dir,
    metadata: &metadata,
    range: cfg.range.as_ref(),
  };

  let mut outcomes = Vec::with_capacity(ReportKind::ALL.len());

  for kind in ReportKind::ALL {
    let outcome = reports::generate(kind, &ctx)?;
    println!("Generated: {}", outcome.path.display());
    outcomes.push(outcome);
  }

  print!("{}", render_summary(&library, &cfg.output_dir, &outcomes));

  Ok(outcomes)
}

fn library_label(cfg: &GenerateConfig, metadata: &LibraryMetadata) -> String {
  [cfg.library_name.as_deref(), Some(metadata.file_name.as_str())]
    .into_iter()
    .flatten()
    .find(|s| !s.trim().is_empty())
    .unwrap_or(cfg.file_key.as_str())
    .to_string()
}

pub fn render_summary(library: &str, out_dir: &Path, outcomes: &[ReportOutcome]) -> String {
  let mut out = String::new();
  let with_data = outcomes.iter().filter(|o| o.rows > 0).count();

  let _ = writeln!(out, "\nAll CSV files generated in: {}", out_dir.display());
  let _ = writeln!(out, "Library: {}", library);
  let _ = writeln!(out, "Files with data: {}/{}", with_data, outcomes.len());

  for o in outcomes {
    let note = match (o.rows, o.available) {
      (0, false) => "no data (analytics unavailable)".to_string(),
      (0, true) => "no data".to_string(),
      (1, _) => "1 row".to_string(),
      (n, _) => format!("{} rows", n),
    };

    if o.unresolved > 0 {
      let _ = writeln!(out, "  {:<36} {} ({} unresolved keys)", o.kind.file_name(), note, o.unresolved);
    } else {
      let _ = writeln!(out, "  {:<36} {}", o.kind.file_name(), note);
    }
  }

  out
}
