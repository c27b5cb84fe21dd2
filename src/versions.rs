// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: fetch-versions subcommand: page through version history, save it as JSON, print a summary
// role: processing/versions
// inputs: &dyn FigmaApi; VersionsConfig (file key, output path)
// outputs: Pretty JSON array at the output path; human summary on stdout
// side_effects: Network calls; creates parent directories; writes one file; prints to stdout
// invariants:
// - Records are saved in server order (newest first) exactly as decoded, never reshaped
// - Summary months are newest first and capped at SUMMARY_MONTHS
// - Descriptions are clipped to DESCRIPTION_CLIP chars without splitting UTF-8
// errors: Any version-history fetch failure or IO error is fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::info;

use crate::cli::VersionsConfig;
use crate::ext::serde_json::JsonFetch;
use crate::figma::api::FigmaApi;
use crate::figma::pagination::fetch_version_history;
use crate::render::write_json;

const SUMMARY_MONTHS: usize = 12;
const SUMMARY_RECENT: usize = 5;
const DESCRIPTION_CLIP: usize = 60;
const RULE_WIDTH: usize = 60;

pub fn run(api: &dyn FigmaApi, cfg: &VersionsConfig) -> Result<()> {
  let versions = fetch_version_history(api, &cfg.file_key)?;

  write_json(&cfg.output, &versions)?;
  info!(count = versions.len(), path = %cfg.output.display(), "saved version history");

  println!("Saved {} versions to: {}", versions.len(), cfg.output.display());
  print!("{}", render_summary(&versions));

  Ok(())
}

fn created_at(version: &Value) -> Option<DateTime<FixedOffset>> {
  let raw = version.fetch("created_at").text()?;
  DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Publications per `YYYY-MM`, newest month first.
pub fn monthly_counts(versions: &[Value]) -> Vec<(String, usize)> {
  let mut counts: BTreeMap<String, usize> = BTreeMap::new();

  for dt in versions.iter().filter_map(created_at) {
    *counts.entry(dt.format("%Y-%m").to_string()).or_default() += 1;
  }

  counts.into_iter().rev().take(SUMMARY_MONTHS).collect()
}

pub fn render_summary(versions: &[Value]) -> String {
  let mut out = String::new();

  if versions.is_empty() {
    out.push_str("\nNo versions found\n");
    return out;
  }

  let rule = "=".repeat(RULE_WIDTH);

  let _ = writeln!(out, "\n{}", rule);
  let _ = writeln!(out, "VERSION HISTORY SUMMARY");
  let _ = writeln!(out, "{}", rule);
  let _ = writeln!(out, "\nTotal versions: {}", versions.len());
  let _ = writeln!(out, "\nPublications by month:");

  for (month, count) in monthly_counts(versions) {
    let _ = writeln!(out, "  {}: {} ({})", month, "█".repeat(count), count);
  }

  let _ = writeln!(out, "\nMost recent {} versions:", SUMMARY_RECENT);

  for v in versions.iter().take(SUMMARY_RECENT) {
    let when = created_at(v)
      .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
      .unwrap_or_else(|| "Unknown date".to_string());
    let label = v.fetch("label").text().filter(|l| !l.is_empty());
    let author = v.fetch("user.handle").text().filter(|h| !h.is_empty());

    let _ = writeln!(out, "\n  {}", when);
    let _ = writeln!(out, "     Version: {}", label.as_deref().unwrap_or("(no label)"));
    let _ = writeln!(out, "     By: {}", author.as_deref().unwrap_or("Unknown"));

    if let Some(desc) = v.fetch("description").text().filter(|d| !d.is_empty()) {
      let _ = writeln!(out, "     Description: {}", clip(&desc, DESCRIPTION_CLIP));
    }
  }

  let _ = writeln!(out, "\n{}", rule);
  out
}

fn clip(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((cut, _)) => format!("{}...", &text[..cut]),
    None => text.to_string(),
  }
}
