// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: fetch-branches subcommand: list the file's branches, classify them, save them as JSON, print counts
// role: processing/branches
// inputs: &dyn FigmaApi; BranchesConfig (file key, output path); the current time for review recency
// outputs: Pretty JSON array of BranchRecord at the output path; status counts on stdout
// side_effects: One network call; creates parent directories; writes one file; prints to stdout
// invariants:
// - Branches keep server order
// - Status is active/archived/merged; explicit status wins over the archived/merged flags
// - Review status is only derived for active branches
// - Dates are reduced to YYYY-MM-DD; unparsable dates are kept as given
// errors: A failed branch fetch or IO error is fatal; a file without branches writes an empty array
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::BranchesConfig;
use crate::ext::serde_json::JsonFetch;
use crate::figma::api::FigmaApi;
use crate::figma::pagination::fetch_branches;
use crate::model::{BranchRecord, BranchStatus};
use crate::render::write_json;

/// Unapproved active branches touched within this many days count as in review.
const REVIEW_WINDOW_DAYS: f64 = 30.0;

const PERSON_FIELDS: [&str; 3] = ["handle", "name", "email"];

pub fn run(api: &dyn FigmaApi, cfg: &BranchesConfig) -> Result<Vec<BranchRecord>> {
  let raw = fetch_branches(api, &cfg.file_key)?;
  println!("Found {} branches", raw.len());

  if raw.is_empty() {
    warn!(file_key = %cfg.file_key, "no branches found; the file may not have any");
  }

  let now = Utc::now();
  let branches: Vec<BranchRecord> = raw.iter().map(|b| map_branch(b, now)).collect();

  write_json(&cfg.output, &branches)?;
  info!(count = branches.len(), path = %cfg.output.display(), "saved branches");

  print!("{}", render_summary(&branches, &cfg.output.display().to_string()));

  Ok(branches)
}

pub fn map_branch(branch: &Value, now: DateTime<Utc>) -> BranchRecord {
  let key = branch.text_of(&["key"]);
  let status = branch_status(branch);
  let review_status = match status {
    BranchStatus::Active => review_status(branch, now),
    _ => None,
  };

  BranchRecord {
    name: Some(branch.text_of(&["name"]))
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| key.clone()),
    key,
    status,
    review_status,
    created_at: first_text(branch, &["created_at", "created", "last_modified"]).map(|d| format_date(&d)),
    created_by: created_by(branch),
    last_modified: first_text(branch, &["last_modified"]).map(|d| format_date(&d)),
    description: first_text(branch, &["description"]),
    thumbnail_url: first_text(branch, &["thumbnail_url", "thumbnailUrl"]),
  }
}

pub fn branch_status(branch: &Value) -> BranchStatus {
  let explicit = branch.fetch("status").text().map(|s| s.to_lowercase());

  match explicit.as_deref() {
    Some("active") => return BranchStatus::Active,
    Some("archived") => return BranchStatus::Archived,
    Some("merged") => return BranchStatus::Merged,
    _ => {}
  }

  if flag(branch, "archived") == Some(true) {
    BranchStatus::Archived
  } else if flag(branch, "merged") == Some(true) {
    BranchStatus::Merged
  } else {
    BranchStatus::Active
  }
}

/// Explicit `review_status`, else `approved`, else recent edits on an unapproved branch.
pub fn review_status(branch: &Value, now: DateTime<Utc>) -> Option<String> {
  if let Some(explicit) = first_text(branch, &["review_status"]) {
    return Some(explicit.to_lowercase());
  }

  match flag(branch, "approved") {
    Some(true) => return Some("approved".to_string()),
    Some(false) => {}
    None => return None,
  }

  let modified = first_text(branch, &["last_modified", "lastModified"]).and_then(|d| parse_instant(&d))?;
  let days = (now - modified).num_seconds() as f64 / 86_400.0;

  (days > 0.0 && days < REVIEW_WINDOW_DAYS).then(|| "in_review".to_string())
}

fn created_by(branch: &Value) -> String {
  if let Some(name) = first_text(branch, &["created_by"]) {
    return name;
  }

  for holder in ["creator", "owner"] {
    if let Some(person) = branch.fetch(holder).value() {
      return Some(person.text_of(&PERSON_FIELDS))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    }
  }

  "Unknown".to_string()
}

fn first_text(branch: &Value, paths: &[&str]) -> Option<String> {
  Some(branch.text_of(paths)).filter(|s| !s.is_empty())
}

fn flag(branch: &Value, path: &str) -> Option<bool> {
  branch.fetch(path).value().and_then(Value::as_bool)
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
  let t = raw.trim();

  DateTime::parse_from_rfc3339(t)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
    })
}

/// `YYYY-MM-DD` in UTC, or the input unchanged when it is not a date.
fn format_date(raw: &str) -> String {
  parse_instant(raw)
    .map(|dt| dt.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| raw.to_string())
}

pub fn render_summary(branches: &[BranchRecord], saved_to: &str) -> String {
  let count = |s: BranchStatus| branches.iter().filter(|b| b.status == s).count();
  let mut out = String::new();

  let _ = writeln!(out, "\nBranches sync complete");
  let _ = writeln!(out, "  Total branches: {}", branches.len());
  let _ = writeln!(out, "  Active: {}", count(BranchStatus::Active));
  let _ = writeln!(out, "  Archived: {}", count(BranchStatus::Archived));
  let _ = writeln!(out, "  Merged: {}", count(BranchStatus::Merged));
  let _ = writeln!(out, "  Saved to: {}", saved_to);

  out
}
