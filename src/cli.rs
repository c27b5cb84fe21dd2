// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Command-line surface (fetch-versions, fetch-branches, generate) and normalization into an EffectiveConfig
// role: cli/config
// inputs: argv; env FIGMA_ACCESS_TOKEN and FIGMA_API_BASE
// outputs: EffectiveConfig with a Connection plus a per-subcommand config
// invariants:
// - A token must be present (flag or env) before any network call
// - File keys are alphanumeric; Figma /file/ and /design/ URLs are reduced to their key
// - Date bounds come in pairs and are validated here, not at fetch time
// - generate output dir is absolute-resolved
// - Library names become folder names with only [A-Za-z0-9_-] kept; blank names map to "default"
// errors: Validation failures bubble as anyhow errors (exit 1)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::util;
use crate::window::DateRange;

pub const DEFAULT_VERSIONS_OUTPUT: &str = "../public/csv/version_history.json";
pub const DEFAULT_BRANCHES_OUTPUT: &str = "../src/data/branches.json";

const VERSIONS_FILE_NAME: &str = "version_history.json";

#[derive(Parser, Debug)]
#[command(
    name = "figma-library-report",
    version,
    about = "Export Figma library metadata, version history and Library Analytics to CSV/JSON",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true, global = true)]
  pub gen_man: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Save the file's full version history as a JSON array
  FetchVersions(VersionsArgs),

  /// Save the file's branches, classified as active, archived or merged
  FetchBranches(BranchesArgs),

  /// Write the eight Library Analytics CSV reports into a directory
  #[command(alias = "main")]
  Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
  /// Figma personal access token
  #[arg(long, env = "FIGMA_ACCESS_TOKEN", hide_env_values = true)]
  pub token: Option<String>,

  /// Library file key, or a figma.com/file/... or /design/... URL
  #[arg(long)]
  pub file_key: String,

  /// Override the API base URL (hidden; tests only)
  #[arg(long, env = "FIGMA_API_BASE", hide = true)]
  pub api_base: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VersionsArgs {
  #[command(flatten)]
  pub source: SourceArgs,

  /// Output JSON file path [default: ../public/csv/version_history.json,
  /// or ../public/csv/<library>/version_history.json with --library-name]
  #[arg(long)]
  pub output: Option<PathBuf>,

  /// Library whose folder under the CSV root receives the history
  #[arg(long)]
  pub library_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BranchesArgs {
  #[command(flatten)]
  pub source: SourceArgs,

  /// Output JSON file path
  #[arg(long, default_value = DEFAULT_BRANCHES_OUTPUT)]
  pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
  #[command(flatten)]
  pub source: SourceArgs,

  /// Directory for the CSV files (created if missing)
  #[arg(long)]
  pub output_dir: PathBuf,

  /// Label for the run summary (default: the file's name)
  #[arg(long)]
  pub library_name: Option<String>,

  /// Inclusive start of the analytics window, YYYY-MM-DD; requires --end-date
  #[arg(long)]
  pub start_date: Option<String>,

  /// Inclusive end of the analytics window, YYYY-MM-DD; requires --start-date
  #[arg(long)]
  pub end_date: Option<String>,
}

/// Credentials and endpoint shared by every subcommand.
#[derive(Serialize)]
pub struct Connection {
  #[serde(skip)]
  pub token: String,
  pub api_base: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionsConfig {
  pub file_key: String,
  pub output: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct BranchesConfig {
  pub file_key: String,
  pub output: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct GenerateConfig {
  pub file_key: String,
  pub output_dir: PathBuf,
  pub library_name: Option<String>,
  pub range: Option<DateRange>,
}

#[derive(Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum EffectiveConfig {
  FetchVersions { connection: Connection, config: VersionsConfig },
  FetchBranches { connection: Connection, config: BranchesConfig },
  Generate { connection: Connection, config: GenerateConfig },
}

static FIGMA_FILE_URL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^https?://(?:[\w-]+\.)?figma\.com/(?:file|design)/([A-Za-z0-9]+)(?:[/?#].*)?$").unwrap());
static RAW_FILE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Accept a bare key or a Figma file/design URL.
pub fn parse_file_key(input: &str) -> Result<String> {
  let t = input.trim();

  if RAW_FILE_KEY.is_match(t) {
    return Ok(t.to_string());
  }

  if let Some(caps) = FIGMA_FILE_URL.captures(t) {
    return Ok(caps[1].to_string());
  }

  bail!("invalid --file-key {:?}: expected a file key or a figma.com/file/<key> or /design/<key> URL", input)
}

/// Folder-safe library name: anything outside `[A-Za-z0-9_-]` becomes `_`.
pub fn sanitize_library_name(name: &str) -> String {
  let cleaned: String = name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
    .collect();

  if cleaned.is_empty() { "default".to_string() } else { cleaned }
}

fn versions_output(output: Option<PathBuf>, library_name: Option<&str>) -> PathBuf {
  match (output, library_name) {
    (Some(path), _) => path,
    (None, Some(name)) => {
      let root = Path::new(DEFAULT_VERSIONS_OUTPUT).parent().unwrap_or(Path::new(""));
      root.join(sanitize_library_name(name)).join(VERSIONS_FILE_NAME)
    }
    (None, None) => PathBuf::from(DEFAULT_VERSIONS_OUTPUT),
  }
}

fn connection(source: &SourceArgs) -> Result<Connection> {
  let token = source.token.as_deref().map(str::trim).unwrap_or_default();

  if token.is_empty() {
    bail!("Missing Figma access token: pass --token or set FIGMA_ACCESS_TOKEN");
  }

  Ok(Connection {
    token: token.to_string(),
    api_base: source.api_base.clone().filter(|b| !b.trim().is_empty()),
  })
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>> {
  match (start, end) {
    (None, None) => Ok(None),
    (Some(s), Some(e)) => Ok(Some(DateRange::parse(s, e)?)),
    _ => bail!("--start-date and --end-date must be given together"),
  }
}

pub fn normalize(command: Command) -> Result<EffectiveConfig> {
  match command {
    Command::FetchVersions(args) => Ok(EffectiveConfig::FetchVersions {
      connection: connection(&args.source)?,
      config: VersionsConfig {
        file_key: parse_file_key(&args.source.file_key)?,
        output: versions_output(args.output, args.library_name.as_deref()),
      },
    }),
    Command::FetchBranches(args) => Ok(EffectiveConfig::FetchBranches {
      connection: connection(&args.source)?,
      config: BranchesConfig {
        file_key: parse_file_key(&args.source.file_key)?,
        output: args.output,
      },
    }),
    Command::Generate(args) => {
      let connection = connection(&args.source)?;
      let file_key = parse_file_key(&args.source.file_key)?;
      let range = date_range(args.start_date.as_deref(), args.end_date.as_deref())?;
      let library_name = args.library_name.filter(|n| !n.trim().is_empty());

      Ok(EffectiveConfig::Generate {
        connection,
        config: GenerateConfig {
          file_key,
          output_dir: PathBuf::from(util::canonicalize_lossy(&args.output_dir)),
          library_name,
          range,
        },
      })
    }
  }
}
