// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: The eight Library Analytics CSV reports: endpoint, grouping, week filter, row projection and aggregation
// role: reports/writers
// inputs: ReportContext (api, file key, output dir, metadata, optional DateRange)
// outputs: One CSV per ReportKind under the output dir; ReportOutcome summaries
// side_effects: Network calls via figma::pagination; writes CSV files
// invariants:
// - Header columns per ReportKind are an external contract (frontend reads them by name)
// - Unavailable analytics (403/404/transport) produce a header-only file, never an error
// - usages_by_file sums instances per file and counts each component once per file
// - Every other report emits exactly one row per kept record
// errors: Only local IO errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::ext::serde_json::JsonFetch;
use crate::figma::api::FigmaApi;
use crate::figma::pagination::{AnalyticsResource, fetch_analytics};
use crate::metadata::LibraryMetadata;
use crate::model::{
  ComponentActionRow, ComponentUsageRow, FileUsageRow, StyleActionRow, StyleUsageRow, TeamActionRow, VariableActionRow,
  VariableTeamRow,
};
use crate::render::write_csv;
use crate::window::{DateRange, WeekFilter};

// Field aliases seen across endpoint/grouping combinations.
const INSERTIONS: &[&str] = &["insertions", "num_insertions"];
const DETACHMENTS: &[&str] = &["detachments", "num_detachments"];
const INSTANCES: &[&str] = &["instances", "num_instances", "usages"];
const TEAMS_USING: &[&str] = &["num_teams_using", "teams_using"];
const FILES_USING: &[&str] = &["num_files_using", "files_using"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
  ActionsByComponent,
  ActionsByTeam,
  UsagesByComponent,
  UsagesByFile,
  VariableActionsByTeam,
  VariableActionsByVariable,
  StyleActionsByStyle,
  StyleUsagesByStyle,
}

impl ReportKind {
  /// Generation order.
  pub const ALL: [ReportKind; 8] = [
    ReportKind::ActionsByComponent,
    ReportKind::ActionsByTeam,
    ReportKind::UsagesByComponent,
    ReportKind::UsagesByFile,
    ReportKind::VariableActionsByTeam,
    ReportKind::VariableActionsByVariable,
    ReportKind::StyleActionsByStyle,
    ReportKind::StyleUsagesByStyle,
  ];

  pub fn file_name(self) -> &'static str {
    match self {
      ReportKind::ActionsByComponent => "actions_by_component.csv",
      ReportKind::ActionsByTeam => "actions_by_team.csv",
      ReportKind::UsagesByComponent => "usages_by_component.csv",
      ReportKind::UsagesByFile => "usages_by_file.csv",
      ReportKind::VariableActionsByTeam => "variable_actions_by_team.csv",
      ReportKind::VariableActionsByVariable => "variable_actions_by_variable.csv",
      ReportKind::StyleActionsByStyle => "style_actions_by_style.csv",
      ReportKind::StyleUsagesByStyle => "style_usages_by_style.csv",
    }
  }

  pub fn header(self) -> &'static [&'static str] {
    match self {
      ReportKind::ActionsByComponent => &["component_name", "component_set_name", "week", "insertions", "detachments"],
      ReportKind::ActionsByTeam => &["team_name", "workspace_name", "week", "insertions", "detachments"],
      ReportKind::UsagesByComponent => &[
        "component_name",
        "component_set_name",
        "num_instances",
        "num_teams_using",
        "num_files_using",
      ],
      ReportKind::UsagesByFile => &["file_name", "component_count", "total_instances"],
      ReportKind::VariableActionsByTeam => &["team_name", "variable_name", "actions"],
      ReportKind::VariableActionsByVariable => &["variable_name", "actions", "week"],
      ReportKind::StyleActionsByStyle => &["style_name", "style_type", "week", "insertions", "detachments"],
      ReportKind::StyleUsagesByStyle => &["style_name", "style_type", "num_instances", "num_teams_using", "num_files_using"],
    }
  }

  pub fn resource(self) -> AnalyticsResource {
    match self {
      ReportKind::ActionsByComponent | ReportKind::ActionsByTeam => AnalyticsResource::ComponentActions,
      ReportKind::UsagesByComponent | ReportKind::UsagesByFile => AnalyticsResource::ComponentUsages,
      ReportKind::VariableActionsByTeam | ReportKind::VariableActionsByVariable => AnalyticsResource::VariableActions,
      ReportKind::StyleActionsByStyle => AnalyticsResource::StyleActions,
      ReportKind::StyleUsagesByStyle => AnalyticsResource::StyleUsages,
    }
  }

  pub fn group_by(self) -> &'static str {
    match self {
      ReportKind::ActionsByComponent | ReportKind::UsagesByComponent => "component",
      ReportKind::ActionsByTeam | ReportKind::VariableActionsByTeam => "team",
      ReportKind::UsagesByFile => "file",
      ReportKind::VariableActionsByVariable => "variable",
      ReportKind::StyleActionsByStyle | ReportKind::StyleUsagesByStyle => "style",
    }
  }

  /// Action reports are weekly series; usage reports are snapshots.
  pub fn filters_by_week(self) -> bool {
    self.resource().accepts_dates()
  }
}

pub struct ReportContext<'a> {
  pub api: &'a dyn FigmaApi,
  pub file_key: &'a str,
  pub out_dir: &'a Path,
  pub metadata: &'a LibraryMetadata,
  pub range: Option<&'a DateRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
  pub kind: ReportKind,
  pub path: PathBuf,
  pub rows: usize,
  /// False when the endpoint answered 403/404 or could not be reached.
  pub available: bool,
  pub unresolved: usize,
}

/// Fetch, filter, project and write one report.
pub fn generate(kind: ReportKind, ctx: &ReportContext<'_>) -> Result<ReportOutcome> {
  info!(report = kind.file_name(), group_by = kind.group_by(), "generating report");

  let fetched = fetch_analytics(ctx.api, ctx.file_key, kind.resource(), kind.group_by(), ctx.range);
  let available = fetched.is_some();
  let records = fetched.unwrap_or_default();

  let week_range = ctx.range.filter(|_| kind.filters_by_week());
  let mut filter = WeekFilter::new(week_range, kind.file_name());
  let kept: Vec<&Value> = records
    .iter()
    .filter(|r| filter.includes(r.fetch("week").text().as_deref()))
    .collect();

  if filter.unparsed() > 0 {
    warn!(report = kind.file_name(), count = filter.unparsed(), "records kept despite unreadable week");
  }

  let path = ctx.out_dir.join(kind.file_name());
  let header = kind.header();
  let meta = ctx.metadata;
  let mut unresolved: BTreeSet<String> = BTreeSet::new();

  let rows = match kind {
    ReportKind::ActionsByComponent => write_csv(&path, header, &component_action_rows(&kept, meta, &mut unresolved))?,
    ReportKind::ActionsByTeam => write_csv(&path, header, &team_action_rows(&kept))?,
    ReportKind::UsagesByComponent => write_csv(&path, header, &component_usage_rows(&kept, meta, &mut unresolved))?,
    ReportKind::UsagesByFile => write_csv(&path, header, &file_usage_rows(&kept))?,
    ReportKind::VariableActionsByTeam => write_csv(&path, header, &variable_team_rows(&kept))?,
    ReportKind::VariableActionsByVariable => write_csv(&path, header, &variable_action_rows(&kept))?,
    ReportKind::StyleActionsByStyle => write_csv(&path, header, &style_action_rows(&kept, meta))?,
    ReportKind::StyleUsagesByStyle => write_csv(&path, header, &style_usage_rows(&kept, meta))?,
  };

  if !unresolved.is_empty() {
    warn!(
      report = kind.file_name(),
      count = unresolved.len(),
      "component keys not found in file metadata; raw keys used as names"
    );
  }

  info!(report = kind.file_name(), rows, fetched = records.len(), "report written");

  Ok(ReportOutcome {
    kind,
    path,
    rows,
    available,
    unresolved: unresolved.len(),
  })
}

fn count(record: &Value, aliases: &[&str]) -> i64 {
  record.count_of(aliases).unwrap_or(0)
}

fn week(record: &Value) -> String {
  record.text_of(&["week"])
}

/// Explicit `actions` when reported, otherwise insertions + detachments.
fn actions(record: &Value) -> i64 {
  record
    .count_of(&["actions"])
    .unwrap_or_else(|| count(record, INSERTIONS) + count(record, DETACHMENTS))
}

fn variable_name(record: &Value) -> String {
  record.text_of(&["variable_name", "variable_key"])
}

pub fn component_action_rows(
  records: &[&Value],
  meta: &LibraryMetadata,
  unresolved: &mut BTreeSet<String>,
) -> Vec<ComponentActionRow> {
  records
    .iter()
    .map(|r| {
      let c = meta.resolve_component(r, unresolved);
      ComponentActionRow {
        component_name: c.name,
        component_set_name: c.component_set,
        week: week(r),
        insertions: count(r, INSERTIONS),
        detachments: count(r, DETACHMENTS),
      }
    })
    .collect()
}

pub fn team_action_rows(records: &[&Value]) -> Vec<TeamActionRow> {
  records
    .iter()
    .map(|r| TeamActionRow {
      team_name: r.text_of(&["team_name"]),
      workspace_name: r.text_of(&["workspace_name"]),
      week: week(r),
      insertions: count(r, INSERTIONS),
      detachments: count(r, DETACHMENTS),
    })
    .collect()
}

pub fn component_usage_rows(
  records: &[&Value],
  meta: &LibraryMetadata,
  unresolved: &mut BTreeSet<String>,
) -> Vec<ComponentUsageRow> {
  records
    .iter()
    .map(|r| {
      let c = meta.resolve_component(r, unresolved);
      ComponentUsageRow {
        component_name: c.name,
        component_set_name: c.component_set,
        num_instances: count(r, INSTANCES),
        num_teams_using: count(r, TEAMS_USING),
        num_files_using: count(r, FILES_USING),
      }
    })
    .collect()
}

/// Per-file totals in first-seen order. A component (by key, else by name)
/// counts once per file however many records mention it.
pub fn file_usage_rows(records: &[&Value]) -> Vec<FileUsageRow> {
  #[derive(Default)]
  struct FileAcc {
    components: HashSet<String>,
    total: i64,
  }

  let mut order: Vec<String> = Vec::new();
  let mut by_file: HashMap<String, FileAcc> = HashMap::new();

  for r in records {
    let file = r.text_of(&["file_name"]);
    let acc = by_file.entry(file.clone()).or_insert_with(|| {
      order.push(file.clone());
      FileAcc::default()
    });

    acc.total += count(r, INSTANCES);

    let component = r.text_of(&["component_key", "component_name"]);

    if !component.is_empty() {
      acc.components.insert(component);
    }
  }

  order
    .into_iter()
    .filter_map(|file| {
      let acc = by_file.remove(&file)?;
      Some(FileUsageRow {
        file_name: file,
        component_count: acc.components.len(),
        total_instances: acc.total,
      })
    })
    .collect()
}

pub fn variable_team_rows(records: &[&Value]) -> Vec<VariableTeamRow> {
  records
    .iter()
    .map(|r| VariableTeamRow {
      team_name: r.text_of(&["team_name"]),
      variable_name: variable_name(r),
      actions: actions(r),
    })
    .collect()
}

pub fn variable_action_rows(records: &[&Value]) -> Vec<VariableActionRow> {
  records
    .iter()
    .map(|r| VariableActionRow {
      variable_name: variable_name(r),
      actions: actions(r),
      week: week(r),
    })
    .collect()
}

pub fn style_action_rows(records: &[&Value], meta: &LibraryMetadata) -> Vec<StyleActionRow> {
  records
    .iter()
    .map(|r| {
      let s = meta.resolve_style(r);
      StyleActionRow {
        style_name: s.name,
        style_type: s.style_type,
        week: week(r),
        insertions: count(r, INSERTIONS),
        detachments: count(r, DETACHMENTS),
      }
    })
    .collect()
}

pub fn style_usage_rows(records: &[&Value], meta: &LibraryMetadata) -> Vec<StyleUsageRow> {
  records
    .iter()
    .map(|r| {
      let s = meta.resolve_style(r);
      StyleUsageRow {
        style_name: s.name,
        style_type: s.style_type,
        num_instances: count(r, INSTANCES),
        num_teams_using: count(r, TEAMS_USING),
        num_files_using: count(r, FILES_USING),
      }
    })
    .collect()
}
