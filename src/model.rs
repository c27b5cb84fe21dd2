// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the fixed-column CSV rows and the branch records consumed by the reporting frontend
// role: model/types
// outputs: Serializable structs with stable field names; CSV field order equals the header constants in reports
// invariants: Row struct field order is the CSV column contract; branch field names match the saved JSON keys
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ComponentActionRow {
  pub component_name: String,
  pub component_set_name: String,
  pub week: String,
  pub insertions: i64,
  pub detachments: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TeamActionRow {
  pub team_name: String,
  pub workspace_name: String,
  pub week: String,
  pub insertions: i64,
  pub detachments: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ComponentUsageRow {
  pub component_name: String,
  pub component_set_name: String,
  pub num_instances: i64,
  pub num_teams_using: i64,
  pub num_files_using: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FileUsageRow {
  pub file_name: String,
  pub component_count: usize,
  pub total_instances: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct VariableTeamRow {
  pub team_name: String,
  pub variable_name: String,
  pub actions: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct VariableActionRow {
  pub variable_name: String,
  pub actions: i64,
  pub week: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StyleActionRow {
  pub style_name: String,
  pub style_type: String,
  pub week: String,
  pub insertions: i64,
  pub detachments: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StyleUsageRow {
  pub style_name: String,
  pub style_type: String,
  pub num_instances: i64,
  pub num_teams_using: i64,
  pub num_files_using: i64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
  Active,
  Archived,
  Merged,
}

/// One entry of the saved branches file. The camelCase fields are read by the frontend as-is.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BranchRecord {
  pub key: String,
  pub name: String,
  pub status: BranchStatus,
  pub review_status: Option<String>,
  pub created_at: Option<String>,
  pub created_by: String,
  #[serde(rename = "lastModified")]
  pub last_modified: Option<String>,
  pub description: Option<String>,
  #[serde(rename = "thumbnailUrl")]
  pub thumbnail_url: Option<String>,
}
