// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch loops for file metadata, branches, version history (next_page URLs) and library analytics (cursors)
// role: figma/pagination
// inputs: &dyn FigmaApi; file key; analytics resource + group_by; optional DateRange
// outputs: File JSON; raw branch list; raw version records in server order; Option<Vec<record>> for analytics (None = no data)
// side_effects: Sequential network calls; tracing logs for soft failures
// invariants:
// - Analytics: 403/404/transport/malformed => None; other status => stop and keep accumulated pages
// - Analytics requests carry ANALYTICS_TIMEOUT; metadata, branches and versions carry no timeout
// - Pages are concatenated in server order; version records are never reshaped or dropped
// - Relative next_page links resolve against the API base; non-link values stop with a warning
// errors: Metadata, branch and version-history failures are fatal (ApiError); analytics never errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ext::serde_json::JsonFetch;
use crate::figma::api::{ApiError, FetchOutcome, FigmaApi};
use crate::figma::normalize::extract_records;
use crate::window::DateRange;

pub const ANALYTICS_TIMEOUT: Duration = Duration::from_secs(30);

/// Library Analytics resource families under `analytics/libraries/<key>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsResource {
  ComponentActions,
  ComponentUsages,
  StyleActions,
  StyleUsages,
  VariableActions,
}

impl AnalyticsResource {
  pub fn path_segment(self) -> &'static str {
    match self {
      AnalyticsResource::ComponentActions => "component/actions",
      AnalyticsResource::ComponentUsages => "component/usages",
      AnalyticsResource::StyleActions => "style/actions",
      AnalyticsResource::StyleUsages => "style/usages",
      AnalyticsResource::VariableActions => "variable/actions",
    }
  }

  /// Usage snapshots are point-in-time and take no date window.
  pub fn accepts_dates(self) -> bool {
    !matches!(self, AnalyticsResource::ComponentUsages | AnalyticsResource::StyleUsages)
  }
}

/// Fetch `files/<key>`. Any non-data outcome is fatal.
pub fn fetch_file(api: &dyn FigmaApi, file_key: &str) -> Result<Value> {
  let url = api.url_for(&format!("files/{}", file_key));
  info!(file_key, "fetching file metadata");

  match api.get_json(&url, &[], None) {
    FetchOutcome::Data(v) => Ok(v),
    other => Err(ApiError::from_outcome("file metadata", &other).into()),
  }
}

/// Fetch `files/<key>?branch_data=true` and return its `branches` list.
/// A file without branches yields an empty list; a failed request is fatal.
pub fn fetch_branches(api: &dyn FigmaApi, file_key: &str) -> Result<Vec<Value>> {
  let url = api.url_for(&format!("files/{}", file_key));
  info!(file_key, "fetching branches");

  let body = match api.get_json(&url, &[("branch_data", "true".to_string())], None) {
    FetchOutcome::Data(v) => v,
    other => return Err(ApiError::from_outcome("branches", &other).into()),
  };

  Ok(
    body
      .fetch("branches")
      .value()
      .and_then(Value::as_array)
      .cloned()
      .unwrap_or_default(),
  )
}

/// Follow `pagination.next_page` URLs until the server stops offering one
/// or a page comes back without versions. Records are kept exactly as served.
pub fn fetch_version_history(api: &dyn FigmaApi, file_key: &str) -> Result<Vec<Value>> {
  let mut url = api.url_for(&format!("files/{}/versions", file_key));
  let mut all: Vec<Value> = Vec::new();
  let mut page = 1usize;

  info!(file_key, "fetching version history");

  loop {
    let body = match api.get_json(&url, &[], None) {
      FetchOutcome::Data(v) => v,
      other => return Err(ApiError::from_outcome("version history", &other).into()),
    };

    let versions = body
      .fetch("versions")
      .value()
      .and_then(Value::as_array)
      .cloned()
      .unwrap_or_default();

    if versions.is_empty() {
      break;
    }

    info!(page, found = versions.len(), total = all.len() + versions.len(), "version page");
    all.extend(versions);

    let link = body
      .fetch("pagination.next_page")
      .value()
      .or_else(|| body.fetch("next_page").value());

    let next = match link {
      None | Some(Value::Bool(false)) => None,
      Some(Value::String(s)) if !s.trim().is_empty() => Some(resolve_next_link(api.base_url(), s.trim())),
      Some(other) => {
        warn!(page, next_page = %other, "version history next_page is not a link; stopping");
        None
      }
    };

    match next {
      Some(n) if n != url => {
        url = n;
        page += 1;
      }
      Some(n) => {
        warn!(page, url = %n, "server repeated the previous next_page; stopping");
        break;
      }
      None => break,
    }
  }

  info!(total = all.len(), pages = page, "version history complete");
  Ok(all)
}

/// Absolute links pass through; `/v1/...` joins the API origin; anything
/// else is taken relative to the API base.
fn resolve_next_link(base: &str, link: &str) -> String {
  if link.starts_with("https://") || link.starts_with("http://") {
    return link.to_string();
  }

  if link.starts_with('/') {
    let origin_end = base
      .find("://")
      .map(|i| i + 3)
      .and_then(|host| base[host..].find('/').map(|j| host + j))
      .unwrap_or(base.len());
    return format!("{}{}", &base[..origin_end], link);
  }

  format!("{}/{}", base.trim_end_matches('/'), link)
}

/// Fetch every page of one analytics grouping. `None` means no data could be
/// obtained at all (forbidden, missing, transport or decode failure).
pub fn fetch_analytics(
  api: &dyn FigmaApi,
  file_key: &str,
  resource: AnalyticsResource,
  group_by: &str,
  range: Option<&DateRange>,
) -> Option<Vec<Value>> {
  let endpoint = format!("analytics/libraries/{}/{}", file_key, resource.path_segment());
  let url = api.url_for(&endpoint);

  let mut records: Vec<Value> = Vec::new();
  let mut cursor: Option<String> = None;
  let mut page = 1usize;

  loop {
    let mut query: Vec<(&str, String)> = vec![("group_by", group_by.to_string())];

    if let Some(r) = range.filter(|_| resource.accepts_dates()) {
      query.push(("start_date", r.start_str()));
      query.push(("end_date", r.end_str()));
    }

    if let Some(c) = &cursor {
      query.push(("cursor", c.clone()));
    }

    let body = match api.get_json(&url, &query, Some(ANALYTICS_TIMEOUT)) {
      FetchOutcome::Data(v) => v,
      FetchOutcome::Empty => {
        debug!(%endpoint, group_by, page, "empty analytics page");
        break;
      }
      FetchOutcome::Forbidden => {
        warn!(%endpoint, group_by, "forbidden, may require elevated plan/scope (library_analytics:read)");
        return None;
      }
      FetchOutcome::NotFound => {
        warn!(%endpoint, group_by, "endpoint not found");
        return None;
      }
      FetchOutcome::Malformed(sample) => {
        warn!(%endpoint, group_by, %sample, "analytics response is not valid JSON");
        return None;
      }
      FetchOutcome::Transport(msg) => {
        warn!(%endpoint, group_by, error = %msg, "analytics request failed");
        return None;
      }
      FetchOutcome::Status(code) => {
        warn!(%endpoint, group_by, status = code, page, "analytics request returned an error status; stopping");

        if records.is_empty() {
          return None;
        }
        break;
      }
    };

    let batch = extract_records(&body);
    debug!(%endpoint, group_by, page, rows = batch.len(), "analytics page");
    records.extend(batch);

    let has_more = body.fetch("next_page").to::<bool>().unwrap_or(false);
    let next_cursor = body.fetch("cursor").text().filter(|c| !c.is_empty());

    match (has_more, next_cursor) {
      (true, Some(c)) if cursor.as_deref() == Some(c.as_str()) => {
        warn!(%endpoint, group_by, cursor = %c, "server repeated the previous cursor; stopping");
        break;
      }
      (true, Some(c)) => {
        cursor = Some(c);
        page += 1;
      }
      _ => break,
    }
  }

  Some(records)
}
