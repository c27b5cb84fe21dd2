// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Single-attempt authenticated GETs against the Figma REST API, classified into typed outcomes
// role: figma/api
// inputs: access token; API base URL; request URL + query pairs; optional per-request timeout
// outputs: FetchOutcome (data / empty / forbidden / not-found / status / transport / malformed)
// side_effects: Network calls to the configured API base
// invariants:
// - Never panic; every failure mode maps to a FetchOutcome variant
// - No retries: exactly one HTTP attempt per call
// - Token travels in the X-Figma-Token header only
// errors: Classified, never raised; callers decide which outcomes are fatal (see ApiError)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use serde_json::Value;

pub const DEFAULT_API_BASE: &str = "https://api.figma.com/v1";

const USER_AGENT: &str = concat!("figma-library-report/", env!("CARGO_PKG_VERSION"));

/// How many bytes of an undecodable body to echo into logs.
const BODY_SAMPLE_BYTES: usize = 200;

/// Result of a single GET.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
  /// 200 with a decoded JSON body.
  Data(Value),
  /// 200 with an empty or `null` body.
  Empty,
  Forbidden,
  NotFound,
  /// Any other non-200 status.
  Status(u16),
  /// Timeout, DNS, connection reset, unreadable body.
  Transport(String),
  /// 200 whose body is not JSON; carries a short sample of the text.
  Malformed(String),
}

impl FetchOutcome {
  pub fn describe(&self) -> String {
    match self {
      FetchOutcome::Data(_) => "ok".into(),
      FetchOutcome::Empty => "empty response body".into(),
      FetchOutcome::Forbidden => "403 forbidden".into(),
      FetchOutcome::NotFound => "404 not found".into(),
      FetchOutcome::Status(code) => format!("HTTP {}", code),
      FetchOutcome::Transport(msg) => format!("transport error: {}", msg),
      FetchOutcome::Malformed(sample) => format!("invalid JSON body: {}", sample),
    }
  }
}

/// Fatal fetch failures, for the calls where no-data is not an acceptable answer.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
  #[error("Figma API error fetching {what}: {detail}")]
  Fetch { what: String, detail: String },
  #[error("Figma API returned no data for {0}")]
  NoData(String),
}

impl ApiError {
  pub fn from_outcome(what: &str, outcome: &FetchOutcome) -> Self {
    match outcome {
      FetchOutcome::Empty => ApiError::NoData(what.to_string()),
      other => ApiError::Fetch {
        what: what.to_string(),
        detail: other.describe(),
      },
    }
  }
}

// --- Trait seam for the Figma API ---
pub trait FigmaApi {
  /// Base URL without trailing slash, e.g. `https://api.figma.com/v1`.
  fn base_url(&self) -> &str;

  /// One GET of an absolute URL with extra query pairs.
  fn get_json(&self, url: &str, query: &[(&str, String)], timeout: Option<Duration>) -> FetchOutcome;

  /// Absolute URL for an API path such as `files/<key>`.
  fn url_for(&self, path: &str) -> String {
    format!("{}/{}", self.base_url().trim_end_matches('/'), path.trim_start_matches('/'))
  }
}

pub struct HttpFigmaApi {
  token: String,
  base: String,
}

impl HttpFigmaApi {
  pub fn new(token: String, base: Option<String>) -> Self {
    let base = base
      .filter(|b| !b.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    Self {
      token,
      base: base.trim_end_matches('/').to_string(),
    }
  }
}

impl FigmaApi for HttpFigmaApi {
  fn base_url(&self) -> &str {
    &self.base
  }

  fn get_json(&self, url: &str, query: &[(&str, String)], timeout: Option<Duration>) -> FetchOutcome {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .timeout_global(timeout)
      .build()
      .into();

    let mut req = agent
      .get(url)
      .header("Accept", "application/json")
      .header("User-Agent", USER_AGENT)
      .header("X-Figma-Token", &self.token);

    for (k, v) in query {
      req = req.query(*k, v);
    }

    let mut resp = match req.call() {
      Ok(r) => r,
      Err(ureq::Error::Timeout(t)) => return FetchOutcome::Transport(format!("request timed out ({:?})", t)),
      Err(e) => return FetchOutcome::Transport(e.to_string()),
    };

    match resp.status().as_u16() {
      200 => {}
      403 => return FetchOutcome::Forbidden,
      404 => return FetchOutcome::NotFound,
      other => return FetchOutcome::Status(other),
    }

    // File payloads embed the whole document tree; lift ureq's default body cap.
    let text = match resp.body_mut().with_config().limit(u64::MAX).read_to_string() {
      Ok(t) => t,
      Err(e) => return FetchOutcome::Transport(e.to_string()),
    };

    decode_body(&text)
  }
}

/// Decode a 200 body, tolerating any JSON shape.
pub fn decode_body(text: &str) -> FetchOutcome {
  if text.trim().is_empty() {
    return FetchOutcome::Empty;
  }

  match serde_json::from_str::<Value>(text) {
    Ok(Value::Null) => FetchOutcome::Empty,
    Ok(v) => FetchOutcome::Data(v),
    Err(_) => FetchOutcome::Malformed(body_sample(text)),
  }
}

fn body_sample(text: &str) -> String {
  let trimmed = text.trim();

  if trimmed.len() <= BODY_SAMPLE_BYTES {
    return trimmed.to_string();
  }

  let mut end = BODY_SAMPLE_BYTES;

  while !trimmed.is_char_boundary(end) {
    end -= 1;
  }

  format!("{}...", &trimmed[..end])
}
