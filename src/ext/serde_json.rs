// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups and tolerant field reads over loosely-typed Figma API JSON
// role: extension/serde_json
// outputs: JsonFetch trait, JsonFetched wrapper, and record readers (text/count with alias lists)
// invariants: No panics; missing paths yield None; absent text reads as "" and absent counts as 0
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Borrow the raw value when present and not `null`.
  pub fn value(&self) -> Option<&'a Value> {
    self.inner.filter(|v| !v.is_null())
  }

  /// Render scalars as text: strings verbatim, numbers and booleans via `to_string`.
  pub fn text(&self) -> Option<String> {
    match self.value()? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      Value::Bool(b) => Some(b.to_string()),
      _ => None,
    }
  }

  /// Read a counter that may arrive as an integer, a float, or a numeric string.
  pub fn count(&self) -> Option<i64> {
    match self.value()? {
      Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
      Value::String(s) => {
        let t = s.trim();
        t.parse::<i64>()
          .ok()
          .or_else(|| t.parse::<f64>().ok().map(|f| f.round() as i64))
      }
      _ => None,
    }
  }
}

/// Extension to fetch nested values via dotted paths like "user.handle".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;

  /// First non-empty text among `paths`, or `""`.
  fn text_of(&self, paths: &[&str]) -> String {
    paths
      .iter()
      .filter_map(|p| self.fetch(p).text())
      .find(|s| !s.is_empty())
      .unwrap_or_default()
  }

  /// First readable count among `paths`, or `None` when none is present.
  fn count_of(&self, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|p| self.fetch(p).count())
  }
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
