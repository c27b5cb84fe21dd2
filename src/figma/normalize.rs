// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extract the record list from differently-shaped analytics envelopes
// role: figma/normalize
// inputs: Decoded JSON payload (list or object)
// outputs: Vec of record objects
// invariants:
// - Lookup order: top-level list, `data`, `results`, first list-valued field other than `cursor`
// - Only object entries survive; scalars inside the list are dropped
// errors: None; unknown shapes yield an empty list
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;

/// Field names tried, in order, before falling back to the first list-valued field.
const ENVELOPE_KEYS: [&str; 2] = ["data", "results"];

/// Never treated as the record list even when it happens to hold an array.
const SKIPPED_KEYS: [&str; 1] = ["cursor"];

pub fn extract_records(payload: &Value) -> Vec<Value> {
  records_slice(payload)
    .map(|items| items.iter().filter(|v| v.is_object()).cloned().collect())
    .unwrap_or_default()
}

fn records_slice(payload: &Value) -> Option<&Vec<Value>> {
  if let Some(list) = payload.as_array() {
    return Some(list);
  }

  let obj = payload.as_object()?;

  for key in ENVELOPE_KEYS {
    if let Some(list) = obj.get(key).and_then(Value::as_array) {
      return Some(list);
    }
  }

  // Relies on document order (serde_json preserve_order).
  obj
    .iter()
    .filter(|(k, _)| !SKIPPED_KEYS.contains(&k.as_str()))
    .find_map(|(_, v)| v.as_array())
}
