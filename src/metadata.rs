// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve analytics keys to display names using the library file's components, component sets and styles
// role: model/metadata
// inputs: Decoded `files/<key>` JSON
// outputs: LibraryMetadata with key -> ComponentInfo, name -> key, and style key -> StyleInfo lookups
// invariants:
// - Unknown componentSetId resolves to an empty set name
// - Duplicate component names keep the first key seen in document order
// - Resolution order: metadata key, record component_name, raw key
// errors: None; malformed sections are treated as empty
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ext::serde_json::JsonFetch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
  pub name: String,
  pub component_set: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleInfo {
  pub name: String,
  pub style_type: String,
}

/// Display name and set name chosen for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
  pub name: String,
  pub component_set: String,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryMetadata {
  pub file_name: String,
  pub components: HashMap<String, ComponentInfo>,
  pub name_to_key: HashMap<String, String>,
  pub styles: HashMap<String, StyleInfo>,
}

impl LibraryMetadata {
  pub fn from_file(file: &Value) -> Self {
    let file_name = file.fetch("name").text().unwrap_or_default();
    let (components, name_to_key) = build_component_maps(
      file.get("components").and_then(Value::as_object),
      file.get("componentSets").and_then(Value::as_object),
    );
    let styles = build_style_map(file.get("styles").and_then(Value::as_object));

    Self {
      file_name,
      components,
      name_to_key,
      styles,
    }
  }

  /// Pick display/set names for an analytics record and note keys that only
  /// resolved to themselves in `unresolved`.
  pub fn resolve_component(&self, record: &Value, unresolved: &mut BTreeSet<String>) -> ResolvedComponent {
    let key = record.text_of(&["component_key"]);

    if let Some(info) = self.components.get(&key) {
      return ResolvedComponent {
        name: info.name.clone(),
        component_set: info.component_set.clone(),
      };
    }

    let reported_name = record.text_of(&["component_name"]);

    if !reported_name.is_empty() {
      let component_set = self
        .name_to_key
        .get(&reported_name)
        .and_then(|k| self.components.get(k))
        .map(|info| info.component_set.clone())
        .unwrap_or_else(|| record.text_of(&["component_set_name"]));

      return ResolvedComponent {
        name: reported_name,
        component_set,
      };
    }

    if !key.is_empty() {
      unresolved.insert(key.clone());
    }

    ResolvedComponent {
      name: key,
      component_set: String::new(),
    }
  }

  /// Style name/type: record fields first, then the file's styles map, then the raw key.
  pub fn resolve_style(&self, record: &Value) -> StyleInfo {
    let key = record.text_of(&["style_key"]);
    let known = self.styles.get(&key);

    let name = match record.text_of(&["style_name"]) {
      n if !n.is_empty() => n,
      _ => known.map(|s| s.name.clone()).unwrap_or_else(|| key.clone()),
    };

    let style_type = match record.text_of(&["style_type"]) {
      t if !t.is_empty() => t,
      _ => known.map(|s| s.style_type.clone()).unwrap_or_default(),
    };

    StyleInfo { name, style_type }
  }
}

/// One pass over the file's `components` and `componentSets` sections.
pub fn build_component_maps(
  components: Option<&Map<String, Value>>,
  component_sets: Option<&Map<String, Value>>,
) -> (HashMap<String, ComponentInfo>, HashMap<String, String>) {
  let mut by_key: HashMap<String, ComponentInfo> = HashMap::new();
  let mut name_to_key: HashMap<String, String> = HashMap::new();

  let Some(components) = components else {
    return (by_key, name_to_key);
  };

  for (id, comp) in components {
    let name = comp.fetch("name").text().unwrap_or_default();
    let set_id = comp.fetch("componentSetId").text().unwrap_or_default();

    let component_set = component_sets
      .and_then(|sets| sets.get(&set_id))
      .and_then(|set| set.fetch("name").text())
      .unwrap_or_default();

    let info = ComponentInfo {
      name: name.clone(),
      component_set,
    };

    // Analytics rows carry the published key, which differs from the node id.
    if let Some(published) = comp.fetch("key").text().filter(|k| !k.is_empty() && k != id) {
      by_key.entry(published).or_insert_with(|| info.clone());
    }

    by_key.insert(id.clone(), info);

    if !name.is_empty() {
      name_to_key.entry(name).or_insert_with(|| id.clone());
    }
  }

  (by_key, name_to_key)
}

fn build_style_map(styles: Option<&Map<String, Value>>) -> HashMap<String, StyleInfo> {
  let mut out = HashMap::new();

  for (id, style) in styles.into_iter().flatten() {
    let info = StyleInfo {
      name: style.fetch("name").text().unwrap_or_default(),
      style_type: style.fetch("styleType").text().unwrap_or_default(),
    };

    if let Some(published) = style.fetch("key").text().filter(|k| !k.is_empty()) {
      out.entry(published).or_insert_with(|| info.clone());
    }
    out.entry(id.clone()).or_insert(info);
  }

  out
}
