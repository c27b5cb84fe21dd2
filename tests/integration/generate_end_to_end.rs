use predicates::prelude::*;
use serde_json::json;
use test_support::{MockServer, cmd_bin, tempdir};

fn library_file() -> serde_json::Value {
  json!({
    "name": "Core Library",
    "components": {
      "1:2": { "key": "k1", "name": "Button", "componentSetId": "1:1" },
      "1:3": { "key": "k2", "name": "Icon", "componentSetId": "9:9" }
    },
    "componentSets": { "1:1": { "name": "Buttons" } },
    "styles": { "5:1": { "key": "st1", "name": "Primary/500", "styleType": "FILL" } }
  })
}

fn read(dir: &std::path::Path, name: &str) -> String {
  std::fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("reading {}: {e}", name))
}

fn script_library(server: &MockServer) {
  server.once_json("/v1/files/LIB1", library_file());

  server
    .once_json(
      "cursor=c2",
      json!({ "rows": [{ "component_key": "pub-x", "week": "2025-01-13", "insertions": "2" }], "next_page": false }),
    )
    .once_json(
      "component/actions?group_by=component",
      json!({
        "rows": [
          { "component_key": "k1", "week": "2025-01-06", "insertions": 3, "detachments": 1 },
          { "component_key": "k9", "component_name": "Card", "week": "2024-12-30", "insertions": 1 }
        ],
        "next_page": true,
        "cursor": "c2"
      }),
    )
    .on_json(
      "component/actions?group_by=team",
      json!({ "rows": [{ "team_name": "Growth", "workspace_name": "Acme", "week": "2025-01-06", "insertions": 5, "detachments": 0 }] }),
    )
    .on_json(
      "component/usages?group_by=component",
      json!({ "rows": [{ "component_key": "k1", "num_instances": 40, "num_teams_using": 3, "num_files_using": 7 }] }),
    )
    .on_json(
      "component/usages?group_by=file",
      json!({ "data": [
        { "file_name": "Checkout", "component_key": "k1", "instances": 3 },
        { "file_name": "Checkout", "component_key": "k1", "instances": 2 },
        { "file_name": "Home", "component_key": "k2", "instances": 1 }
      ] }),
    )
    .on_json(
      "variable/actions?group_by=team",
      json!({ "results": [{ "team_name": "Growth", "variable_name": "color/bg", "actions": 4, "week": "2025-01-06" }] }),
    )
    .on_json(
      "variable/actions?group_by=variable",
      json!([{ "variable_key": "VariableID:1:2", "insertions": 1, "detachments": 1, "week": "2025-01-20" }]),
    )
    .on("style/actions", 403, r#"{"status":403,"err":"Forbidden"}"#);
  // style/usages is left unrouted: the mock answers 404.
}

#[test]
fn generate_writes_all_reports_from_the_api() {
  let server = MockServer::start();
  script_library(&server);
  let td = tempdir();
  let out_dir = td.path().join("public/csv");

  cmd_bin()
    .args(["generate", "--token", "figd_test", "--file-key", "https://www.figma.com/design/LIB1/Core?node-id=0-1"])
    .args(["--output-dir", out_dir.to_str().unwrap()])
    .args(["--start-date", "2025-01-01", "--end-date", "2025-01-31"])
    .args(["--api-base", &server.api_base()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Library: Core Library"))
    .stdout(predicate::str::contains("Files with data: 6/8"))
    .stdout(predicate::str::contains("no data (analytics unavailable)"));

  assert_eq!(
    read(&out_dir, "actions_by_component.csv"),
    "component_name,component_set_name,week,insertions,detachments\n\
     Button,Buttons,2025-01-06,3,1\n\
     pub-x,,2025-01-13,2,0\n"
  );
  assert_eq!(
    read(&out_dir, "actions_by_team.csv"),
    "team_name,workspace_name,week,insertions,detachments\nGrowth,Acme,2025-01-06,5,0\n"
  );
  assert_eq!(
    read(&out_dir, "usages_by_component.csv"),
    "component_name,component_set_name,num_instances,num_teams_using,num_files_using\nButton,Buttons,40,3,7\n"
  );
  assert_eq!(
    read(&out_dir, "usages_by_file.csv"),
    "file_name,component_count,total_instances\nCheckout,1,5\nHome,1,1\n"
  );
  assert_eq!(
    read(&out_dir, "variable_actions_by_team.csv"),
    "team_name,variable_name,actions\nGrowth,color/bg,4\n"
  );
  assert_eq!(
    read(&out_dir, "variable_actions_by_variable.csv"),
    "variable_name,actions,week\nVariableID:1:2,2,2025-01-20\n"
  );
  assert_eq!(
    read(&out_dir, "style_actions_by_style.csv"),
    "style_name,style_type,week,insertions,detachments\n"
  );
  assert_eq!(
    read(&out_dir, "style_usages_by_style.csv"),
    "style_name,style_type,num_instances,num_teams_using,num_files_using\n"
  );
}

#[test]
fn generate_sends_token_and_windows_only_to_action_endpoints() {
  let server = MockServer::start();
  script_library(&server);
  let td = tempdir();

  cmd_bin()
    .args(["main", "--token", "figd_test", "--file-key", "LIB1"])
    .args(["--output-dir", td.path().to_str().unwrap()])
    .args(["--start-date", "2025-01-01", "--end-date", "2025-01-31"])
    .args(["--api-base", &server.api_base()])
    .assert()
    .success();

  let requests = server.requests();
  // metadata + 2 component/actions pages + 7 single-page groupings
  assert_eq!(requests.len(), 10);
  assert!(requests.iter().all(|r| r.method == "GET"));
  assert!(requests.iter().all(|r| r.header("x-figma-token") == Some("figd_test")));

  let actions = requests
    .iter()
    .find(|r| r.target.contains("component/actions"))
    .unwrap();
  assert_eq!(actions.query_param("start_date").as_deref(), Some("2025-01-01"));
  assert_eq!(actions.query_param("end_date").as_deref(), Some("2025-01-31"));

  let usages = requests
    .iter()
    .find(|r| r.target.contains("component/usages"))
    .unwrap();
  assert_eq!(usages.query_param("start_date"), None);

  let second_page = requests.iter().find(|r| r.target.contains("cursor=c2")).unwrap();
  assert_eq!(second_page.query_param("group_by").as_deref(), Some("component"));
}

#[test]
fn generate_writes_header_only_files_when_analytics_are_forbidden() {
  let server = MockServer::start();
  server.once_json("/v1/files/LIB1", library_file());
  server.on("/analytics/", 403, r#"{"status":403,"err":"Invalid scope"}"#);
  let td = tempdir();

  cmd_bin()
    .args(["generate", "--token", "figd_test", "--file-key", "LIB1", "--library-name", "DS"])
    .args(["--output-dir", td.path().to_str().unwrap()])
    .args(["--api-base", &server.api_base()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Library: DS"))
    .stdout(predicate::str::contains("Files with data: 0/8"));

  let mut names: Vec<String> = std::fs::read_dir(td.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  assert_eq!(
    names,
    vec![
      "actions_by_component.csv",
      "actions_by_team.csv",
      "style_actions_by_style.csv",
      "style_usages_by_style.csv",
      "usages_by_component.csv",
      "usages_by_file.csv",
      "variable_actions_by_team.csv",
      "variable_actions_by_variable.csv",
    ]
  );

  for name in &names {
    let text = read(td.path(), name);
    assert_eq!(text.lines().count(), 1, "{} should hold only its header", name);
  }
}

#[test]
fn generate_fails_when_file_metadata_is_unavailable() {
  let server = MockServer::start();
  server.on("/v1/files/LIB1", 500, r#"{"status":500}"#);
  let td = tempdir();

  cmd_bin()
    .args(["generate", "--token", "figd_test", "--file-key", "LIB1"])
    .args(["--output-dir", td.path().to_str().unwrap()])
    .args(["--api-base", &server.api_base()])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Figma API error fetching file metadata: HTTP 500"));

  assert!(!td.path().join("actions_by_component.csv").exists());
  assert_eq!(server.requests().len(), 1);
}
