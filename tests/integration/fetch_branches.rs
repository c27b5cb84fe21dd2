use predicates::prelude::*;
use serde_json::json;
use test_support::{MockServer, cmd_bin, tempdir};

#[test]
fn fetch_branches_classifies_and_writes_default_output() {
  let server = MockServer::start();
  server.once_json(
    "/v1/files/KEY",
    json!({
      "name": "Core Library",
      "branches": [
        {
          "key": "br1",
          "name": "Color tokens",
          "created_at": "2025-01-05T10:00:00Z",
          "last_modified": "2025-01-20T16:45:00Z",
          "creator": { "handle": "ada" },
          "thumbnail_url": "https://thumbs.test/br1.png"
        },
        { "key": "br2", "archived": true, "owner": { "email": "bo@x.test" } },
        { "key": "br3", "name": "Icons v2", "status": "Merged", "description": "Shipped in 4.0" }
      ]
    }),
  );

  let td = tempdir();
  let work = td.path().join("python-api");
  std::fs::create_dir_all(&work).unwrap();

  cmd_bin()
    .current_dir(&work)
    .args(["fetch-branches", "--token", "figd_test", "--file-key", "https://www.figma.com/design/KEY/Core"])
    .args(["--api-base", &server.api_base()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Found 3 branches"))
    .stdout(predicate::str::contains("Active: 1"))
    .stdout(predicate::str::contains("Archived: 1"))
    .stdout(predicate::str::contains("Merged: 1"))
    .stdout(predicate::str::contains("Saved to: ../src/data/branches.json"));

  let saved = std::fs::read_to_string(td.path().join("src/data/branches.json")).unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&saved).unwrap();
  assert_eq!(
    parsed,
    json!([
      {
        "key": "br1",
        "name": "Color tokens",
        "status": "active",
        "review_status": null,
        "created_at": "2025-01-05",
        "created_by": "ada",
        "lastModified": "2025-01-20",
        "description": null,
        "thumbnailUrl": "https://thumbs.test/br1.png"
      },
      {
        "key": "br2",
        "name": "br2",
        "status": "archived",
        "review_status": null,
        "created_at": null,
        "created_by": "bo@x.test",
        "lastModified": null,
        "description": null,
        "thumbnailUrl": null
      },
      {
        "key": "br3",
        "name": "Icons v2",
        "status": "merged",
        "review_status": null,
        "created_at": null,
        "created_by": "Unknown",
        "lastModified": null,
        "description": "Shipped in 4.0",
        "thumbnailUrl": null
      }
    ])
  );

  let requests = server.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].query_param("branch_data").as_deref(), Some("true"));
  assert_eq!(requests[0].header("x-figma-token"), Some("figd_test"));
}

#[test]
fn fetch_branches_error_status_is_fatal_and_writes_nothing() {
  let server = MockServer::start();
  server.on("/v1/files/KEY", 403, r#"{"status":403,"err":"Forbidden"}"#);
  let td = tempdir();
  let output = td.path().join("branches.json");

  cmd_bin()
    .args(["fetch-branches", "--token", "figd_test", "--file-key", "KEY"])
    .args(["--output", output.to_str().unwrap()])
    .args(["--api-base", &server.api_base()])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Figma API error fetching branches: 403 forbidden"));

  assert!(!output.exists());
}
