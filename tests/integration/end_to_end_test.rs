//! End-to-end integration tests for spag
//!
//! These tests drive the command layer the way the binary does: a config file,
//! environments, request files and the prepared request, all on disk.

use super::{workspace, write_file};
use spag::commands::{self, CommandError, RequestOptions, Workspace};
use spag::config::load_config;
use spag::environment::{EnvError, EnvironmentProvider};
use spag::files::FileError;
use spag::models::HttpMethod;
use tempfile::TempDir;

#[test]
fn test_end_to_end_prepare_request() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    // Step 1: request file with a with-binding and an environment reference
    write_file(
        temp_dir.path(),
        "requests/things/create.yml",
        r#"method: post
uri: /things
headers:
  x-tenant: "{{[].tenant}}"
body:
  name: "{{name : wumbo}}"
  id: "{{id}}"
"#,
    );

    // Step 2: environment with endpoint and default headers
    commands::env_set(
        &ws,
        &[
            "endpoint=http://localhost:5000".to_string(),
            "tenant=acme".to_string(),
        ],
        &["accept: application/json".to_string()],
    )
    .unwrap();

    // Step 3: prepare
    let options = RequestOptions {
        withs: vec!["id=42".to_string()],
        ..Default::default()
    };
    let request = commands::prepare_request(&ws, "create", None, &options).unwrap();

    assert_eq!(request.method, HttpMethod::POST);
    assert_eq!(request.url, "http://localhost:5000/things");
    assert_eq!(request.headers["accept"], "application/json");
    assert_eq!(request.headers["x-tenant"], "acme");

    let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["name"], "wumbo");
    assert_eq!(body["id"], "42");

    let printed = request.to_string();
    assert!(printed.starts_with("POST http://localhost:5000/things\n"));
}

#[test]
fn test_missing_binding_reports_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    write_file(temp_dir.path(), "requests/get.yml", "method: GET\nuri: /things/{{id}}\n");

    let err = commands::prepare_request(&ws, "get", None, &RequestOptions::default()).unwrap_err();
    assert!(err.to_string().contains("{{id}}"), "unexpected message: {}", err);
}

#[test]
fn test_request_listing_and_show() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    write_file(temp_dir.path(), "requests/v1/things.yml", "method: GET\nuri: /v1/things\n");
    write_file(temp_dir.path(), "requests/v2/things.yml", "method: GET\nuri: /v2/things\n");
    write_file(temp_dir.path(), "requests/notes.txt", "not a request");

    let listed = commands::list_requests(&ws, None).unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].ends_with("v1/things.yml"));
    assert!(listed[1].ends_with("v2/things.yml"));

    let err = commands::show_request(&ws, "things", None).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Files(FileError::Ambiguous { ref matches, .. }) if matches.len() == 2
    ));

    let shown = commands::show_request(&ws, "v2/things", None).unwrap();
    assert!(shown.starts_with("File "));
    assert!(shown.contains("uri: /v2/things"));
}

#[test]
fn test_request_params() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    write_file(
        temp_dir.path(),
        "requests/get.yml",
        "method: GET\nuri: /things/{{id, last.response.body.id : 1}}\n",
    );

    let params = commands::request_params(&ws, "get", None).unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].sources.len(), 2);
    assert_eq!(params[0].default.as_deref(), Some("1"));
}

#[test]
fn test_environment_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    // activating an unknown environment fails, default is created on demand
    assert!(matches!(
        commands::env_activate(&ws, "staging"),
        Err(CommandError::Environment(EnvError::NotFound(_)))
    ));
    commands::env_activate(&ws, "default").unwrap();

    commands::env_set(&ws, &["a.b.c=efg".to_string()], &[]).unwrap();
    let shown = commands::env_show(&ws, None).unwrap();
    assert!(shown.contains("c: efg"));

    commands::env_unset(&ws, Some("a.b.c"), false).unwrap();
    assert!(matches!(
        commands::env_unset(&ws, Some("a.b.c"), false),
        Err(CommandError::Environment(EnvError::KeyNotFound(_)))
    ));

    // a second environment, activated and then deactivated
    ws.environments
        .write("staging", &spag::document::Document::mapping())
        .unwrap();
    commands::env_activate(&ws, "staging").unwrap();
    commands::env_set(&ws, &["endpoint=https://staging".to_string()], &[]).unwrap();
    assert_eq!(
        commands::env_list(&ws).unwrap(),
        vec!["  default".to_string(), "* staging".to_string()]
    );
    assert_eq!(
        commands::render(&ws, "{{[staging].endpoint}} {{[].endpoint : none}}", &[], false).unwrap(),
        "https://staging https://staging"
    );

    commands::env_deactivate(&ws).unwrap();
    assert_eq!(
        commands::render(&ws, "{{[].endpoint : none}}", &[], false).unwrap(),
        "none"
    );

    commands::env_unset(&ws, None, true).unwrap();
    let env = ws.environments.load_environment(None).unwrap();
    assert!(env.as_mapping().map(|m| m.is_empty()).unwrap_or(false));
}

#[test]
fn test_config_file_drives_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let spag_dir = temp_dir.path().join(".spag");
    let requests = temp_dir.path().join("api");
    write_file(
        &spag_dir,
        "config.yml",
        &format!(
            "requestDirs: [{}]\nextension: .yaml\nshortcuts: false\n",
            requests.display()
        ),
    );
    write_file(temp_dir.path(), "api/ping.yaml", "method: GET\nuri: /ping?at=@now\n");

    let config = load_config(Some(spag_dir)).unwrap();
    assert_eq!(config.extension, ".yaml");
    let ws = Workspace::new(config);

    let options = RequestOptions {
        endpoint: Some("http://localhost".to_string()),
        data: Some("@untouched".to_string()),
        ..Default::default()
    };
    let request = commands::prepare_request(&ws, "ping", None, &options).unwrap();
    assert_eq!(request.url, "http://localhost/ping?at=@now");
    assert_eq!(request.body.as_deref(), Some("@untouched"));
}
