//! Request chaining integration tests
//!
//! These tests record exchanges into an on-disk workspace and check that
//! later requests can pull values out of them through placeholders and
//! shortcuts.

use super::{workspace, write_file};
use spag::commands::{self, CommandError, RequestOptions};
use spag::history::{ExchangeResponse, HistoryError, RecordedExchange};
use spag::variables::VarError;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Helper to build an exchange with a JSON response body
fn create_exchange(method: &str, url: &str, status: u16, body: &str) -> RecordedExchange {
    let response = ExchangeResponse {
        status,
        headers: BTreeMap::from([("location".to_string(), "/things/abc".to_string())]),
        body: body.to_string(),
    };
    RecordedExchange::new(method, url, BTreeMap::new(), None, response)
        .expect("Failed to build exchange")
}

#[test]
fn test_chaining_from_last_response() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    write_file(
        temp_dir.path(),
        "requests/things/get.yml",
        "method: GET\nuri: /things/{{last.response.body.id}}\n",
    );
    ws.remembers
        .remember(
            "last",
            &create_exchange("post", "http://localhost:5000/things", 201, r#"{"id": "abc"}"#),
        )
        .unwrap();

    let options = RequestOptions {
        endpoint: Some("http://localhost:5000".to_string()),
        ..Default::default()
    };
    let request = commands::prepare_request(&ws, "get", None, &options).unwrap();
    assert_eq!(request.url, "http://localhost:5000/things/abc");
}

#[test]
fn test_chaining_from_named_exchange() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let created = create_exchange(
        "POST",
        "http://localhost:5000/things",
        201,
        r#"{"id": "first"}"#,
    );
    let other = create_exchange(
        "POST",
        "http://localhost:5000/other",
        201,
        r#"{"id": "second"}"#,
    );
    ws.remembers.remember("things/create", &created).unwrap();
    ws.remembers.remember("other", &other).unwrap();

    // "last" now points at the second exchange, the named one is unchanged
    let out = commands::render(
        &ws,
        "{{create.response.body.id}} {{last.response.body.id}}",
        &[],
        false,
    )
    .unwrap();
    assert_eq!(out, "first second");
}

#[test]
fn test_shortcuts_in_headers_and_data() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    write_file(
        temp_dir.path(),
        "requests/things/update.yml",
        "method: PUT\nuri: /things/{{id}}\nbody:\n  name: updated\n",
    );
    ws.remembers
        .remember(
            "last",
            &create_exchange(
                "POST",
                "http://localhost:5000/things",
                201,
                r#"{"id": "abc", "token": "t0k3n", "nested": {"n": 2}}"#,
            ),
        )
        .unwrap();
    commands::env_set(&ws, &["endpoint=http://localhost:5000".to_string()], &[]).unwrap();

    let options = RequestOptions {
        withs: vec!["id=@id".to_string()],
        headers: vec!["authorization: Bearer @token".to_string()],
        data: Some(r#"{"n": @nested.n}"#.to_string()),
        ..Default::default()
    };
    // `@nested.n` has a dot, so it walks from `last.response`, not its body
    let err = commands::prepare_request(&ws, "update", None, &options).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Template(VarError::SubstitutionFailed { .. })
    ));

    let options = RequestOptions {
        data: Some(r#"{"n": @body.nested.n, "where": "@headers.location"}"#.to_string()),
        ..options
    };
    let request = commands::prepare_request(&ws, "update", None, &options).unwrap();
    assert_eq!(request.url, "http://localhost:5000/things/abc");
    assert_eq!(request.headers["authorization"], "Bearer t0k3n");
    assert_eq!(
        request.body.as_deref(),
        Some(r#"{"n": 2, "where": "/things/abc"}"#)
    );
}

#[test]
fn test_env_set_stores_resolved_shortcut() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    ws.remembers
        .remember(
            "last",
            &create_exchange("POST", "http://localhost:5000/login", 200, r#"{"token": "xyz"}"#),
        )
        .unwrap();

    commands::env_set(&ws, &[], &["Authorization:Bearer @token".to_string()]).unwrap();

    let out = commands::render(&ws, "{{[].headers.Authorization}}", &[], true).unwrap();
    assert_eq!(out, "Bearer xyz");
}

#[test]
fn test_fallback_to_default_without_history() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let out = commands::render(&ws, "{{last.response.body.id, id : none}}", &[], true).unwrap();
    assert_eq!(out, "none");

    let withs = ["id=7".to_string()];
    let out = commands::render(&ws, "{{last.response.body.id, id : none}}", &withs, true).unwrap();
    assert_eq!(out, "7");
}

#[test]
fn test_ambiguous_exchange_name_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let exchange = create_exchange("GET", "http://localhost:5000/thing", 200, "{}");
    ws.remembers.remember("a/thing", &exchange).unwrap();
    ws.remembers.remember("b/thing", &exchange).unwrap();

    // even a default does not paper over an ambiguous name
    let err = commands::render(&ws, "{{thing.response.status : 0}}", &[], false).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Template(VarError::Exchange(ref e)) if e.is_ambiguous()
    ));

    let out = commands::render(&ws, "{{a/thing.response.status : 0}}", &[], false).unwrap();
    assert_eq!(out, "200");
}

#[test]
fn test_record_feeds_remembers_and_history() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let exchange = create_exchange("POST", "http://localhost:5000/things?x=1", 201, r#"{"id": 9}"#);
    let text = exchange.to_yaml_string().unwrap();

    commands::record(&ws, &text, Some("create")).unwrap();

    assert_eq!(commands::render(&ws, "@id", &[], true).unwrap(), "9");
    assert_eq!(
        commands::render(&ws, "{{create.response.status}}", &[], false).unwrap(),
        "201"
    );
    assert_eq!(
        commands::history_list(&ws).unwrap(),
        vec!["0: POST http://localhost:5000/things?x=1".to_string()]
    );

    let shown = commands::history_show(&ws, "0").unwrap();
    assert!(shown.contains("Status code 201"));

    assert!(matches!(
        commands::history_show(&ws, "1"),
        Err(CommandError::History(HistoryError::OutOfBounds { index: 1, len: 1 }))
    ));

    // clearing history keeps the remembered exchanges
    assert_eq!(commands::history_clear(&ws).unwrap(), "History cleared");
    assert!(commands::history_list(&ws).unwrap().is_empty());
    assert_eq!(commands::render(&ws, "@id", &[], true).unwrap(), "9");
}
