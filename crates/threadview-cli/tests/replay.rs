use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use tempfile::tempdir;

fn replay(script: &Value) -> Value {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.json");
    fs::write(&path, serde_json::to_string(script).unwrap()).unwrap();

    let output = cargo_bin_cmd!("threadview")
        .env("THREADVIEW_CONFIG", dir.path().join("missing.toml"))
        .args(["replay", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_replay_reports_view_and_requests() {
    let report = replay(&json!({
        "steps": [
            { "step": "signals", "signals": [
                { "signal": "source_cache", "value": {
                    "id": "general/all",
                    "thread_id": "general",
                    "message_ids": [1, 2, 3],
                    "non_empty_message_ids": [1, 3]
                } },
                { "signal": "thread", "value": { "id": "general" } },
                { "signal": "device", "value": { "is_mobile": false } }
            ] },
            { "step": "add_hint", "kind": "message-received", "data": { "message_id": 3 } },
            { "step": "process_hint", "kind": "change-of-source" },
            { "step": "scroll", "height": 500, "position": 120 },
            { "step": "scroll", "cache": "general/starred", "height": 80, "position": 0 }
        ]
    }));

    assert_eq!(report["view"]["source_cache"], "general/all");
    assert_eq!(report["view"]["input_send_shortcuts"], json!(["enter"]));
    assert_eq!(report["view"]["messages"], json!([1, 2, 3]));
    assert_eq!(report["view"]["non_empty_messages"], json!([1, 3]));
    assert_eq!(
        report["view"]["remembered_scroll"],
        json!({ "height": 500, "position": 120 })
    );
    assert_eq!(report["view"]["remembered_caches"], 2);
    assert_eq!(report["hints"].as_array().unwrap().len(), 1);
    assert_eq!(report["hints"][0]["kind"], "message-received");
    assert_eq!(report["published"][0]["kind"], "change-of-source");
    assert_eq!(
        report["requests"],
        json!(["refresh general/all", "mark-all-as-read general/all"])
    );
}

#[test]
fn test_replay_slow_load_shows_spinner() {
    let report = replay(&json!({
        "steps": [
            { "step": "signals", "signals": [
                { "signal": "source_cache", "value": {
                    "id": "general/all",
                    "thread_id": "general",
                    "is_loading": true
                } }
            ] },
            { "step": "wait", "ms": 600 }
        ]
    }));

    assert_eq!(report["view"]["is_loading"], true);
    assert_eq!(report["view"]["is_preparing_loading"], false);
}

#[test]
fn test_replay_reports_mark_as_seen_failure() {
    let report = replay(&json!({
        "fail_mark_as_seen": "offline",
        "steps": [
            { "step": "signals", "signals": [
                { "signal": "source_cache", "value": { "id": "general/all", "thread_id": "general" } },
                { "signal": "thread", "value": {
                    "id": "general",
                    "last_message": 7,
                    "last_non_transient_message": 7
                } },
                { "signal": "composer_focus", "value": true }
            ] },
            { "step": "visible", "message": 7 }
        ]
    }));

    assert!(
        report["requests"]
            .as_array()
            .unwrap()
            .contains(&json!("mark-as-seen general 7"))
    );
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("offline"));
}
