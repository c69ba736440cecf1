mod common;

use common::{fixture_path, temp_dir, Sidecar};
use serde_json::json;

const METHODS: &[&str] = &[
    "health",
    "workspace.select",
    "workspace.backup",
    "workspace.restoreBackup",
    "import.run",
    "knowledge.list",
    "knowledge.create",
    "knowledge.update",
    "knowledge.delete",
    "knowledge.search",
    "knowledge.ask",
    "knowledge.suggestions",
    "posts.list",
    "agenda.list",
    "leaders.list",
    "faculties.list",
    "staff.list",
];

#[test]
fn every_method_is_routed() {
    let mut sidecar = Sidecar::spawn();
    for (i, method) in METHODS.iter().enumerate() {
        let resp = sidecar.request(&i.to_string(), method, json!({}));
        let code = resp
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        assert_ne!(code, "not_implemented", "{} is not routed", method);
    }
    assert_eq!(
        sidecar.request_err("x", "grades.open", json!({})),
        "not_implemented"
    );
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("kampusd-router-smoke");
    let restored = temp_dir("kampusd-router-smoke-restored");
    let bundle_out = workspace.join("smoke-backup.kampus.zip");

    let mut sidecar = Sidecar::spawn();

    let health = sidecar.request_ok("1", "health", json!({}));
    assert!(health["workspacePath"].is_null());
    assert_eq!(
        sidecar.request_err("2", "workspace.select", json!({})),
        "bad_params"
    );
    assert_eq!(
        sidecar.request_err("3", "workspace.backup", json!({ "outPath": bundle_out.to_string_lossy() })),
        "no_workspace"
    );

    let _ = sidecar.request_ok(
        "4",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let health = sidecar.request_ok("5", "health", json!({}));
    assert_eq!(health["workspacePath"], workspace.to_string_lossy().to_string());

    let _ = sidecar.request_ok(
        "6",
        "import.run",
        json!({ "sourceRoot": fixture_path("site").to_string_lossy() }),
    );
    let _ = sidecar.request_ok(
        "7",
        "knowledge.create",
        json!({ "topics": "PMB", "keywords": "daftar", "answer": "Pendaftaran dibuka Januari." }),
    );

    let backup = sidecar.request_ok(
        "8",
        "workspace.backup",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(backup["bundleFormat"], "kampus-db-v1");
    assert!(bundle_out.is_file());

    let restore = sidecar.request_ok(
        "9",
        "workspace.restoreBackup",
        json!({
            "inPath": bundle_out.to_string_lossy(),
            "workspacePath": restored.to_string_lossy()
        }),
    );
    assert_eq!(restore["bundleFormatDetected"], "kampus-db-v1");

    let leaders = sidecar.request_ok("10", "leaders.list", json!({}));
    assert_eq!(leaders["leaders"].as_array().map(|l| l.len()), Some(2));
    let knowledge = sidecar.request_ok("11", "knowledge.list", json!({}));
    assert_eq!(knowledge["entries"].as_array().map(|e| e.len()), Some(1));
    let health = sidecar.request_ok("12", "health", json!({}));
    assert_eq!(health["workspacePath"], restored.to_string_lossy().to_string());

    assert_eq!(
        sidecar.request_err(
            "13",
            "workspace.restoreBackup",
            json!({ "inPath": workspace.join("missing.zip").to_string_lossy() })
        ),
        "io_failed"
    );

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(restored);
}
