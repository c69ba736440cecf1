use crate::config::ImportConfig;
use crate::importer;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::sources::Sources;
use serde_json::json;
use std::path::PathBuf;

fn handle_import_run(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let source_root = match req.params.get("sourceRoot").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => match state.workspace.clone() {
            Some(p) => p,
            None => return err(&req.id, "bad_params", "missing sourceRoot", None),
        },
    };
    let cfg = ImportConfig::for_root(&source_root);

    let sources = match Sources::load(&cfg.news_path(), &cfg.leaders_path(), &cfg.dump_path()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "import_failed",
                e.to_string(),
                Some(json!({ "sourceRoot": source_root.to_string_lossy() })),
            )
        }
    };

    // Snapshot before the wipe.
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL)");
    let backup_dir = ImportConfig::for_root(&workspace).backup_dir();
    let backup_path = match importer::backup_existing(&workspace, &backup_dir) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                format!("{:#}", e),
                Some(json!({ "backupDir": backup_dir.to_string_lossy() })),
            )
        }
    };

    let report = importer::run(conn, &sources);
    match serde_json::to_value(&report) {
        Ok(mut v) => {
            v["backupPath"] = json!(backup_path.map(|p| p.to_string_lossy().to_string()));
            ok(&req.id, v)
        }
        Err(e) => err(&req.id, "import_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "import.run" => Some(handle_import_run(state, req)),
        _ => None,
    }
}
