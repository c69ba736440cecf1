use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::knowledge::{self, KnowledgeError, KnowledgeInput};
use serde_json::json;

// Admin forms send comma-separated text; older clients sent arrays.
fn list_param(params: &serde_json::Value, key: &str) -> String {
    match params.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(","),
        _ => String::new(),
    }
}

fn parse_input(params: &serde_json::Value) -> KnowledgeInput {
    KnowledgeInput {
        topics: list_param(params, "topics"),
        keywords: list_param(params, "keywords"),
        answer: params
            .get("answer")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        is_active: params
            .get("isActive")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        is_suggested: params
            .get("isSuggested")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    }
}

fn id_param(req: &Request) -> Option<String> {
    req.params
        .get("id")
        .or_else(|| req.params.get("query").and_then(|q| q.get("id")))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn knowledge_err(id: &str, code: &str, e: KnowledgeError) -> serde_json::Value {
    match e {
        KnowledgeError::EmptyAnswer => err(id, "bad_params", "answer must not be empty", None),
        KnowledgeError::Db(db) => err(
            id,
            code,
            db.to_string(),
            Some(json!({ "table": "knowledge_entries" })),
        ),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "entries": [] }));
    };
    match knowledge::list(conn) {
        Ok(entries) => ok(&req.id, json!({ "entries": entries })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let input = parse_input(&req.params);
    match knowledge::create(conn, &input) {
        Ok(entry) => ok(&req.id, json!({ "entry": entry })),
        Err(e) => knowledge_err(&req.id, "db_insert_failed", e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(entry_id) = id_param(req) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    let input = parse_input(&req.params);
    match knowledge::update(conn, &entry_id, &input) {
        Ok(Some(entry)) => ok(&req.id, json!({ "entry": entry })),
        Ok(None) => err(&req.id, "not_found", "entry not found", None),
        Err(e) => knowledge_err(&req.id, "db_update_failed", e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(entry_id) = id_param(req) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match knowledge::delete(conn, &entry_id) {
        Ok(true) => ok(&req.id, json!({ "deleted": entry_id })),
        Ok(false) => err(&req.id, "not_found", "entry not found", None),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "entries": [] }));
    };
    let q = req.params.get("q").and_then(|v| v.as_str()).unwrap_or("");
    match knowledge::list(conn) {
        Ok(entries) => ok(
            &req.id,
            json!({ "entries": knowledge::filter(&entries, q) }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_ask(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(question) = req.params.get("question").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing question", None);
    };
    match knowledge::list(conn) {
        Ok(entries) => match knowledge::lookup(&entries, question) {
            Some(hit) => ok(&req.id, json!({ "matched": true, "entry": hit })),
            None => ok(&req.id, json!({ "matched": false, "entry": null })),
        },
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_suggestions(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "entries": [] }));
    };
    match knowledge::list(conn) {
        Ok(entries) => ok(
            &req.id,
            json!({ "entries": knowledge::suggestions(&entries) }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "knowledge.list" => Some(handle_list(state, req)),
        "knowledge.create" => Some(handle_create(state, req)),
        "knowledge.update" => Some(handle_update(state, req)),
        "knowledge.delete" => Some(handle_delete(state, req)),
        "knowledge.search" => Some(handle_search(state, req)),
        "knowledge.ask" => Some(handle_ask(state, req)),
        "knowledge.suggestions" => Some(handle_suggestions(state, req)),
        _ => None,
    }
}
