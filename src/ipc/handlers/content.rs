use crate::content;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_posts_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "posts": [] }));
    };
    let category = req.params.get("category").and_then(|v| v.as_str());
    match content::posts(conn, category) {
        Ok(posts) => ok(&req.id, json!({ "posts": posts })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_agenda_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "agendas": [] }));
    };
    match content::agendas(conn) {
        Ok(agendas) => ok(&req.id, json!({ "agendas": agendas })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_leaders_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "leaders": [] }));
    };
    match content::leaders(conn) {
        Ok(leaders) => ok(&req.id, json!({ "leaders": leaders })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_faculties_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "faculties": [] }));
    };
    match content::faculties(conn) {
        Ok(faculties) => ok(&req.id, json!({ "faculties": faculties })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_staff_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "categories": [] }));
    };
    match content::staff_by_category(conn) {
        Ok(groups) => ok(&req.id, json!({ "categories": groups })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "posts.list" => Some(handle_posts_list(state, req)),
        "agenda.list" => Some(handle_agenda_list(state, req)),
        "leaders.list" => Some(handle_leaders_list(state, req)),
        "faculties.list" => Some(handle_faculties_list(state, req)),
        "staff.list" => Some(handle_staff_list(state, req)),
        _ => None,
    }
}
