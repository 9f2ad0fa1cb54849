use crate::db;
use crate::filter::Searchable;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_string_list, with_workspace};
use crate::ipc::types::{AppState, Request};
use crate::people::{directory, search_people, PersonHit};
use rusqlite::Connection;
use serde_json::{json, Value};

fn people_search(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let query = get_optional_str(params, "query").unwrap_or_default();
    let fields = get_string_list(params, "fields")?;
    let students = db::list_students(conn, None).db("db_query_failed")?;
    let teachers = db::list_teachers(conn).db("db_query_failed")?;
    let management = db::list_management(conn).db("db_query_failed")?;

    let everyone = directory(&students, &teachers, &management);
    let results = if fields.is_empty() {
        search_people(&everyone, &query, PersonHit::DEFAULT_FIELDS)
    } else {
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        search_people(&everyone, &query, &names)
    };
    Ok(json!({ "results": results }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "people.search" => Some(with_workspace(state, req, people_search)),
        _ => None,
    }
}
