use crate::filter::{filter_by_query, Searchable};
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::ModelError;
use rusqlite::Connection;
use serde_json::Value;

impl From<ModelError> for HandlerErr {
    fn from(e: ModelError) -> Self {
        HandlerErr::validation(e.to_string())
    }
}

/// Runs a handler body against the open workspace.
pub fn with_workspace<F>(state: &mut AppState, req: &Request, body: F) -> Value
where
    F: FnOnce(&Connection, &Value) -> Result<Value, HandlerErr>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match body(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => {
            tracing::debug!(method = %req.method, code = error.code, "request rejected");
            error.response(&req.id)
        }
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Missing keys read as empty text so required-field checks report them.
pub fn get_str_or_empty(params: &Value, key: &str) -> String {
    get_optional_str(params, key).unwrap_or_default()
}

pub fn get_required_f64(params: &Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a number", key)))
}

pub fn get_required_u64(params: &Value, key: &str) -> Result<u64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a non-negative integer", key)))
}

pub fn get_string_list(params: &Value, key: &str) -> Result<Vec<String>, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Ok(Vec::new());
    };
    if v.is_null() {
        return Ok(Vec::new());
    }
    let Some(arr) = v.as_array() else {
        return Err(HandlerErr::bad_params(format!("{} must be an array", key)));
    };
    Ok(arr
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// Applies `params.query` over `params.fields` (or the record's default fields).
pub fn search<'a, T: Searchable>(items: &'a [T], params: &Value) -> Result<Vec<&'a T>, HandlerErr> {
    let query = get_optional_str(params, "query").unwrap_or_default();
    let fields = get_string_list(params, "fields")?;
    if fields.is_empty() {
        return Ok(filter_by_query(items, &query, T::DEFAULT_FIELDS));
    }
    let names: Vec<&str> = fields.iter().map(String::as_str).collect();
    Ok(filter_by_query(items, &query, &names))
}
