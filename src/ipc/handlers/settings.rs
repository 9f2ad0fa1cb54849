use crate::conflicts::{generate_rooms, DEFAULT_ROOM_COUNT, MAX_ROOM_COUNT};
use crate::db;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::with_workspace;
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Value};

pub const ROOM_COUNT_KEY: &str = "school.numberOfRooms";

fn parse_room_count(v: &Value) -> Result<u32, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| "numberOfRooms must be integer".to_string())?;
    if !(1..=i64::from(MAX_ROOM_COUNT)).contains(&n) {
        return Err(format!("numberOfRooms must be in 1..={}", MAX_ROOM_COUNT));
    }
    Ok(n as u32)
}

/// Stored room count, or the default when unset or malformed.
pub fn load_room_count(conn: &Connection) -> anyhow::Result<u32> {
    let saved = db::settings_get_json(conn, ROOM_COUNT_KEY)?;
    Ok(saved
        .as_ref()
        .and_then(|v| parse_room_count(v).ok())
        .unwrap_or(DEFAULT_ROOM_COUNT))
}

fn settings_get(conn: &Connection, _params: &Value) -> Result<Value, HandlerErr> {
    let count = load_room_count(conn).db("db_query_failed")?;
    Ok(json!({ "numberOfRooms": count }))
}

fn settings_update(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let Some(raw) = params.get("numberOfRooms") else {
        return Err(HandlerErr::bad_params("missing numberOfRooms"));
    };
    let count = parse_room_count(raw).map_err(HandlerErr::bad_params)?;
    db::settings_set_json(conn, ROOM_COUNT_KEY, &json!(count)).db("db_update_failed")?;
    tracing::info!(count, "room count updated");
    Ok(json!({ "ok": true, "numberOfRooms": count }))
}

fn rooms_list(conn: &Connection, _params: &Value) -> Result<Value, HandlerErr> {
    let count = load_room_count(conn).db("db_query_failed")?;
    Ok(json!({ "rooms": generate_rooms(count) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "settings.get" => Some(with_workspace(state, req, settings_get)),
        "settings.update" => Some(with_workspace(state, req, settings_update)),
        "rooms.list" => Some(with_workspace(state, req, rooms_list)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_count_bounds() {
        assert_eq!(parse_room_count(&json!(9)), Ok(9));
        assert_eq!(parse_room_count(&json!(200)), Ok(200));
        assert!(parse_room_count(&json!(0)).is_err());
        assert!(parse_room_count(&json!(201)).is_err());
        assert!(parse_room_count(&json!("9")).is_err());
    }
}
