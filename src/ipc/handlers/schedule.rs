use crate::db;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{get_required_str, get_required_u64, with_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::{optional_text, MAX_NAME_LEN};
use crate::schedule::{ScheduleError, WeekGrid, Weekday};
use rusqlite::Connection;
use serde_json::{json, Value};

impl From<ScheduleError> for HandlerErr {
    fn from(e: ScheduleError) -> Self {
        HandlerErr::bad_params(e.to_string())
    }
}

fn require_class(conn: &Connection, params: &Value) -> Result<String, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    if !db::class_exists(conn, &class_id).db("db_query_failed")? {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(class_id)
}

fn grid_json(class_id: &str, grid: &WeekGrid) -> Value {
    let weekdays: Vec<&str> = Weekday::ALL.iter().map(|d| d.key()).collect();
    json!({
        "classId": class_id,
        "weekdays": weekdays,
        "slots": grid.slots(),
        "rows": grid.rows(),
    })
}

fn schedule_get(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = require_class(conn, params)?;
    let grid = db::load_schedule(conn, &class_id).db("db_query_failed")?;
    Ok(grid_json(&class_id, &grid))
}

fn schedule_set_slot(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = require_class(conn, params)?;
    let weekday_raw = get_required_str(params, "weekday")?;
    let weekday =
        Weekday::parse(&weekday_raw).ok_or(ScheduleError::UnknownWeekday(weekday_raw))?;
    let slot = WeekGrid::slot_index(get_required_u64(params, "slot")?)?;
    let subject = match params.get("subject").and_then(|v| v.as_str()) {
        Some(raw) => Some(optional_text("subject", raw, MAX_NAME_LEN)?),
        None => None,
    };

    db::set_schedule_slot(conn, &class_id, weekday, slot, subject.as_deref())
        .db("db_update_failed")?;
    let grid = db::load_schedule(conn, &class_id).db("db_query_failed")?;
    Ok(grid_json(&class_id, &grid))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "schedule.get" => Some(with_workspace(state, req, schedule_get)),
        "schedule.setSlot" => Some(with_workspace(state, req, schedule_set_slot)),
        _ => None,
    }
}
