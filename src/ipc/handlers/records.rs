use crate::db::{self, RecordTable};
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_str_or_empty, search, with_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{
    check_event_times, optional_text, parse_date, parse_time, require_text, Document, Event,
    Meeting, MeetingStatus, MAX_NAME_LEN, MAX_TEXT_LEN,
};
use chrono::{Local, NaiveTime};
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

/// Blank or missing times fall back to `default` (`HH:MM`).
fn time_or(params: &Value, key: &'static str, default: &str) -> Result<NaiveTime, HandlerErr> {
    let raw = get_optional_str(params, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    Ok(parse_time(key, &raw)?)
}

fn delete_record(
    conn: &Connection,
    params: &Value,
    table: RecordTable,
) -> Result<Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    if !db::delete_by_id(conn, table, &id).db("db_delete_failed")? {
        return Err(HandlerErr::not_found("record not found"));
    }
    Ok(json!({ "ok": true }))
}

// ---------------------------------------------------------------------------
// events

fn events_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let on = match get_optional_str(params, "date") {
        Some(raw) if !raw.trim().is_empty() => Some(parse_date("date", &raw)?),
        _ => None,
    };
    let events = db::list_events(conn, on).db("db_query_failed")?;
    let matched = search(&events, params)?;
    Ok(json!({ "events": matched }))
}

fn events_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let title = require_text("title", &get_str_or_empty(params, "title"), MAX_NAME_LEN)?;
    let date_raw = require_text("date", &get_str_or_empty(params, "date"), MAX_NAME_LEN)?;
    let date = parse_date("date", &date_raw)?;
    let start_time = time_or(params, "startTime", "08:00")?;
    let end_time = time_or(params, "endTime", "09:00")?;
    check_event_times(start_time, end_time)?;

    let event = Event {
        id: Uuid::new_v4().to_string(),
        title,
        date,
        start_time,
        end_time,
        location: optional_text("location", &get_str_or_empty(params, "location"), MAX_NAME_LEN)?,
    };
    db::insert_event(conn, &event)
        .db("db_insert_failed")
        .map_err(|e| e.with_details(json!({ "table": "events" })))?;
    Ok(json!({ "eventId": event.id, "event": event }))
}

fn events_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    delete_record(conn, params, RecordTable::Events)
}

// ---------------------------------------------------------------------------
// documents

fn documents_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let documents = db::list_documents(conn).db("db_query_failed")?;
    let matched = search(&documents, params)?;
    Ok(json!({ "documents": matched }))
}

fn documents_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let document = Document {
        id: Uuid::new_v4().to_string(),
        title: require_text("title", &get_str_or_empty(params, "title"), MAX_NAME_LEN)?,
        doc_type: require_text("type", &get_str_or_empty(params, "type"), MAX_NAME_LEN)?,
        description: optional_text(
            "description",
            &get_str_or_empty(params, "description"),
            MAX_TEXT_LEN,
        )?,
        created_at: Local::now().date_naive(),
    };
    db::insert_document(conn, &document)
        .db("db_insert_failed")
        .map_err(|e| e.with_details(json!({ "table": "documents" })))?;
    Ok(json!({ "documentId": document.id, "document": document }))
}

fn documents_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    delete_record(conn, params, RecordTable::Documents)
}

// ---------------------------------------------------------------------------
// meetings

fn meetings_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let meetings = db::list_meetings(conn).db("db_query_failed")?;
    let matched = search(&meetings, params)?;
    Ok(json!({ "meetings": matched }))
}

fn meetings_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let title = require_text("title", &get_str_or_empty(params, "title"), MAX_NAME_LEN)?;
    let date_raw = require_text("date", &get_str_or_empty(params, "date"), MAX_NAME_LEN)?;
    let status = match get_optional_str(params, "status") {
        None => MeetingStatus::Scheduled,
        Some(raw) => MeetingStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::validation(format!("unknown status: {}", raw)))?,
    };
    let meeting = Meeting {
        id: Uuid::new_v4().to_string(),
        title,
        date: parse_date("date", &date_raw)?,
        time: time_or(params, "time", "08:00")?,
        location: optional_text("location", &get_str_or_empty(params, "location"), MAX_NAME_LEN)?,
        attendees: optional_text("attendees", &get_str_or_empty(params, "attendees"), MAX_TEXT_LEN)?,
        status,
    };
    db::insert_meeting(conn, &meeting)
        .db("db_insert_failed")
        .map_err(|e| e.with_details(json!({ "table": "meetings" })))?;
    Ok(json!({ "meetingId": meeting.id, "meeting": meeting }))
}

fn meetings_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    delete_record(conn, params, RecordTable::Meetings)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "events.list" => Some(with_workspace(state, req, events_list)),
        "events.create" => Some(with_workspace(state, req, events_create)),
        "events.delete" => Some(with_workspace(state, req, events_delete)),
        "documents.list" => Some(with_workspace(state, req, documents_list)),
        "documents.create" => Some(with_workspace(state, req, documents_create)),
        "documents.delete" => Some(with_workspace(state, req, documents_delete)),
        "meetings.list" => Some(with_workspace(state, req, meetings_list)),
        "meetings.create" => Some(with_workspace(state, req, meetings_create)),
        "meetings.delete" => Some(with_workspace(state, req, meetings_delete)),
        _ => None,
    }
}
