use crate::conflicts::{
    check_conflict, validate_section_form, ConflictResult, ProposedSection, SectionForm,
    SectionFormError,
};
use crate::db;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_str, search, with_workspace};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

impl From<SectionFormError> for HandlerErr {
    fn from(e: SectionFormError) -> Self {
        let details = match &e {
            SectionFormError::MissingFields(fields) => Some(json!({ "missing": fields })),
            _ => None,
        };
        HandlerErr {
            code: "validation_failed",
            message: e.to_string(),
            details,
        }
    }
}

fn parse_capacity(v: Option<&Value>) -> Result<Option<i64>, HandlerErr> {
    let Some(v) = v else { return Ok(None) };
    if v.is_null() {
        return Ok(None);
    }
    if let Some(n) = v.as_i64() {
        return Ok(Some(n));
    }
    if let Some(s) = v.as_str() {
        let t = s.trim();
        if t.is_empty() {
            return Ok(None);
        }
        return t
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SectionFormError::InvalidCapacity.into());
    }
    Err(SectionFormError::InvalidCapacity.into())
}

fn form_from_params(params: &Value) -> Result<SectionForm, HandlerErr> {
    Ok(SectionForm {
        id: get_optional_str(params, "id"),
        name: get_optional_str(params, "name"),
        teacher: get_optional_str(params, "teacher"),
        period: get_optional_str(params, "period"),
        room: get_optional_str(params, "room"),
        capacity: parse_capacity(params.get("capacity"))?,
        enrolled_count: params
            .get("enrolledCount")
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        year: get_optional_str(params, "year"),
    })
}

/// Validates the form. A section already in the store is checked with the
/// students linked to it; `enrolledCount` only counts for unsaved sections.
fn prepare(conn: &Connection, params: &Value) -> Result<ProposedSection, HandlerErr> {
    let form = form_from_params(params)?;
    let mut proposed = validate_section_form(&form)?;
    if let Some(id) = proposed.id.as_deref() {
        if let Some(current) = db::get_class(conn, id).db("db_query_failed")? {
            proposed.enrolled_count = current.enrolled_count;
        }
    }
    Ok(proposed)
}

fn conflict_err(result: &ConflictResult, proposed: &ProposedSection) -> Option<HandlerErr> {
    match result {
        ConflictResult::Ok => None,
        ConflictResult::RoomOccupied {
            conflicting_section_name,
        } => Some(
            HandlerErr::new(
                "room_occupied",
                format!(
                    "room {} is already taken in period {} by class {}",
                    proposed.room,
                    proposed.period.label(),
                    conflicting_section_name
                ),
            )
            .with_details(json!({ "conflict": result })),
        ),
        ConflictResult::OverCapacity { room_capacity } => Some(
            HandlerErr::new(
                "over_capacity",
                format!("room {} holds {} students", proposed.room, room_capacity),
            )
            .with_details(json!({ "conflict": result })),
        ),
    }
}

fn classes_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let sections = db::list_classes(conn).db("db_query_failed")?;
    let matched = search(&sections, params)?;
    Ok(json!({ "classes": matched }))
}

fn classes_check_conflict(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let proposed = prepare(conn, params)?;
    let existing = db::list_classes(conn).db("db_query_failed")?;
    let result = check_conflict(&proposed, &existing);
    Ok(json!({ "result": result }))
}

fn classes_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    // A new section has no students yet.
    let mut proposed = validate_section_form(&form_from_params(params)?)?;
    proposed.id = None;
    proposed.enrolled_count = 0;
    let existing = db::list_classes(conn).db("db_query_failed")?;
    let result = check_conflict(&proposed, &existing);
    if let Some(e) = conflict_err(&result, &proposed) {
        tracing::warn!(room = %proposed.room, period = proposed.period.key(), code = e.code, "class create rejected");
        return Err(e);
    }

    let section = proposed.into_section(Uuid::new_v4().to_string());
    db::insert_class(conn, &section)
        .db("db_insert_failed")
        .map_err(|e| e.with_details(json!({ "table": "classes" })))?;
    Ok(json!({ "classId": section.id, "class": section }))
}

fn classes_update(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "id")?;
    if !db::class_exists(conn, &class_id).db("db_query_failed")? {
        return Err(HandlerErr::not_found("class not found"));
    }
    let proposed = prepare(conn, params)?;
    let existing = db::list_classes(conn).db("db_query_failed")?;
    let result = check_conflict(&proposed, &existing);
    if let Some(e) = conflict_err(&result, &proposed) {
        tracing::warn!(class_id = %class_id, code = e.code, "class update rejected");
        return Err(e);
    }

    let section = proposed.into_section(class_id);
    db::update_class(conn, &section)
        .db("db_update_failed")
        .map_err(|e| e.with_details(json!({ "table": "classes" })))?;
    Ok(json!({ "class": section }))
}

fn classes_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    if !db::delete_class(conn, &class_id).db("db_delete_failed")? {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "classes.list" => Some(with_workspace(state, req, classes_list)),
        "classes.checkConflict" => Some(with_workspace(state, req, classes_check_conflict)),
        "classes.create" => Some(with_workspace(state, req, classes_create)),
        "classes.update" => Some(with_workspace(state, req, classes_update)),
        "classes.delete" => Some(with_workspace(state, req, classes_delete)),
        _ => None,
    }
}
