//! Teacher and management rosters. Both share the identity block and the
//! employment status rules; only teachers carry subjects and grade levels.

use crate::db::{self, RecordTable};
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_str_or_empty, get_string_list, search, with_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{
    check_transfer_date, optional_text, parse_date, require_text, ManagementMember,
    StaffIdentity, StaffStatus, Teacher, MAX_IDENTIFIER_LEN, MAX_NAME_LEN,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

fn identity_from_params(params: &Value) -> Result<StaffIdentity, HandlerErr> {
    Ok(StaffIdentity {
        registration: optional_text(
            "registration",
            &get_str_or_empty(params, "registration"),
            MAX_IDENTIFIER_LEN,
        )?,
        rg: optional_text("rg", &get_str_or_empty(params, "rg"), MAX_IDENTIFIER_LEN)?,
        cpf: optional_text("cpf", &get_str_or_empty(params, "cpf"), MAX_IDENTIFIER_LEN)?,
        email: optional_text("email", &get_str_or_empty(params, "email"), MAX_NAME_LEN)?,
        phone: optional_text("phone", &get_str_or_empty(params, "phone"), MAX_IDENTIFIER_LEN)?,
    })
}

fn status_from_params(
    params: &Value,
) -> Result<(StaffStatus, Option<NaiveDate>), HandlerErr> {
    let status = match get_optional_str(params, "status") {
        None => StaffStatus::Active,
        Some(raw) => StaffStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::validation(format!("unknown status: {}", raw)))?,
    };
    let transfer_date = match get_optional_str(params, "transferDate") {
        Some(raw) if !raw.trim().is_empty() => Some(parse_date("transferDate", &raw)?),
        _ => None,
    };
    check_transfer_date(status, transfer_date)?;
    Ok((status, transfer_date))
}

/// Resolves the record id: a fresh one on create, an existing one on update.
fn record_id(
    conn: &Connection,
    table: RecordTable,
    params: &Value,
    create: bool,
) -> Result<String, HandlerErr> {
    if create {
        return Ok(Uuid::new_v4().to_string());
    }
    let id = get_required_str(params, "id")?;
    if !db::row_exists(conn, table, &id).db("db_query_failed")? {
        return Err(HandlerErr::not_found("record not found"));
    }
    Ok(id)
}

fn teacher_from_params(id: String, params: &Value) -> Result<Teacher, HandlerErr> {
    let name = require_text("name", &get_str_or_empty(params, "name"), MAX_NAME_LEN)?;
    let (status, transfer_date) = status_from_params(params)?;
    Ok(Teacher {
        id,
        name,
        identity: identity_from_params(params)?,
        status,
        transfer_date,
        subjects: get_string_list(params, "subjects")?,
        grade_levels: get_string_list(params, "gradeLevels")?,
    })
}

fn member_from_params(id: String, params: &Value) -> Result<ManagementMember, HandlerErr> {
    let name = require_text("name", &get_str_or_empty(params, "name"), MAX_NAME_LEN)?;
    let position = require_text("position", &get_str_or_empty(params, "position"), MAX_NAME_LEN)?;
    let (status, transfer_date) = status_from_params(params)?;
    Ok(ManagementMember {
        id,
        name,
        identity: identity_from_params(params)?,
        position,
        status,
        transfer_date,
    })
}

fn teachers_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let teachers = db::list_teachers(conn).db("db_query_failed")?;
    let matched = search(&teachers, params)?;
    Ok(json!({ "teachers": matched }))
}

fn save_teacher(conn: &Connection, params: &Value, create: bool) -> Result<Value, HandlerErr> {
    let id = record_id(conn, RecordTable::Teachers, params, create)?;
    let teacher = teacher_from_params(id, params)?;
    db::upsert_teacher(conn, &teacher)
        .db(if create { "db_insert_failed" } else { "db_update_failed" })
        .map_err(|e| e.with_details(json!({ "table": "teachers" })))?;
    Ok(json!({ "teacherId": teacher.id, "teacher": teacher }))
}

fn teachers_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    save_teacher(conn, params, true)
}

fn teachers_update(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    save_teacher(conn, params, false)
}

fn teachers_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    if !db::delete_by_id(conn, RecordTable::Teachers, &id).db("db_delete_failed")? {
        return Err(HandlerErr::not_found("teacher not found"));
    }
    Ok(json!({ "ok": true }))
}

fn management_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let members = db::list_management(conn).db("db_query_failed")?;
    let matched = search(&members, params)?;
    Ok(json!({ "members": matched }))
}

fn save_member(conn: &Connection, params: &Value, create: bool) -> Result<Value, HandlerErr> {
    let id = record_id(conn, RecordTable::Management, params, create)?;
    let member = member_from_params(id, params)?;
    db::upsert_management(conn, &member)
        .db(if create { "db_insert_failed" } else { "db_update_failed" })
        .map_err(|e| e.with_details(json!({ "table": "management_members" })))?;
    Ok(json!({ "memberId": member.id, "member": member }))
}

fn management_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    save_member(conn, params, true)
}

fn management_update(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    save_member(conn, params, false)
}

fn management_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    if !db::delete_by_id(conn, RecordTable::Management, &id).db("db_delete_failed")? {
        return Err(HandlerErr::not_found("member not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "teachers.list" => Some(with_workspace(state, req, teachers_list)),
        "teachers.create" => Some(with_workspace(state, req, teachers_create)),
        "teachers.update" => Some(with_workspace(state, req, teachers_update)),
        "teachers.delete" => Some(with_workspace(state, req, teachers_delete)),
        "management.list" => Some(with_workspace(state, req, management_list)),
        "management.create" => Some(with_workspace(state, req, management_create)),
        "management.update" => Some(with_workspace(state, req, management_update)),
        "management.delete" => Some(with_workspace(state, req, management_delete)),
        _ => None,
    }
}
