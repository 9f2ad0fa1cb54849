use crate::attendance::{attendance_stats, Mark};
use crate::conflicts::{check_enrollment, ConflictResult};
use crate::db;
use crate::grades::overall_average;
use crate::ipc::handlers::grades::subject_summaries;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_str_or_empty, search, with_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{optional_text, require_text, Student, StudentStatus, MAX_NAME_LEN};
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

/// Refuses a move into `class_id` once the class is full. Staying in the
/// same class is never checked.
fn ensure_seat(conn: &Connection, class_id: &str, current: Option<&str>) -> Result<(), HandlerErr> {
    if current == Some(class_id) {
        return Ok(());
    }
    let Some(section) = db::get_class(conn, class_id).db("db_query_failed")? else {
        return Err(HandlerErr::not_found("class not found"));
    };
    let result = check_enrollment(&section);
    if let ConflictResult::OverCapacity { room_capacity } = &result {
        tracing::warn!(class_id = %class_id, capacity = *room_capacity, "student enrollment rejected");
        return Err(HandlerErr::new(
            "over_capacity",
            format!("class {} is full ({} students)", section.name, room_capacity),
        )
        .with_details(json!({ "conflict": result })));
    }
    Ok(())
}

fn student_from_params(
    conn: &Connection,
    id: String,
    current_class: Option<&str>,
    params: &Value,
) -> Result<Student, HandlerErr> {
    let name = require_text("name", &get_str_or_empty(params, "name"), MAX_NAME_LEN)?;
    let grade = optional_text("grade", &get_str_or_empty(params, "grade"), MAX_NAME_LEN)?;
    let status = match get_optional_str(params, "status") {
        None => StudentStatus::Active,
        Some(raw) => StudentStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::validation(format!("unknown status: {}", raw)))?,
    };
    let class_id = get_optional_str(params, "classId").filter(|s| !s.trim().is_empty());
    if let Some(cid) = class_id.as_deref() {
        ensure_seat(conn, cid, current_class)?;
    }
    Ok(Student {
        id,
        name,
        class_id,
        class_name: String::new(),
        grade,
        status,
    })
}

fn students_list(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_optional_str(params, "classId");
    let students = db::list_students(conn, class_id.as_deref()).db("db_query_failed")?;
    let matched = search(&students, params)?;
    Ok(json!({ "students": matched }))
}

fn students_create(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student = student_from_params(conn, Uuid::new_v4().to_string(), None, params)?;
    db::insert_student(conn, &student)
        .db("db_insert_failed")
        .map_err(|e| e.with_details(json!({ "table": "students" })))?;
    Ok(json!({ "studentId": student.id }))
}

fn students_update(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "id")?;
    let Some(current) = db::get_student(conn, &student_id).db("db_query_failed")? else {
        return Err(HandlerErr::not_found("student not found"));
    };
    let student = student_from_params(conn, student_id, current.class_id.as_deref(), params)?;
    if !db::update_student(conn, &student).db("db_update_failed")? {
        return Err(HandlerErr::not_found("student not found"));
    }
    Ok(json!({ "ok": true }))
}

fn students_delete(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if !db::delete_student(conn, &student_id).db("db_delete_failed")? {
        return Err(HandlerErr::not_found("student not found"));
    }
    Ok(json!({ "ok": true }))
}

/// Profile page: identity, per-subject grades and attendance history.
fn students_open(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let Some(student) = db::get_student(conn, &student_id).db("db_query_failed")? else {
        return Err(HandlerErr::not_found("student not found"));
    };

    let record = db::grade_record(conn, &student_id).db("db_query_failed")?;
    let history = db::student_marks(conn, &student_id).db("db_query_failed")?;
    let marks: Vec<Mark> = history.iter().map(|(_, m)| *m).collect();
    let history_json: Vec<Value> = history
        .iter()
        .map(|(date, mark)| json!({ "date": date, "mark": mark }))
        .collect();

    Ok(json!({
        "student": student,
        "grades": subject_summaries(&record),
        "overallAverage": overall_average(&record),
        "attendance": history_json,
        "attendanceStats": attendance_stats(&marks),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "students.list" => Some(with_workspace(state, req, students_list)),
        "students.create" => Some(with_workspace(state, req, students_create)),
        "students.update" => Some(with_workspace(state, req, students_update)),
        "students.delete" => Some(with_workspace(state, req, students_delete)),
        "students.open" => Some(with_workspace(state, req, students_open)),
        _ => None,
    }
}
