use crate::attendance::{attendance_rate, attendance_stats, DateKey, LedgerError, Mark};
use crate::db;
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_str, with_workspace};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Value};

impl From<LedgerError> for HandlerErr {
    fn from(e: LedgerError) -> Self {
        match &e {
            LedgerError::BadDate(_) => HandlerErr::bad_params(e.to_string()),
            LedgerError::DuplicateDate(date) => HandlerErr::new("duplicate_date", e.to_string())
                .with_details(json!({ "date": date })),
            LedgerError::MarkNotInitialized { student_id, date } => {
                HandlerErr::new("mark_not_initialized", e.to_string())
                    .with_details(json!({ "studentId": student_id, "date": date }))
            }
        }
    }
}

fn require_class(conn: &Connection, params: &Value) -> Result<String, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    if !db::class_exists(conn, &class_id).db("db_query_failed")? {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(class_id)
}

fn attendance_sheet_open(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = require_class(conn, params)?;
    let students = db::list_students(conn, Some(&class_id)).db("db_query_failed")?;
    let ledger = db::load_ledger(conn, &class_id).db("db_query_failed")?;
    let dates: Vec<DateKey> = ledger.dates().collect();

    let rows: Vec<Value> = students
        .iter()
        .map(|s| {
            // Students enrolled after a date was added have no mark for it.
            let marks: Vec<Option<Mark>> = dates.iter().map(|d| ledger.mark(&s.id, *d)).collect();
            let recorded: Vec<Mark> = marks.iter().flatten().copied().collect();
            json!({
                "studentId": s.id,
                "displayName": s.name,
                "marks": marks,
                "rate": attendance_rate(&recorded),
            })
        })
        .collect();

    Ok(json!({
        "classId": class_id,
        "dates": dates,
        "rows": rows,
    }))
}

fn attendance_add_date(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = require_class(conn, params)?;
    let date = DateKey::parse(&get_required_str(params, "date")?)?;
    let students = db::list_students(conn, Some(&class_id)).db("db_query_failed")?;
    let student_ids: Vec<String> = students.into_iter().map(|s| s.id).collect();

    let mut ledger = db::load_ledger(conn, &class_id).db("db_query_failed")?;
    ledger.add_date(date, student_ids.iter().map(String::as_str))?;
    db::insert_attendance_date(conn, &class_id, date, &student_ids).db("db_tx_failed")?;
    tracing::info!(class_id = %class_id, date = %date, students = student_ids.len(), "attendance date added");

    Ok(json!({ "date": date, "marked": student_ids.len() }))
}

fn attendance_toggle(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = require_class(conn, params)?;
    let student_id = get_required_str(params, "studentId")?;
    let date = DateKey::parse(&get_required_str(params, "date")?)?;

    let mut ledger = db::load_ledger(conn, &class_id).db("db_query_failed")?;
    let mark = ledger.toggle_mark(&student_id, date)?;
    db::set_mark(conn, &class_id, &student_id, date, mark).db("db_update_failed")?;

    Ok(json!({ "studentId": student_id, "date": date, "mark": mark }))
}

/// Totals for one student, optionally scoped to one class sheet.
fn attendance_student_stats(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if db::get_student(conn, &student_id)
        .db("db_query_failed")?
        .is_none()
    {
        return Err(HandlerErr::not_found("student not found"));
    }
    let history = match get_optional_str(params, "classId") {
        Some(class_id) => db::load_ledger(conn, &class_id)
            .db("db_query_failed")?
            .student_marks(&student_id),
        None => db::student_marks(conn, &student_id).db("db_query_failed")?,
    };
    let marks: Vec<Mark> = history.iter().map(|(_, m)| *m).collect();
    let entries: Vec<Value> = history
        .iter()
        .map(|(date, mark)| json!({ "date": date, "mark": mark }))
        .collect();

    Ok(json!({
        "studentId": student_id,
        "stats": attendance_stats(&marks),
        "entries": entries,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "attendance.sheetOpen" => Some(with_workspace(state, req, attendance_sheet_open)),
        "attendance.addDate" => Some(with_workspace(state, req, attendance_add_date)),
        "attendance.toggle" => Some(with_workspace(state, req, attendance_toggle)),
        "attendance.studentStats" => Some(with_workspace(state, req, attendance_student_stats)),
        _ => None,
    }
}
