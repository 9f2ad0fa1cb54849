use crate::db;
use crate::grades::{
    class_average, compute_average, grade_band, overall_average, status_for, student_grade_row,
    validate_score, Bimester, BimesterScores, GradeRecord,
};
use crate::ipc::error::{DbResultExt, HandlerErr};
use crate::ipc::helpers::{get_required_f64, get_required_str, with_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::{require_text, MAX_NAME_LEN};
use rusqlite::Connection;
use serde_json::{json, Value};

/// Per-subject lines of a report card.
pub(crate) fn subject_summaries(record: &GradeRecord) -> Vec<Value> {
    record
        .iter()
        .map(|(subject, scores)| {
            let average = compute_average(*scores);
            json!({
                "subject": subject,
                "scores": scores,
                "average": average,
                "status": status_for(average),
                "band": grade_band(average),
            })
        })
        .collect()
}

fn grades_class_open(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let subject = require_text("subject", &get_required_str(params, "subject")?, MAX_NAME_LEN)?;
    if !db::class_exists(conn, &class_id).db("db_query_failed")? {
        return Err(HandlerErr::not_found("class not found"));
    }

    let students = db::list_students(conn, Some(&class_id)).db("db_query_failed")?;
    let mut rows = Vec::with_capacity(students.len());
    let mut ungraded = Vec::new();
    for s in &students {
        match db::get_scores(conn, &s.id, &subject).db("db_query_failed")? {
            Some(scores) => rows.push(student_grade_row(&s.id, &s.name, scores)),
            None => ungraded.push(json!({ "studentId": s.id, "displayName": s.name })),
        }
    }
    let graded: Vec<BimesterScores> = rows.iter().map(|r| r.scores).collect();
    let subjects = db::class_subjects(conn, &class_id).db("db_query_failed")?;

    Ok(json!({
        "classId": class_id,
        "subject": subject,
        "subjects": subjects,
        "rows": rows,
        "ungraded": ungraded,
        "classAverage": class_average(&graded),
    }))
}

fn grades_set(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let subject = require_text("subject", &get_required_str(params, "subject")?, MAX_NAME_LEN)?;
    let bimester_raw = match params.get("bimester") {
        Some(Value::Number(n)) => n.to_string(),
        _ => get_required_str(params, "bimester")?,
    };
    let Some(bimester) = Bimester::parse(&bimester_raw) else {
        return Err(HandlerErr::bad_params(format!(
            "bimester must be b1..b4, got {}",
            bimester_raw
        )));
    };
    let value = get_required_f64(params, "value")?;
    let value = validate_score(value).map_err(|e| HandlerErr::validation(e.to_string()))?;

    if db::get_student(conn, &student_id)
        .db("db_query_failed")?
        .is_none()
    {
        return Err(HandlerErr::not_found("student not found"));
    }

    let mut scores = db::get_scores(conn, &student_id, &subject)
        .db("db_query_failed")?
        .unwrap_or_default();
    scores.set(bimester, value);
    db::upsert_scores(conn, &student_id, &subject, scores).db("db_update_failed")?;
    tracing::debug!(student_id = %student_id, subject = %subject, bimester = bimester.column(), "score set");

    let row = student_grade_row(&student_id, "", scores);
    Ok(json!({
        "scores": row.scores,
        "average": row.average,
        "status": row.status,
        "band": row.band,
    }))
}

fn grades_student_summary(conn: &Connection, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if db::get_student(conn, &student_id)
        .db("db_query_failed")?
        .is_none()
    {
        return Err(HandlerErr::not_found("student not found"));
    }
    let record = db::grade_record(conn, &student_id).db("db_query_failed")?;
    Ok(json!({
        "studentId": student_id,
        "subjects": subject_summaries(&record),
        "overallAverage": overall_average(&record),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "grades.classOpen" => Some(with_workspace(state, req, grades_class_open)),
        "grades.set" => Some(with_workspace(state, req, grades_set)),
        "grades.studentSummary" => Some(with_workspace(state, req, grades_student_summary)),
        _ => None,
    }
}
