mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, str_field, temp_dir};

#[test]
fn attendance_dates_marks_and_rates() {
    let workspace = temp_dir("rosterd-attendance");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let class = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({
            "name": "5º Ano B",
            "teacher": "João Pereira",
            "period": "Tarde",
            "room": "Sala 3",
            "capacity": 30,
        }),
    );
    let class_id = str_field(&class, "classId").to_string();
    let mut ids = Vec::new();
    for (i, name) in ["Ana Silva", "Bruno Costa"].iter().enumerate() {
        let s = request_ok(
            &mut stdin,
            &mut reader,
            &format!("3-{}", i),
            "students.create",
            json!({ "name": name, "classId": class_id }),
        );
        ids.push(str_field(&s, "studentId").to_string());
    }

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.addDate",
        json!({ "classId": class_id, "date": "2024-03-04" }),
    );
    assert_eq!(added["marked"], 2);
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.addDate",
        json!({ "classId": class_id, "date": "2024-03-05" }),
    );

    let dup = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.addDate",
        json!({ "classId": class_id, "date": "2024-03-04" }),
    );
    assert_eq!(error_code(&dup), "duplicate_date");

    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "attendance.toggle",
        json!({ "classId": class_id, "studentId": ids[0], "date": "2024-03-05" }),
    );
    assert_eq!(toggled["mark"], "absent");

    let sheet = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "attendance.sheetOpen",
        json!({ "classId": class_id }),
    );
    assert_eq!(sheet["dates"], json!(["2024-03-04", "2024-03-05"]));
    let rows = sheet["rows"].as_array().expect("rows");
    let ana = rows
        .iter()
        .find(|r| r["studentId"] == ids[0].as_str())
        .expect("ana row");
    assert_eq!(ana["marks"], json!(["present", "absent"]));
    assert_eq!(ana["rate"], 50);
    let bruno = rows
        .iter()
        .find(|r| r["studentId"] == ids[1].as_str())
        .expect("bruno row");
    assert_eq!(bruno["rate"], 100);

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "attendance.studentStats",
        json!({ "studentId": ids[0] }),
    );
    assert_eq!(
        stats["stats"],
        json!({ "total": 2, "present": 1, "absent": 1, "rate": 50 })
    );

    // Toggling twice flips the mark back.
    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "attendance.toggle",
        json!({ "classId": class_id, "studentId": ids[0], "date": "2024-03-05" }),
    );
    assert_eq!(toggled["mark"], "present");

    let profile = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.open",
        json!({ "studentId": ids[0] }),
    );
    assert_eq!(profile["attendanceStats"]["rate"], 100);
    assert_eq!(profile["student"]["className"], "5º Ano B");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn toggling_an_unrecorded_mark_is_refused() {
    let workspace = temp_dir("rosterd-attendance-unset");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let class = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({
            "name": "4º Ano",
            "teacher": "Ana",
            "period": "Manhã",
            "room": "Sala 4",
            "capacity": 30,
        }),
    );
    let class_id = str_field(&class, "classId").to_string();
    let s = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "name": "Diego Lima", "classId": class_id }),
    );
    let student_id = str_field(&s, "studentId").to_string();

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.toggle",
        json!({ "classId": class_id, "studentId": student_id, "date": "2024-03-04" }),
    );
    assert_eq!(error_code(&refused), "mark_not_initialized");

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.addDate",
        json!({ "classId": class_id, "date": "04/03/2024" }),
    );
    assert_eq!(error_code(&refused), "bad_params");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
