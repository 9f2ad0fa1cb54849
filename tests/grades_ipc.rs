mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, str_field, temp_dir};

fn approx(v: &serde_json::Value, expected: f64) -> bool {
    v.as_f64().map(|x| (x - expected).abs() < 1e-9).unwrap_or(false)
}

#[test]
fn bimester_scores_drive_average_and_status() {
    let workspace = temp_dir("rosterd-grades");
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
            "name": "6º Ano A",
            "teacher": "Maria Silva",
            "period": "Manhã",
            "room": "Sala 1",
            "capacity": 35,
        }),
    );
    let class_id = str_field(&class, "classId").to_string();

    let ana = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "name": "Ana Silva", "classId": class_id, "grade": "6º Ano" }),
    );
    let ana_id = str_field(&ana, "studentId").to_string();
    let bruno = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "name": "Bruno Costa", "classId": class_id, "grade": "6º Ano" }),
    );
    let bruno_id = str_field(&bruno, "studentId").to_string();

    // Nobody graded yet: no class average.
    let open = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.classOpen",
        json!({ "classId": class_id, "subject": "Matemática" }),
    );
    assert!(open["classAverage"].is_null());
    assert_eq!(open["ungraded"].as_array().map(|a| a.len()), Some(2));

    let mut n = 10;
    for (bimester, value) in [("b1", 8.5), ("b2", 7.2), ("b3", 8.0), ("b4", 9.1)] {
        n += 1;
        request_ok(
            &mut stdin,
            &mut reader,
            &n.to_string(),
            "grades.set",
            json!({
                "studentId": ana_id,
                "subject": "Matemática",
                "bimester": bimester,
                "value": value,
            }),
        );
    }
    let last = request_ok(
        &mut stdin,
        &mut reader,
        "20",
        "grades.set",
        json!({
            "studentId": bruno_id,
            "subject": "Matemática",
            "bimester": 1,
            "value": 6.0,
        }),
    );
    // Unset bimesters start at zero.
    assert!(approx(&last["average"], 1.5));
    assert_eq!(last["status"], "failed");
    assert_eq!(last["band"], "low");

    let open = request_ok(
        &mut stdin,
        &mut reader,
        "21",
        "grades.classOpen",
        json!({ "classId": class_id, "subject": "Matemática" }),
    );
    let rows = open["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    let ana_row = rows
        .iter()
        .find(|r| r["studentId"] == ana_id.as_str())
        .expect("ana row");
    assert!(approx(&ana_row["average"], 8.2));
    assert_eq!(ana_row["status"], "approved");
    assert_eq!(ana_row["band"], "high");
    assert!(approx(&open["classAverage"], (8.2 + 1.5) / 2.0));
    assert_eq!(open["subjects"], json!(["Matemática"]));

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "22",
        "grades.studentSummary",
        json!({ "studentId": ana_id }),
    );
    assert!(approx(&summary["overallAverage"], 8.2));
    assert_eq!(summary["subjects"][0]["subject"], "Matemática");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn out_of_range_scores_are_refused() {
    let workspace = temp_dir("rosterd-grades-range");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let student = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": "Carla Dias" }),
    );
    let student_id = str_field(&student, "studentId").to_string();

    for (i, value) in [10.5, -0.1].into_iter().enumerate() {
        let refused = request_err(
            &mut stdin,
            &mut reader,
            &format!("3-{}", i),
            "grades.set",
            json!({
                "studentId": student_id,
                "subject": "História",
                "bimester": "b2",
                "value": value,
            }),
        );
        assert_eq!(error_code(&refused), "validation_failed");
    }

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "grades.set",
        json!({
            "studentId": student_id,
            "subject": "História",
            "bimester": "b5",
            "value": 7.0,
        }),
    );
    assert_eq!(error_code(&refused), "bad_params");

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.studentSummary",
        json!({ "studentId": student_id }),
    );
    assert!(summary["overallAverage"].is_null());
    assert_eq!(summary["subjects"], json!([]));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
