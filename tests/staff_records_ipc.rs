mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, str_field, temp_dir};

#[test]
fn staff_roster_lifecycle() {
    let workspace = temp_dir("rosterd-staff");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.create",
        json!({
            "name": "Carlos Mendes",
            "registration": "PROF-001",
            "cpf": "123.456.789-00",
            "subjects": ["Matemática"],
            "gradeLevels": ["6º Ano", "7º Ano"],
        }),
    );
    let teacher_id = str_field(&created, "teacherId").to_string();
    assert_eq!(created["teacher"]["status"], "active");
    assert_eq!(created["teacher"]["registration"], "PROF-001");

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.update",
        json!({
            "id": teacher_id,
            "name": "Carlos Mendes",
            "status": "active",
            "transferDate": "2024-06-01",
        }),
    );
    assert_eq!(error_code(&refused), "validation_failed");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.update",
        json!({
            "id": teacher_id,
            "name": "Carlos Mendes",
            "status": "transferred",
            "transferDate": "2024-06-01",
            "subjects": ["Matemática", "Física"],
        }),
    );
    assert_eq!(updated["teacher"]["transferDate"], "2024-06-01");

    let listed = request_ok(&mut stdin, &mut reader, "5", "teachers.list", json!({}));
    let teachers = listed["teachers"].as_array().expect("teachers");
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0]["subjects"], json!(["Matemática", "Física"]));
    assert_eq!(teachers[0]["status"], "transferred");

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "management.create",
        json!({ "name": "Paula Rocha" }),
    );
    assert_eq!(error_code(&refused), "validation_failed");
    let member = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "management.create",
        json!({ "name": "Paula Rocha", "position": "Diretora", "email": "paula@escola.br" }),
    );
    let member_id = str_field(&member, "memberId").to_string();
    let found = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "management.list",
        json!({ "query": "diretora" }),
    );
    assert_eq!(found["members"].as_array().map(|a| a.len()), Some(1));

    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "management.delete",
        json!({ "id": member_id }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "teachers.delete",
        json!({ "id": teacher_id }),
    );
    let refused = request_err(
        &mut stdin,
        &mut reader,
        "11",
        "teachers.delete",
        json!({ "id": teacher_id }),
    );
    assert_eq!(error_code(&refused), "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn events_meetings_and_timetable() {
    let workspace = temp_dir("rosterd-records");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "events.create",
        json!({ "title": "Feira de Ciências" }),
    );
    assert_eq!(error_code(&refused), "validation_failed");

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "events.create",
        json!({
            "title": "Feira de Ciências",
            "date": "2024-09-20",
            "startTime": "14:00",
            "endTime": "10:00",
        }),
    );
    assert_eq!(error_code(&refused), "validation_failed");

    let event = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "events.create",
        json!({ "title": "Feira de Ciências", "date": "2024-09-20", "location": "Pátio" }),
    );
    assert_eq!(event["event"]["startTime"], "08:00");
    assert_eq!(event["event"]["endTime"], "09:00");
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "events.create",
        json!({ "title": "Reunião de Pais", "date": "2024-09-21" }),
    );
    let on_day = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "events.list",
        json!({ "date": "2024-09-20" }),
    );
    let events = on_day["events"].as_array().expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Feira de Ciências");

    let meeting = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "meetings.create",
        json!({
            "title": "Conselho de Classe",
            "date": "2024-10-01",
            "time": "15:30",
            "attendees": "Professores do 6º Ano",
            "status": "Realizada",
        }),
    );
    assert_eq!(meeting["meeting"]["status"], "held");
    let found = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "meetings.list",
        json!({ "query": "professores" }),
    );
    assert_eq!(found["meetings"].as_array().map(|a| a.len()), Some(1));

    let class = request_ok(
        &mut stdin,
        &mut reader,
        "9",
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
    let grid = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "schedule.setSlot",
        json!({ "classId": class_id, "weekday": "quarta", "slot": 2, "subject": "Matemática" }),
    );
    assert_eq!(grid["rows"][1][2], "Matemática");
    assert_eq!(grid["slots"].as_array().map(|a| a.len()), Some(25));

    let refused = request_err(
        &mut stdin,
        &mut reader,
        "11",
        "schedule.setSlot",
        json!({ "classId": class_id, "weekday": "monday", "slot": 6, "subject": "Artes" }),
    );
    assert_eq!(error_code(&refused), "bad_params");

    let grid = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "schedule.setSlot",
        json!({ "classId": class_id, "weekday": "wednesday", "slot": 2, "subject": null }),
    );
    assert!(grid["rows"][1][2].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
