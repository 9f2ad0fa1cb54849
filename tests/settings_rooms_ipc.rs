mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn room_count_setting_drives_room_list() {
    let workspace = temp_dir("rosterd-settings-rooms");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let settings = request_ok(&mut stdin, &mut reader, "2", "settings.get", json!({}));
    assert_eq!(settings["numberOfRooms"], 9);
    let rooms = request_ok(&mut stdin, &mut reader, "3", "rooms.list", json!({}));
    let rooms = rooms["rooms"].as_array().expect("rooms").clone();
    assert_eq!(rooms.len(), 9);
    assert_eq!(
        rooms[0],
        json!({ "id": "room_1", "name": "Sala 1", "capacity": 35 })
    );
    assert_eq!(rooms[8]["name"], "Sala 9");

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "settings.update",
        json!({ "numberOfRooms": 3 }),
    );
    let rooms = request_ok(&mut stdin, &mut reader, "5", "rooms.list", json!({}));
    let names: Vec<&str> = rooms["rooms"]
        .as_array()
        .expect("rooms")
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Sala 1", "Sala 2", "Sala 3"]);

    for (i, bad) in [json!(0), json!(201), json!("4")].into_iter().enumerate() {
        let refused = request_err(
            &mut stdin,
            &mut reader,
            &format!("6-{}", i),
            "settings.update",
            json!({ "numberOfRooms": bad }),
        );
        assert_eq!(error_code(&refused), "bad_params");
    }
    let settings = request_ok(&mut stdin, &mut reader, "7", "settings.get", json!({}));
    assert_eq!(settings["numberOfRooms"], 3);

    drop(stdin);
    let _ = child.wait();

    // The setting survives a restart.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let settings = request_ok(&mut stdin, &mut reader, "2", "settings.get", json!({}));
    assert_eq!(settings["numberOfRooms"], 3);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
