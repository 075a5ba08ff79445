mod test_support;

use serde_json::json;
use test_support::{open_workspace, request, request_err, request_ok, spawn_sidecar};

#[test]
fn json_export_import_round_trip_and_rejects_missing_chapters() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "jeetrack-exchange-json");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "tools.execute",
        json!({ "calls": [ { "name": "addTest", "args": { "name": "AITS 3", "date": "2025-10-30", "type": "part test" } } ] }),
    );
    let exported = request_ok(&mut stdin, &mut reader, "2", "export.json", json!({}));
    let path = exported["path"].as_str().expect("path").to_string();
    assert!(path.ends_with("jee_backup.json"));

    let bad = workspace.join("bad.json");
    std::fs::write(&bad, r#"{ "tests": [], "logs": [] }"#).expect("write bad");
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "import.json",
        json!({ "inPath": bad.to_string_lossy() }),
    );
    assert_eq!(resp.pointer("/error/code"), Some(&json!("import_failed")));
    assert_eq!(
        resp.pointer("/error/message"),
        Some(&json!("Invalid file format: Missing chapters."))
    );
    let state = request_ok(&mut stdin, &mut reader, "4", "state.get", json!({}));
    assert_eq!(state.pointer("/state/tests/0/name"), Some(&json!("AITS 3")));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "tools.execute",
        json!({ "calls": [ { "name": "deleteItem", "args": { "type": "TEST", "identifier": "aits" } } ] }),
    );
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "import.json",
        json!({ "inPath": path }),
    );
    assert_eq!(imported["tests"], json!(1));
    let state = request_ok(&mut stdin, &mut reader, "7", "state.get", json!({}));
    assert_eq!(state.pointer("/state/tests/0/type"), Some(&json!("Part Test")));

    let missing = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "import.json",
        json!({ "inPath": workspace.join("nope.json").to_string_lossy() }),
    );
    assert_eq!(missing, "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn legacy_score_documents_are_migrated_on_import() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "jeetrack-exchange-legacy");

    let old = workspace.join("old.json");
    std::fs::write(
        &old,
        r#"{
            "chapters": [],
            "tests": [ { "id": "t1", "name": "Mock 1", "date": "2024-12-01", "score": "180/300" } ],
            "logs": [ { "date": "2024-12-01", "physicsQ": 5, "chemistryQ": 0, "mathQ": 0, "studyTime": 30 } ]
        }"#,
    )
    .expect("write old");
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "import.json",
        json!({ "inPath": old.to_string_lossy() }),
    );
    assert_eq!(imported["chapters"], json!(0));
    let state = request_ok(&mut stdin, &mut reader, "2", "state.get", json!({}));
    assert_eq!(state.pointer("/state/tests/0/type"), Some(&json!("Full Syllabus")));
    assert_eq!(
        state.pointer("/state/tests/0/notes"),
        Some(&json!("Migrated from old format. Original score: 180/300"))
    );
    assert_eq!(state.pointer("/state/tests/0/scores/physics/correct"), Some(&json!(0)));
    let log_id = state
        .pointer("/state/logs/0/id")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    assert!(!log_id.is_empty());
    assert_eq!(state.pointer("/state/theme"), Some(&json!("dark")));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn csv_import_merges_rows_by_date() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "jeetrack-exchange-csv");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "logs.save",
        json!({ "log": { "date": "2025-11-01", "physicsQ": 1, "chemistryQ": 1, "mathQ": 1, "studyTime": 10 } }),
    );
    let before = request_ok(&mut stdin, &mut reader, "2", "state.get", json!({}));
    let original_id = before
        .pointer("/state/logs/0/id")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let csv_path = workspace.join("incoming.csv");
    std::fs::write(
        &csv_path,
        "Date,Physics,Chemistry,Mathematics,StudyTime,Remarks\n\
         2025-11-01,20,15,10,180,mock review\n\
         2025-11-02,5,5,5,60,light day, tired\n\
         ,1,1,1,1,no date\n\
         2025-11-04,1,2\n",
    )
    .expect("write csv");
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "import.logsCsv",
        json!({ "inPath": csv_path.to_string_lossy() }),
    );
    assert_eq!(imported["imported"], json!(2));
    assert_eq!(imported["logs"], json!(2));

    let state = request_ok(&mut stdin, &mut reader, "4", "state.get", json!({}));
    let logs = state
        .pointer("/state/logs")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    let merged = logs
        .iter()
        .find(|l| l["date"] == json!("2025-11-01"))
        .expect("merged row");
    assert_eq!(merged["physicsQ"], json!(20));
    assert_eq!(merged["studyTime"], json!(180));
    assert_eq!(merged["id"], json!(original_id));
    let added = logs
        .iter()
        .find(|l| l["date"] == json!("2025-11-02"))
        .expect("new row");
    assert_eq!(added["remarks"], json!("light day, tired"));

    let out = workspace.join("out.csv");
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "export.logsCsv",
        json!({ "outPath": out.to_string_lossy() }),
    );
    assert_eq!(exported["rows"], json!(2));
    let text = std::fs::read_to_string(&out).expect("read csv");
    assert!(text.contains("2025-11-02,5,5,5,60,\"light day, tired\""));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
