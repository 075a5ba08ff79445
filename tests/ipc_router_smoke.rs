mod test_support;

use serde_json::json;
use test_support::{request, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("jeetrack-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let csv_out = workspace.join("smoke-logs.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let unknown = request(&mut stdin, &mut reader, "0", "classes.create", json!({}));
    assert_eq!(
        unknown.pointer("/error/code").and_then(|v| v.as_str()),
        Some("not_implemented")
    );
    let before = request(&mut stdin, &mut reader, "0b", "state.get", json!({}));
    assert_eq!(
        before.pointer("/error/code").and_then(|v| v.as_str()),
        Some("no_workspace")
    );

    let calls: Vec<(&str, serde_json::Value)> = vec![
        ("health", json!({})),
        ("workspace.select", json!({ "path": workspace.to_string_lossy() })),
        ("state.get", json!({})),
        ("state.theme.toggle", json!({})),
        ("setup.get", json!({})),
        ("setup.update", json!({ "section": "analytics", "patch": { "smoothingWindow": 2 } })),
        (
            "chapters.add",
            json!({ "chapter": { "name": "Smoke Chapter", "subject": "Chemistry" } }),
        ),
        ("chapters.update", json!({ "chapter": { "id": "missing" } })),
        ("chapters.delete", json!({ "id": "missing" })),
        ("chapters.reorder", json!({ "ids": ["c0"] })),
        (
            "revision.add",
            json!({ "chapterId": "p0", "startDate": "2025-11-01", "endDate": "2025-11-04" }),
        ),
        ("revision.update", json!({})),
        ("revision.delete", json!({ "id": "missing" })),
        ("tests.save", json!({ "test": { "name": "Smoke", "date": "2025-11-02", "type": "Part Test" } })),
        ("tests.delete", json!({ "id": "missing" })),
        ("tests.query", json!({ "query": { "sortKey": "score" } })),
        ("logs.save", json!({ "log": { "date": "2025-11-02", "physicsQ": 1, "chemistryQ": 2, "mathQ": 3, "studyTime": 40 } })),
        ("logs.delete", json!({ "id": "missing" })),
        ("planner.save", json!({ "task": { "date": "2025-11-03", "chapterId": "p0", "completed": false } })),
        ("planner.toggle", json!({ "id": "missing" })),
        ("planner.delete", json!({ "id": "missing" })),
        ("planner.week", json!({ "anchor": "2025-11-05" })),
        ("analytics.dashboard", json!({})),
        ("analytics.trend", json!({})),
        ("tools.execute", json!({ "calls": [] })),
        ("assistant.history", json!({})),
        ("assistant.begin", json!({ "message": "hello" })),
        ("assistant.complete", json!({ "turnId": "turn-1", "reply": { "text": "hi" } })),
        ("assistant.reset", json!({})),
        ("export.json", json!({})),
        ("export.logsCsv", json!({ "outPath": csv_out.to_string_lossy() })),
        ("import.logsCsv", json!({ "inPath": csv_out.to_string_lossy() })),
        ("import.json", json!({ "inPath": workspace.join("exports/jee_backup.json").to_string_lossy() })),
        ("backup.export", json!({ "outPath": bundle_out.to_string_lossy() })),
        ("backup.import", json!({ "inPath": bundle_out.to_string_lossy() })),
    ];

    for (i, (method, params)) in calls.into_iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &format!("{}", i + 1), method, params);
        let code = resp
            .pointer("/error/code")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        assert_ne!(code, "not_implemented", "unexpected unknown method {}", method);
        assert_ne!(code, "no_workspace", "{} lost the workspace", method);
    }

    let garbage = {
        use std::io::{BufRead, Write};
        writeln!(stdin, "{{ not json").expect("write garbage");
        stdin.flush().expect("flush");
        let mut line = String::new();
        reader.read_line(&mut line).expect("read");
        serde_json::from_str::<serde_json::Value>(line.trim()).expect("json response")
    };
    assert_eq!(
        garbage.pointer("/error/code").and_then(|v| v.as_str()),
        Some("bad_json")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
