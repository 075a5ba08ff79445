#[path = "../src/backup.rs"]
mod backup;

mod test_support;

use serde_json::json;
use std::io::Write;
use test_support::{open_workspace, request_ok, spawn_sidecar, temp_dir};
use zip::write::FileOptions;
use zip::ZipWriter;

fn write_bundle(path: &std::path::Path, manifest: serde_json::Value, state: &str) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut zip = ZipWriter::new(file);
    let opts = FileOptions::default();
    zip.start_file("manifest.json", opts).expect("manifest");
    zip.write_all(manifest.to_string().as_bytes()).expect("write manifest");
    zip.start_file("state/app_state.json", opts).expect("state");
    zip.write_all(state.as_bytes()).expect("write state");
    zip.finish().expect("finish");
}

#[test]
fn bundle_round_trip_preserves_state_bytes() {
    let dir = temp_dir("jeetrack-bundle-roundtrip");
    let out = dir.join("nested/backup.zip");
    let state = r#"{"chapters":[],"theme":"light"}"#;

    let summary = backup::export_state_bundle(state, &out).expect("export");
    assert_eq!(summary.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(summary.entry_count, 2);
    assert_eq!(summary.state_sha256, backup::sha256_hex(state.as_bytes()));

    let imported = backup::import_state_bundle(&out).expect("import");
    assert_eq!(imported.bundle_format_detected, backup::BUNDLE_FORMAT_V1);
    assert_eq!(imported.state_json, state);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn tampered_state_entry_is_rejected() {
    let dir = temp_dir("jeetrack-bundle-tamper");
    let path = dir.join("tampered.zip");
    let original = r#"{"chapters":[]}"#;
    write_bundle(
        &path,
        json!({
            "format": backup::BUNDLE_FORMAT_V1,
            "entries": { "state/app_state.json": { "sha256": backup::sha256_hex(original.as_bytes()) } }
        }),
        r#"{"chapters":[{"id":"x"}]}"#,
    );

    let err = backup::import_state_bundle(&path).expect_err("checksum mismatch");
    assert!(format!("{err:#}").contains("checksum mismatch"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_bundle_format_is_rejected() {
    let dir = temp_dir("jeetrack-bundle-format");
    let path = dir.join("other.zip");
    write_bundle(&path, json!({ "format": "something-else" }), "{}");

    let err = backup::import_state_bundle(&path).expect_err("format");
    assert!(format!("{err:#}").contains("unsupported bundle format"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn bare_json_is_accepted_as_legacy_export() {
    let dir = temp_dir("jeetrack-bundle-json");
    let path = dir.join("export.json");
    std::fs::write(&path, r#"{"chapters":[]}"#).expect("write json");

    let imported = backup::import_state_bundle(&path).expect("import");
    assert_eq!(imported.bundle_format_detected, backup::LEGACY_JSON_FORMAT);
    assert_eq!(imported.state_json, r#"{"chapters":[]}"#);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn sidecar_restores_workspace_from_bundle() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "jeetrack-bundle-ipc");
    let bundle = workspace.join("snap.zip");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "tools.execute",
        json!({ "calls": [ { "name": "addChapter", "args": { "name": "Snapshot Chapter", "subject": "math" } } ] }),
    );
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["entryCount"], json!(2));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "tools.execute",
        json!({ "calls": [ { "name": "deleteItem", "args": { "type": "chapter", "identifier": "snapshot" } } ] }),
    );
    let restored = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(restored["bundleFormatDetected"], json!("jeetrack-workspace-v1"));

    let state = request_ok(&mut stdin, &mut reader, "5", "state.get", json!({}));
    let found = state
        .pointer("/state/chapters")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().any(|c| c["name"] == json!("Snapshot Chapter") && c["subject"] == json!("Mathematics")));
    assert_eq!(found, Some(true));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
