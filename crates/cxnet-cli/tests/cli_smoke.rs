use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("cxnet-cli"))
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn validate_prints_a_clean_report() {
    let output = cli()
        .args(["validate", fixture("styled.cx2").to_string_lossy().as_ref()])
        .assert()
        .success()
        .get_output()
        .clone();
    let report = stdout_json(&output);
    assert_eq!(report["isValid"], Value::Bool(true));
    assert_eq!(report["errors"], serde_json::json!([]));
}

#[test]
fn validate_exits_with_3_on_errors() {
    let output = cli()
        .args(["validate", fixture("dangling_edge.cx2").to_string_lossy().as_ref()])
        .assert()
        .code(3)
        .get_output()
        .clone();
    let report = stdout_json(&output);
    assert_eq!(report["errors"][0]["kind"], "reference");
    assert_eq!(report["errors"][0]["path"], serde_json::json!(["edges", "index 1", "t"]));
}

#[test]
fn require_metadata_flag_turns_a_missing_aspect_into_an_error() {
    let minimal = r#"[{"CXVersion": "2.0"}, {"nodes": [{"id": 1}]}, {"status": [{"success": true}]}]"#;
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("no_meta.cx2");
    fs::write(&input, minimal).expect("write input");

    cli().args(["validate", input.to_string_lossy().as_ref()]).assert().success();
    cli()
        .args(["validate", "--require-metadata", input.to_string_lossy().as_ref()])
        .assert()
        .code(3);
}

#[test]
fn import_refuses_dangling_edges() {
    cli()
        .args(["import", fixture("dangling_edge.cx2").to_string_lossy().as_ref()])
        .assert()
        .code(1);
}

#[test]
fn view_reads_stdin() {
    let text = fs::read_to_string(fixture("minimal.cx2")).expect("read fixture");
    let output = cli()
        .args(["view", "-"])
        .write_stdin(text)
        .assert()
        .success()
        .get_output()
        .clone();
    let view = stdout_json(&output);
    assert_eq!(view["nodeViews"]["2"]["x"], serde_json::json!(100.0));
    assert!(view["edgeViews"]["e10"].is_object());
}

#[test]
fn export_writes_a_document_that_validates_strictly() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.cx2");

    cli()
        .args([
            "export",
            "--pretty",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("styled.cx2").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    assert!(out.exists(), "export did not write {}", out.display());

    let strict = r#"{"validation": {"requireMetaData": true, "requireStatus": true}}"#;
    cli()
        .args(["validate", "--config", strict, out.to_string_lossy().as_ref()])
        .assert()
        .success();
}

#[test]
fn usage_errors_exit_with_2() {
    cli().arg("--bogus").assert().code(2);
    cli().args(["validate", "a.cx2", "b.cx2"]).assert().code(2);
}

#[test]
fn missing_input_file_exits_with_1() {
    let tmp = tempfile::tempdir().expect("tempdir");
    cli()
        .args(["validate", tmp.path().join("absent.cx2").to_string_lossy().as_ref()])
        .assert()
        .code(1);
}
