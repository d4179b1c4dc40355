use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::process::{Command, Output};
use tempfile::{TempDir, tempdir};

fn run_redefine<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_redefine"))
        .args(args)
        .output()
        .expect("redefine command should execute")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "status {:?}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

const SAMPLE_TOML: &str = r#"
exports = ["my_two"]

[[define]]
dependencies = []
factory = { kind = "static", value = { name = "one" } }

[[define]]
dependencies = ["one/one", "label"]
factory = { kind = "collect" }

[[redefine]]
name = "my_one"

[[redefine]]
name = "my_two"

[[redefine.let]]
dependency = "one/one"
be = "my_one"

[[redefine.let]]
dependency = "label"
be = "my_one"
from = "exports"
"#;

fn write_scenario(dir: &TempDir, file: &str, body: &str) -> String {
    let path = dir.path().join(file);
    fs::write(&path, body).expect("scenario should be written");
    path.display().to_string()
}

#[test]
fn run_json_prints_resolved_exports() {
    let tmp = tempdir().unwrap();
    let scenario = write_scenario(&tmp, "sample.toml", SAMPLE_TOML);

    let output = run_redefine(["run", scenario.as_str(), "--json"]);
    let payload = stdout_json(&output);
    assert_eq!(
        payload["exports"],
        json!({
            "my_two": {
                "one/one": {"name": "one"},
                "label": "my_one"
            }
        })
    );
}

#[test]
fn run_accepts_explicit_export_names() {
    let tmp = tempdir().unwrap();
    let scenario = write_scenario(&tmp, "sample.toml", SAMPLE_TOML);

    let output = run_redefine(["run", scenario.as_str(), "--export", "my_one", "--json"]);
    let payload = stdout_json(&output);
    assert_eq!(payload["exports"], json!({"my_one": {"name": "one"}}));
}

#[test]
fn debug_json_prints_the_snapshot() {
    let tmp = tempdir().unwrap();
    let scenario = write_scenario(&tmp, "sample.toml", SAMPLE_TOML);

    let output = run_redefine(["debug", scenario.as_str(), "--json"]);
    let payload = stdout_json(&output);
    assert_eq!(payload["count"], json!(2));
    assert_eq!(payload["map"]["my_two"]["links"], json!({"one/one": "my_one"}));
    assert_eq!(payload["map"]["my_two"]["overrides"], json!({"label": "my_one"}));
    assert_eq!(payload["exportsCache"], json!({}));
}

#[test]
fn unbalanced_scenario_exits_with_error() {
    let tmp = tempdir().unwrap();
    let scenario = write_scenario(
        &tmp,
        "unbalanced.json",
        r#"{
            "define": [
                {"dependencies": [], "factory": {"kind": "static", "value": 1}},
                {"dependencies": [], "factory": {"kind": "static", "value": 2}}
            ],
            "redefine": [{"name": "only"}],
            "exports": ["only"]
        }"#,
    );

    let output = run_redefine(["run", scenario.as_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("redefine() calls do not match define() calls"));
}

#[test]
fn missing_scenario_file_exits_with_error() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("nope.json");

    let output = run_redefine([OsStr::new("debug"), missing.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"));
}
