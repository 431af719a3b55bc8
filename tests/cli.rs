use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ORDER: &str = r#"{
    "Fields": [
        {"FieldID":"TSANet","Label":"Net","Type":"Number","CalculatedRuleEngine":{"JSFormula":"return a - b;","ParticipatingFields":["a","b"],"CalculatedOn":{"Name":"OnChange"}}},
        {"FieldID":"TSANoRule","Label":"Static"}
    ],
    "LineFields": [
        {"FieldID":"TSALineTotal","Label":"Line Total","CalculatedRuleEngine":{"JSFormula":"return q * p;","CalculatedOn":{"Name":"OnLoad"}}}
    ]
}"#;

/// Runs the binary inside `dir` with preferences isolated to that directory.
fn command(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formula-extractor").unwrap();
    cmd.current_dir(dir)
        .env("FORMULA_EXTRACTOR_PREFERENCES", dir.join("prefs.toml"))
        .arg("--output-format")
        .arg("plain")
        .arg("--open-folder")
        .arg("false");
    cmd
}

fn write_input(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn extracts_into_suggested_folder() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "SalesOrder.json", ORDER);

    command(temp_dir.path())
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files: 2"));

    let output = temp_dir.path().join("SalesOrder_extracted");
    let net = fs::read_to_string(output.join("Header Fields").join("Net.js")).unwrap();
    assert!(net.contains(" * FieldID: TSANet\n"));
    assert!(net.contains(" * Trigger: OnChange\n"));
    assert!(net.ends_with("return a - b;\n"));
    assert!(output.join("Line Fields").join("Line Total.js").exists());
    assert!(!output.join("Header Fields").join("Static.js").exists());
}

#[test]
fn comments_can_be_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);
    let output = temp_dir.path().join("out");

    command(temp_dir.path())
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--comments")
        .arg("false")
        .assert()
        .success();

    let net = fs::read_to_string(output.join("Header Fields").join("Net.js")).unwrap();
    assert_eq!(net, "return a - b;\n");
}

#[test]
fn missing_input_exits_with_code_3() {
    let temp_dir = TempDir::new().unwrap();

    command(temp_dir.path())
        .arg(temp_dir.path().join("nope.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn malformed_json_exits_with_code_4_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "broken.json", "{ \"Fields\": [ ");

    command(temp_dir.path()).arg(&input).assert().code(4);

    assert!(!temp_dir.path().join("broken_extracted").exists());
}

#[test]
fn invalid_label_exits_with_code_2() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(
        temp_dir.path(),
        "order.json",
        r#"{"Fields":[
            {"FieldID":"A","Label":"../escape","CalculatedRuleEngine":{"JSFormula":"bad","CalculatedOn":{"Name":"Load"}}},
            {"FieldID":"B","Label":"Good","CalculatedRuleEngine":{"JSFormula":"ok","CalculatedOn":{"Name":"Load"}}}
        ]}"#,
    );

    command(temp_dir.path())
        .arg(&input)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Errors: 1"));

    let output = temp_dir.path().join("order_extracted");
    assert!(output.join("Header Fields").join("Good.js").exists());
    assert!(!temp_dir.path().join("escape.js").exists());
}

#[test]
fn dry_run_lists_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);

    command(temp_dir.path())
        .arg(&input)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Header Fields/Net.js"))
        .stdout(predicate::str::contains("Line Fields/Line Total.js"));

    assert!(!temp_dir.path().join("order_extracted").exists());
    assert!(!temp_dir.path().join("prefs.toml").exists());
}

#[test]
fn no_input_and_nothing_remembered_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();

    command(temp_dir.path()).assert().code(5);
}

#[test]
fn remembers_last_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);
    let output = temp_dir.path().join("formulas");

    command(temp_dir.path())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--comments")
        .arg("false")
        .assert()
        .success();

    let prefs = fs::read_to_string(temp_dir.path().join("prefs.toml")).unwrap();
    assert!(prefs.contains("order.json"));
    assert!(prefs.contains("add_comments = false"));

    fs::remove_dir_all(&output).unwrap();

    // Second run with no arguments reuses input, output and toggles.
    command(temp_dir.path()).assert().success();

    let net = fs::read_to_string(output.join("Header Fields").join("Net.js")).unwrap();
    assert_eq!(net, "return a - b;\n");
}

#[test]
fn config_file_toggles_survive_remembered_runs() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);
    let output = temp_dir.path().join("order_extracted");

    command(temp_dir.path()).arg(&input).assert().success();

    let prefs = fs::read_to_string(temp_dir.path().join("prefs.toml")).unwrap();
    assert!(!prefs.contains("add_comments"));

    fs::write(
        temp_dir.path().join("formula-extractor.toml"),
        "[output]\nadd_comments = false\n",
    )
    .unwrap();
    command(temp_dir.path()).arg(&input).assert().success();

    let net = fs::read_to_string(output.join("Header Fields").join("Net.js")).unwrap();
    assert_eq!(net, "return a - b;\n");
}

#[test]
fn no_remember_leaves_preferences_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);

    command(temp_dir.path())
        .arg(&input)
        .arg("--no-remember")
        .assert()
        .success();

    assert!(!temp_dir.path().join("prefs.toml").exists());
}

#[test]
fn report_flag_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "order.json", ORDER);

    command(temp_dir.path())
        .arg(&input)
        .arg("--report")
        .assert()
        .success();

    let report = fs::read_to_string(
        temp_dir
            .path()
            .join("order_extracted")
            .join("extraction_report.json"),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["files_written"], 2);
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");

    command(temp_dir.path())
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[output]"));
}
