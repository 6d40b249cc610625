use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn write_doc(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn lines_replays_a_flat_record_stream() {
    let doc = write_doc(r#"[{"cooking": {"num_conc": 1200.0}}, {"diesel": {"num_conc": 300.0}}]"#);
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["lines"])
        .arg(doc.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mode_name = cooking"))
        .stdout(predicate::str::contains("mode_name = diesel"))
        .stdout(predicate::str::contains("-- end of group --"));
}

#[test]
fn lines_rejects_duplicate_record_keys() {
    let doc = write_doc(r#"[{"cooking": {}}, {"cooking": {}}]"#);
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["lines"])
        .arg(doc.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("record keys are not unique"));
}

#[test]
fn shape_reports_table_dimensions() {
    let doc = write_doc(r#"{"gas_init": [{"SO2": [0.1, 0.2]}, {"NO2": [0.3, 0.4]}]}"#);
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["shape"])
        .arg(doc.path())
        .args(["--scope", "gas_init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows: 2"))
        .stdout(predicate::str::contains("cols: 2"));
}

#[test]
fn vars_lists_declared_keys_with_ordinals() {
    let doc = write_doc(r#"{"temp": 290.0, "pressure": 100000.0}"#);
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["vars"])
        .arg(doc.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 pressure"))
        .stdout(predicate::str::contains("1 temp"));
}

#[test]
fn json_output_is_structured() {
    let doc = write_doc(r#"[{"only": {"gsd": 1.2}}]"#);
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["lines"])
        .arg(doc.path())
        .args(["--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""data": "only""#))
        .stdout(predicate::str::contains(r#""done": true"#));
}

#[test]
fn missing_file_fails_with_a_message() {
    Command::cargo_bin("specbridge")
        .unwrap()
        .args(["vars", "/no/such/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
