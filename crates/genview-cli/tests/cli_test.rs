//! Command-line behaviour.

use assert_cmd::Command;
use predicates::prelude::*;

fn genview() -> Command {
    Command::cargo_bin("genview").unwrap()
}

#[test]
fn test_preset_output_validates() {
    let output = genview()
        .args(["preset", "dicty", "--data-server", "http://data.example.org/"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dicty.json");
    std::fs::write(&path, &output.stdout).unwrap();

    genview()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 1 assemblies, 1 tracks"));

    genview()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("DDB0166986_features"))
        .stdout(predicate::str::contains(
            "http://data.example.org/canonical_core.fa.fai",
        ));
}

#[test]
fn test_invalid_configuration_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"assemblies": [], "tracks": [{"type": "FeatureTrack", "trackId": "t", "name": "t",
            "assemblyNames": ["hg19"], "adapter": {"type": "Gff3Adapter", "uri": "genes.gff3"}}]}"#,
    )
    .unwrap();

    genview()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("hg19"));
}

#[test]
fn test_unknown_preset_is_rejected() {
    genview().args(["preset", "mm10"]).assert().failure();
}
