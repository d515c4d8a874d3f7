use assert_cmd::Command;
use predicates::prelude::*;

fn rsplit() -> Command {
    Command::cargo_bin("rsplit").unwrap()
}

#[test]
fn test_help_lists_commands() {
    rsplit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    rsplit()
        .args(["-c", path, "config", "set", "extraction.local_company", "ACME公司"])
        .assert()
        .success();

    rsplit()
        .args(["-c", path, "config", "get", "extraction.local_company"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ACME公司\""));

    rsplit()
        .args(["-c", path, "config", "get", "extraction.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    rsplit().args(["-c", path, "config", "init"]).assert().success();
    rsplit()
        .args(["-c", path, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    rsplit()
        .args(["-c", path, "config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_analyze_missing_file() {
    rsplit()
        .args(["analyze", "/nonexistent/sheet.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_split_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sheet.pdf");
    std::fs::write(&input, b"not a pdf").unwrap();

    rsplit()
        .args(["split", input.to_str().unwrap(), "-o"])
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));
    assert!(!dir.path().join("out").exists());
}
