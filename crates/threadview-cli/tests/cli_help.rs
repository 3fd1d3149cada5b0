use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("threadview")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_replay_requires_script() {
    cargo_bin_cmd!("threadview")
        .arg("replay")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SCRIPT"));
}
