//! End-to-end tests of the `gitstat` binary

mod common;

use assert_cmd::Command;
use common::{commit_file, write_file, Fleet};
use predicates::prelude::*;

/// `gitstat` isolated from the user's environment and scanning only the fleet
fn gitstat(fleet: &Fleet) -> Command {
    let mut cmd = Command::cargo_bin("gitstat").unwrap();
    cmd.env("HOME", fleet.temp_dir.path())
        .env("XDG_CONFIG_HOME", fleet.temp_dir.path())
        .env_remove("GITSTAT_ROOTS")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--no-color")
        .arg("--config")
        .arg(fleet.config_file())
        .arg("--root")
        .arg(fleet.root());
    cmd
}

fn sample_fleet() -> Fleet {
    let fleet = Fleet::new();
    let alpha = fleet.tracked_repo("alpha");
    write_file(&alpha, "README.md", "# alpha, edited\n");
    let beta = fleet.tracked_repo("beta");
    commit_file(&beta, "CHANGELOG.md", "v2\n", "local only");
    fleet.tracked_repo("gamma");
    fleet
}

#[test]
fn test_version() {
    Command::cargo_bin("gitstat")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gitstat 0.1.0"));
}

#[test]
fn test_list_shows_numbered_flag_rows() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1)*   alpha\n"))
        .stdout(predicate::str::contains("2)  ^ beta\n"))
        .stdout(predicate::str::contains("3)    gamma\n"));
}

#[test]
fn test_list_json_is_parseable() {
    let fleet = sample_fleet();
    let output = gitstat(&fleet)
        .args(["--list", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], "alpha");
    assert_eq!(rows[0]["dirty"], true);
    assert_eq!(rows[1]["ahead"], true);
    assert_eq!(rows[2]["index"], 3);
}

#[test]
fn test_no_selector_without_terminal_selects_nothing() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .arg("-s")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing selected"));
}

#[test]
fn test_force_requires_selector() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .args(["-s", "--force"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force requires a repository selector"));
}

#[test]
fn test_stage_by_name() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .args(["-u", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed alpha (1 added, 0 removed)"));
}

#[test]
fn test_selection_without_actions_shows_details() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .arg("alpha")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("README.md"))
        .stdout(predicate::str::contains("beta").not());
}

#[test]
fn test_failed_push_exits_with_action_failure() {
    let fleet = Fleet::new();
    let repo = fleet.tracked_repo("orphan");
    commit_file(&repo, "a.txt", "a\n", "unpushed");
    std::fs::remove_dir_all(fleet.remotes().join("orphan.git")).unwrap();

    gitstat(&fleet)
        .args(["-p", "orphan"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("push failed for orphan"));
}

#[test]
fn test_quiet_hides_successful_stage() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .args(["-q", "-u", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed").not());

    // the index was still updated
    gitstat(&fleet)
        .args(["--list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"staged\": true"));
}

#[test]
fn test_quiet_still_reports_failures() {
    let fleet = Fleet::new();
    let repo = fleet.tracked_repo("orphan");
    commit_file(&repo, "a.txt", "a\n", "unpushed");
    std::fs::remove_dir_all(fleet.remotes().join("orphan.git")).unwrap();

    gitstat(&fleet)
        .args(["-q", "-p", "orphan"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("orphan").not())
        .stderr(predicate::str::contains("push failed for orphan"));
}

#[test]
fn test_invalid_jobs_rejected() {
    let fleet = sample_fleet();
    gitstat(&fleet)
        .args(["--list", "-j", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--jobs"));
}
