//! End-to-end tests driving the `cmdt` demonstration binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmdt() -> Command {
    Command::cargo_bin("cmdt").unwrap()
}

// ============================================
// Successful dispatches
// ============================================

mod dispatch_ok {
    use super::*;

    #[test]
    fn installs_a_package() {
        cmdt()
            .args(["pkg", "install", "serde"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"action\": \"install\""))
            .stdout(predicate::str::contains("\"name\": \"serde\""));
    }

    #[test]
    fn slash_joined_path_is_equivalent() {
        cmdt()
            .args(["pkg/install/serde"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"action\": \"install\""));
    }

    #[test]
    fn force_switch_selects_the_guarded_registration() {
        for flag in ["--force", "-f"] {
            cmdt()
                .args(["pkg", "install", "serde", flag])
                .assert()
                .success()
                .stdout(predicate::str::contains("\"action\": \"install-forced\""));
        }
    }

    #[test]
    fn registry_default_is_bound_when_absent() {
        cmdt()
            .args(["pkg", "install", "serde"])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://crates.io"));
    }

    #[test]
    fn common_verbose_switch_binds_below_pkg() {
        cmdt()
            .args(["pkg", "install", "serde", "-v"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"verbose\": true"));
    }

    #[test]
    fn remove_works_through_its_alias() {
        cmdt()
            .args(["pkg", "rm", "serde"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"action\": \"remove\""));
    }

    #[test]
    fn rest_segment_captures_remaining_tokens() {
        cmdt()
            .args(["run", "build", "--", "x"])
            .assert()
            .failure(); // `--` lexes as a switch token with an empty name

        cmdt()
            .args(["run", "build", "test", "deploy"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"args\""))
            .stdout(predicate::str::contains("deploy"));
    }

    #[test]
    fn remote_add_with_required_token() {
        cmdt()
            .args(["remote", "add", "origin", "--token=abc", "--url", "git.example.com"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"action\": \"remote-add\""))
            .stdout(predicate::str::contains("git.example.com"));
    }
}

// ============================================
// Dispatch failures
// ============================================

mod dispatch_failures {
    use super::*;

    #[test]
    fn unknown_command_fails_with_not_found() {
        cmdt()
            .args(["no", "such", "command"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no command matches"));
    }

    #[test]
    fn missing_required_switch_is_named() {
        cmdt()
            .args(["remote", "add", "origin"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("required switch 'token'"));
    }

    #[test]
    fn unknown_switch_fails_with_suggestion() {
        cmdt()
            .args(["pkg", "install", "serde", "--verbos"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown switch 'verbos'"))
            .stderr(predicate::str::contains("Did you mean: verbose?"));
    }

    #[test]
    fn dispatch_failure_exits_nonzero_without_panicking() {
        cmdt()
            .args(["pkg", "install"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cmdt:"));
    }
}

// ============================================
// Tree inspection surface
// ============================================

mod tree_summary {
    use super::*;

    #[test]
    fn tree_prints_the_resolved_routes() {
        cmdt()
            .arg("tree")
            .assert()
            .success()
            .stdout(predicate::str::contains("pkg/install/:name"))
            .stdout(predicate::str::contains("run/...args"));
    }

    #[test]
    fn tree_lists_aliases_and_switches() {
        cmdt()
            .arg("tree")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"rm\""))
            .stdout(predicate::str::contains("\"verbose\""));
    }
}
