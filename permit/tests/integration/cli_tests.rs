use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

use crate::common::{
    Sandbox, assert_contains, assert_path_absent, assert_path_exists, init_test_logging,
};

const BUILTIN_FILES: [&str; 5] = [
    "claude-approve",
    "claude-approve.swift",
    "claude-stop",
    "claude-stop.swift",
    "auto-approve.json",
];

fn sandbox_with_checkout() -> Sandbox {
    let sandbox = Sandbox::new();
    for name in BUILTIN_FILES {
        sandbox.write_source(name, &format!("# {name}\n"));
    }
    sandbox
}

/// `permit` pointed at the sandbox with no inherited PERMIT_* overrides.
fn permit(sandbox: &Sandbox) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_permit"));
    for var in [
        "PERMIT_CLAUDE_DIR",
        "PERMIT_SOURCE_DIR",
        "PERMIT_BASE_URL",
        "PERMIT_PROFILE",
        "PERMIT_LOG",
        "PERMIT_LOG_FORMAT",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--claude-dir").arg(sandbox.root());
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to run permit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_install_from_local_checkout() {
    init_test_logging();
    crate::test_log!("TEST START: test_cli_install_from_local_checkout");

    let sandbox = sandbox_with_checkout();
    let output = run(permit(&sandbox)
        .args(["install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert_contains(&out, "Placed hooks/claude-approve");
    assert_contains(&out, "updated");

    let settings = sandbox.read_settings();
    assert_eq!(
        settings["hooks"]["PreToolUse"][0]["hooks"][0]["command"],
        "~/.claude/hooks/claude-approve"
    );
    assert_eq!(settings["hooks"]["Stop"][0]["hooks"][0]["timeout"], 15);
    for name in BUILTIN_FILES {
        assert_path_exists(&sandbox.installed(&format!("hooks/{name}")));
    }
    assert_path_exists(&sandbox.manifest_path());

    crate::test_log!("TEST PASS: test_cli_install_from_local_checkout");
}

#[test]
fn test_cli_default_command_installs() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();
    // No native artifacts, so the run never needs a compiler on any host.
    let profile = sandbox.dir.path().join("stop-only.toml");
    fs::write(
        &profile,
        r#"files = [{ path = "hooks/claude-stop", executable = true }]

[[canonical.events]]
event = "Stop"
marker = "claude-stop"

[canonical.events.entry]
hooks = [{ command = "~/.claude/hooks/claude-stop", timeout = 15 }]
"#,
    )
    .unwrap();

    let output = run(permit(&sandbox)
        .env("PERMIT_SOURCE_DIR", sandbox.source_root())
        .env("PERMIT_PROFILE", &profile)
        .env("PERMIT_LOG", "off"));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_contains(&stdout(&output), "Installing from local source");
    let settings = sandbox.read_settings();
    assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 1);
    assert!(settings["hooks"].get("PreToolUse").is_none());
}

#[test]
fn test_cli_reinstall_reports_up_to_date() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();
    let install = |sandbox: &Sandbox| {
        run(permit(sandbox)
            .args(["install", "--no-build", "--source-dir"])
            .arg(sandbox.source_root()))
    };

    assert!(install(&sandbox).status.success());
    let before = sandbox.read_settings_raw();
    let second = install(&sandbox);

    assert!(second.status.success());
    assert_contains(&stdout(&second), "already up to date");
    assert_eq!(sandbox.read_settings_raw(), before);
}

#[test]
fn test_cli_invalid_settings_exits_nonzero() {
    init_test_logging();
    crate::test_log!("TEST START: test_cli_invalid_settings_exits_nonzero");

    let sandbox = sandbox_with_checkout();
    sandbox.write_settings("{ \"hooks\": [");

    let output = run(permit(&sandbox)
        .args(["install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_contains(&err, "error[PERMIT-E001]");
    assert_contains(&err, "Remediation steps:");
    assert_eq!(sandbox.read_settings_raw(), "{ \"hooks\": [");

    crate::test_log!("TEST PASS: test_cli_invalid_settings_exits_nonzero");
}

#[test]
fn test_cli_uninstall_flag_alias() {
    init_test_logging();
    crate::test_log!("TEST START: test_cli_uninstall_flag_alias");

    let sandbox = sandbox_with_checkout();
    let install = run(permit(&sandbox)
        .args(["install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));
    assert!(install.status.success(), "stderr: {}", stderr(&install));

    let output = run(permit(&sandbox).arg("--uninstall"));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_contains(&stdout(&output), "Removed hooks/claude-stop");
    for name in BUILTIN_FILES {
        assert_path_absent(&sandbox.installed(&format!("hooks/{name}")));
    }
    let settings = sandbox.read_settings();
    assert_eq!(settings["hooks"]["PreToolUse"], serde_json::json!([]));
    assert_eq!(settings["hooks"]["Stop"], serde_json::json!([]));

    crate::test_log!("TEST PASS: test_cli_uninstall_flag_alias");
}

#[test]
fn test_cli_uninstall_flag_rejects_subcommand() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();

    let output = run(permit(&sandbox)
        .args(["--uninstall", "install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));

    assert_eq!(output.status.code(), Some(2));
    assert_contains(&stderr(&output), "--uninstall cannot be combined");
    assert_path_absent(&sandbox.root().join("hooks"));
    assert_path_absent(&sandbox.settings_path());
}

#[test]
fn test_cli_uninstall_clean_system_succeeds() {
    init_test_logging();
    let sandbox = Sandbox::new();

    let output = run(permit(&sandbox).arg("uninstall"));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert_contains(&out, "Already absent: hooks/claude-approve");
    assert_contains(&out, "nothing to do");
    assert_path_absent(&sandbox.settings_path());
}

#[test]
fn test_cli_dry_run_writes_nothing() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();

    let output = run(permit(&sandbox)
        .args(["install", "--no-build", "--dry-run", "--source-dir"])
        .arg(sandbox.source_root()));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_contains(&stdout(&output), "Would place hooks/claude-stop");
    assert_path_absent(&sandbox.settings_path());
    assert_path_absent(&sandbox.root().join("hooks"));
}

#[test]
fn test_cli_status_json() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();
    let install = run(permit(&sandbox)
        .args(["install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));
    assert!(install.status.success());

    let output = run(permit(&sandbox).args(["status", "--json"]));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_str(&stdout(&output)).expect("status is JSON");
    let statuses: Vec<&str> = report["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["installed", "installed"]);
    assert_eq!(report["manifest_recorded"], true);
}

#[test]
fn test_cli_status_text_summary() {
    init_test_logging();
    let sandbox = sandbox_with_checkout();

    let before = run(permit(&sandbox).arg("status"));
    assert!(before.status.success(), "stderr: {}", stderr(&before));
    assert_contains(&stdout(&before), "Run `permit install`");

    let install = run(permit(&sandbox)
        .args(["install", "--no-build", "--source-dir"])
        .arg(sandbox.source_root()));
    assert!(install.status.success(), "stderr: {}", stderr(&install));

    let after = run(permit(&sandbox).arg("status"));
    assert!(after.status.success(), "stderr: {}", stderr(&after));
    let out = stdout(&after);
    assert_contains(&out, "[ok] PreToolUse: Installed");
    assert_contains(&out, "All hooks installed.");
}

#[test]
fn test_cli_bad_profile_exits_nonzero() {
    init_test_logging();
    let sandbox = Sandbox::new();
    let profile = sandbox.dir.path().join("profile.toml");
    fs::write(&profile, "files = []\n[canonical]\n").unwrap();

    let output = run(permit(&sandbox).arg("--profile").arg(&profile).arg("status"));

    assert_eq!(output.status.code(), Some(1));
    assert_contains(&stderr(&output), "error[PERMIT-E004]");
}
