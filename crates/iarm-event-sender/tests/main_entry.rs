//! Integration tests for the `IARM_event_sender` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn bare_invocation_prints_usage_and_fails() {
    let mut command = cargo_bin_cmd!("IARM_event_sender");
    command
        .assert()
        .code(1)
        .stderr(contains("Usage: IARM_event_sender"));
}

#[test]
fn unknown_event_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("IARM_event_sender");
    command.args(["NoSuchEvent", "1"]);
    command
        .assert()
        .code(1)
        .stderr(contains("unknown event 'NoSuchEvent'"));
}

#[test]
fn invalid_log_format_fails_configuration() {
    let mut command = cargo_bin_cmd!("IARM_event_sender");
    command.args(["--log-format", "pretty", "ImageDwldEvent", "1"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
}

#[test]
fn unreachable_bus_still_exits_zero() -> anyhow::Result<()> {
    let socket_dir = tempfile::tempdir()?;
    let socket = socket_dir.path().join("absent.sock");
    let mut command = cargo_bin_cmd!("IARM_event_sender");
    command.env("IARM_BUS_SOCKET", format!("unix://{}", socket.display()));
    command.args(["ImageDwldEvent", "1"]);
    command.assert().success();
    Ok(())
}

#[test]
fn help_flag_after_the_event_is_sent_as_data() -> anyhow::Result<()> {
    let socket_dir = tempfile::tempdir()?;
    let socket = socket_dir.path().join("absent.sock");
    let mut command = cargo_bin_cmd!("IARM_event_sender");
    command.args([
        String::from("--bus-socket"),
        format!("unix://{}", socket.display()),
        String::from("IntrusionEvent"),
        String::from("tag"),
        String::from("--help"),
    ]);
    command.assert().success().stdout(predicates::str::is_empty());
    Ok(())
}
