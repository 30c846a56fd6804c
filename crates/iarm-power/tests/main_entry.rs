//! Integration tests for the `SetPowerState` and `QueryPowerState` binaries.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn set_power_state_requires_a_state() {
    let mut command = cargo_bin_cmd!("SetPowerState");
    command.args(["--client", "C1"]);
    command
        .assert()
        .code(1)
        .stderr(contains("Error: POWER_STATE is mandatory."))
        .stdout(contains("Usage: SetPowerState"));
}

#[test]
fn set_power_state_rejects_malformed_delays() {
    let mut command = cargo_bin_cmd!("SetPowerState");
    command.args(["--delay", "1,soon", "ON"]);
    command
        .assert()
        .code(1)
        .stderr(contains("invalid delay 'soon'"));
}

#[test]
#[expect(clippy::host_endian_bytes, reason = "mirrors the native cache layout")]
fn query_reads_the_settings_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("uimgr_settings.bin");
    let header: Vec<u8> = [0_u32, 1, 28, 2, 0, 0, 0]
        .into_iter()
        .flat_map(u32::to_ne_bytes)
        .collect();
    fs::write(&path, header)?;

    let mut command = cargo_bin_cmd!("QueryPowerState");
    command.arg("--settings-file").arg(&path);
    command.assert().success().stdout("ON\n");
    Ok(())
}

#[test]
fn controller_query_without_a_bus_reports_unavailable() -> anyhow::Result<()> {
    let socket_dir = tempfile::tempdir()?;
    let socket = socket_dir.path().join("absent.sock");
    let mut command = cargo_bin_cmd!("QueryPowerState");
    command.env("IARM_BUS_SOCKET", format!("unix://{}", socket.display()));
    command.arg("-c");
    command
        .assert()
        .success()
        .stdout("Error :: PowerManager plugin unavailable\n");
    Ok(())
}
