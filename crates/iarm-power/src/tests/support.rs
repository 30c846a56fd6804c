//! Shared helpers for driving the power tools in-process.

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use iarm_config::{Config, ConfigLoader};
use ortho_config::OrthoError;

use super::MockController;
use crate::query_state::run_query_power_state_with;
use crate::set_state::run_set_power_state_with;

/// Loader that ignores its arguments and returns a fixed configuration.
#[derive(Default)]
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Captured result of one in-process run.
pub(super) struct CapturedRun {
    pub(super) exit_code: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

fn argv(program: &'static str, args: &[&str]) -> Vec<OsString> {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn captured(run: impl FnOnce(&mut Vec<u8>, &mut Vec<u8>) -> ExitCode) -> CapturedRun {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = run(&mut stdout, &mut stderr);
    CapturedRun {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

pub(super) fn set_captured(
    args: &[&str],
    loader: &StaticConfigLoader,
    make: impl FnOnce() -> MockController,
) -> CapturedRun {
    let argv = argv("SetPowerState", args);
    captured(|stdout, stderr| {
        run_set_power_state_with(argv, stdout, stderr, loader, |_: &Config| make())
    })
}

pub(super) fn query_captured(
    args: &[&str],
    loader: &StaticConfigLoader,
    make: impl FnOnce() -> MockController,
) -> CapturedRun {
    let argv = argv("QueryPowerState", args);
    captured(|stdout, stderr| {
        run_query_power_state_with(argv, stdout, stderr, loader, |_: &Config| make())
    })
}

/// Runs `QueryPowerState` in settings mode, where no controller is built.
pub(super) fn query_settings_captured(args: &[&str]) -> CapturedRun {
    query_captured(args, &StaticConfigLoader::default(), || {
        panic!("settings queries never build a controller")
    })
}
