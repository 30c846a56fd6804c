//! Shared helpers for driving `mfr_util` in-process.

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use iarm_bus::testing::RecordingTransport;
use iarm_config::{Config, ConfigLoader};
use ortho_config::OrthoError;

use crate::{PROGRAM_NAME, run_with};

#[derive(Default)]
struct StaticConfigLoader {
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
}

pub(super) fn run_captured(args: &[&str], transport: &RecordingTransport) -> CapturedRun {
    let argv = std::iter::once(PROGRAM_NAME)
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = run_with(
        argv,
        &mut stdout,
        &mut stderr,
        &StaticConfigLoader::default(),
        |_: &Config| transport.clone(),
    );
    CapturedRun {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
    }
}
