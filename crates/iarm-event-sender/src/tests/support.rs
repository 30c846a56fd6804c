//! Shared helpers for driving the sender in-process.

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use iarm_bus::testing::RecordingTransport;
use iarm_config::{Config, ConfigLoader};
use ortho_config::OrthoError;

use crate::{IoStreams, PROGRAM_NAME, run_with};

/// Loader that ignores its arguments and returns a fixed configuration.
#[derive(Default)]
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
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

pub(super) fn run_captured(
    args: &[&str],
    loader: &StaticConfigLoader,
    transport: &RecordingTransport,
) -> CapturedRun {
    let argv = std::iter::once(PROGRAM_NAME)
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with(argv, &mut io, loader, |_: &Config| transport.clone())
    };
    CapturedRun {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}
