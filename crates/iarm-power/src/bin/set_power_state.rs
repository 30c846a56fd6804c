//! Entry point for `SetPowerState`.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    iarm_power::run_set_power_state(std::env::args_os(), &mut stdout, &mut stderr)
}
