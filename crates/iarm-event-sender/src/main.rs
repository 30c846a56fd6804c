//! Entry point for `IARM_event_sender`.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    iarm_event_sender::run(std::env::args_os(), &mut stdout, &mut stderr)
}
