//! IR key injection through a Linux uinput virtual keyboard.
//!
//! `keySimulator <KEY>` resolves an IR key name or code, maps it to a Linux
//! key code (plus modifier where the IR key needs one) and writes the key
//! events to `/dev/uinput`.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use iarm_bus::telemetry;
use iarm_config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};

mod errors;
mod keymap;
mod sequence;
mod sink;
mod uinput;

use errors::AppError;
pub use errors::KeyError;
pub use keymap::{KEY_MAP, KeyMapping, linux, lookup_ir, resolve_key};
pub use sequence::{KeyAction, KeyPhase, KeyStroke, strokes};
pub use sink::{KeySink, inject};
pub use uinput::{DEFAULT_UINPUT_PATH, DEVICE_NAME, UinputKeyboard};

/// Binary name used in usage text.
pub const PROGRAM_NAME: &str = "keySimulator";

#[derive(Debug, Parser)]
#[command(
    name = PROGRAM_NAME,
    about = "Inject an IR remote key through uinput",
    after_help = "KEY is an IR key name such as OK, DIGIT5 or ARROWUP, or a numeric IR code."
)]
struct Cli {
    /// IR key name or code.
    key: String,
    /// Events to inject.
    #[arg(short = 't', long = "type", value_enum, default_value_t = KeyAction::Press)]
    action: KeyAction,
    #[arg(long, hide = true, default_value = DEFAULT_UINPUT_PATH)]
    device: PathBuf,
}

/// Runs the simulator against the uinput node.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, UinputKeyboard::create)
}

/// Runs the simulator with an injected loader and sink factory.
pub(crate) fn run_with<I, W, E, L, S, F>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    open_sink: F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    S: KeySink,
    F: FnOnce(&Path) -> Result<S, KeyError>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(split.tool_arguments(&args)) {
        Ok(cli) => cli,
        Err(error) if error.kind() == ErrorKind::DisplayHelp => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{error}");
            return ExitCode::FAILURE;
        }
    };

    let result = loader
        .load(&split.config_arguments)
        .map_err(AppError::LoadConfiguration)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            let mapping = resolve_key(&cli.key)?;
            let mut sink = open_sink(&cli.device)?;
            let sent = inject(&mut sink, mapping, cli.action)?;
            Ok((mapping, sent))
        });

    match result {
        Ok((mapping, sent)) => {
            for stroke in sent {
                let _ = writeln!(
                    stdout,
                    "{}: IR=0x{:x} key={} value={}",
                    mapping.name, mapping.ir_code, stroke.code, stroke.value
                );
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;
