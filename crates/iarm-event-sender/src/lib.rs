//! Command-line sender for bus events.
//!
//! The first positional argument names an event; the remaining arguments are
//! parsed against that event's schema and turned into exactly one bus
//! emission. Configuration flags may precede the event name.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use iarm_bus::{BusError, BusTransport, SocketTransport, telemetry};
use iarm_config::{Config, ConfigLoader, OrthoConfigLoader, split_config_arguments};

pub mod dispatch;
mod errors;
pub mod events;

pub use dispatch::{Delivery, DispatchOutcome, dispatch, write_usage};
use errors::AppError;
pub use errors::DispatchError;

/// Binary name used in usage text.
pub const PROGRAM_NAME: &str = "IARM_event_sender";

#[derive(Debug, Parser)]
#[command(
    name = PROGRAM_NAME,
    version,
    about = "Broadcast a single event on the IARM bus",
    after_help = "Run without arguments to list every event."
)]
struct Cli {
    /// Event name, e.g. `IARM_HdmiAllmEvent` or `ImageDwldEvent`, followed by
    /// its arguments. Everything after the event name is passed through
    /// untouched, including `-h` and `--help`.
    #[arg(
        value_name = "EVENT [ARGUMENTS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    words: Vec<String>,
}

pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the sender against the configured bus socket.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with(args, &mut io, &OrthoConfigLoader, |config: &Config| {
        SocketTransport::new(config.bus_socket().clone())
    })
}

/// Runs the sender with an injected configuration loader and transport.
pub(crate) fn run_with<I, W, E, L, T, C>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
    connect: C,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    T: BusTransport,
    C: FnOnce(&Config) -> T,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(split.tool_arguments(&args)) {
        Ok(cli) => cli,
        Err(error) => return report_cli_error(error, io),
    };

    let result = loader
        .load(&split.config_arguments)
        .map_err(AppError::LoadConfiguration)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            let (event, arguments) = cli
                .words
                .split_first()
                .ok_or(DispatchError::MissingEvent)?;
            let mut transport = connect(&config);
            let outcome = dispatch(event, arguments, &mut transport)?;
            Ok(exit_code_for(&outcome, config.strict_exit()))
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::Dispatch(error)) => {
            let _ = writeln!(io.stderr, "{error}");
            let _ = write_usage(io.stderr, PROGRAM_NAME);
            ExitCode::FAILURE
        }
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn report_cli_error<W: Write, E: Write>(
    error: clap::Error,
    io: &mut IoStreams<'_, W, E>,
) -> ExitCode {
    match error.kind() {
        ErrorKind::DisplayHelp => {
            let _ = writeln!(io.stdout, "{error}");
            let _ = write_usage(io.stdout, PROGRAM_NAME);
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayVersion => {
            let _ = write!(io.stdout, "{error}");
            ExitCode::SUCCESS
        }
        _ => {
            let _ = writeln!(io.stderr, "{}", AppError::CliUsage(error));
            ExitCode::FAILURE
        }
    }
}

/// Maps a delivery outcome to the process exit code.
///
/// Delivery failures exit 0 unless `strict_exit` is set, in which case the
/// bus result code becomes the exit status.
fn exit_code_for(outcome: &DispatchOutcome, strict_exit: bool) -> ExitCode {
    match &outcome.delivery {
        Delivery::Delivered => ExitCode::SUCCESS,
        Delivery::Failed(_) if !strict_exit => ExitCode::SUCCESS,
        Delivery::Failed(error) => strict_status(error),
    }
}

fn strict_status(error: &BusError) -> ExitCode {
    u8::try_from(error.result().code())
        .ok()
        .filter(|code| *code != 0)
        .map_or(ExitCode::FAILURE, ExitCode::from)
}
