//! Manufacturing serialized-data query.
//!
//! `mfr_util` takes exactly one field flag, asks the manufacturing library
//! for that field over the bus and prints the value.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, error::ErrorKind};
use iarm_bus::{BusTransport, SocketTransport, telemetry};
use iarm_config::{Config, ConfigLoader, OrthoConfigLoader, split_config_arguments};

mod errors;
mod field;
mod query;

use errors::AppError;
pub use errors::MfrError;
pub use field::{MfrField, SerializedType};
pub use query::{
    GET_SERIALIZED_DATA, MFR_MEMBER, SERIALIZED_BUFFER_LEN, SerializedData, fetch_serialized,
};

/// Binary name used in usage text.
pub const PROGRAM_NAME: &str = "mfr_util";

#[derive(Debug, Parser)]
#[command(name = PROGRAM_NAME, about = "Print one manufacturing field")]
struct Cli {
    #[command(flatten)]
    field: FieldFlags,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "one flag per field, enforced exclusive by the group"
)]
struct FieldFlags {
    /// Get current running image name.
    #[arg(long = "CurrentImageFilename")]
    current_image_filename: bool,
    /// Get current flashed image name.
    #[arg(long = "FlashedFilename")]
    flashed_filename: bool,
    /// Get model name.
    #[arg(long = "Modelname")]
    model_name: bool,
    /// Get hardware id.
    #[arg(long = "HardwareId")]
    hardware_id: bool,
    /// Get manufacturer name.
    #[arg(long = "Manufacturer")]
    manufacturer: bool,
    /// Get manufacturing serial number.
    #[arg(long = "MfgSerialnumber")]
    mfg_serial_number: bool,
    /// Get current PDRI version.
    #[arg(long = "PDRIVersion")]
    pdri_version: bool,
}

impl FieldFlags {
    fn selected(&self) -> Option<MfrField> {
        [
            (self.current_image_filename, MfrField::CurrentImageFilename),
            (self.flashed_filename, MfrField::FlashedFilename),
            (self.model_name, MfrField::ModelName),
            (self.hardware_id, MfrField::HardwareId),
            (self.manufacturer, MfrField::Manufacturer),
            (self.mfg_serial_number, MfrField::MfgSerialNumber),
            (self.pdri_version, MfrField::PdriVersion),
        ]
        .into_iter()
        .find_map(|(set, field)| set.then_some(field))
    }
}

/// Line printed for one query outcome.
#[must_use]
pub fn describe_outcome(kind: SerializedType, outcome: &Result<String, MfrError>) -> String {
    match outcome {
        Ok(value) => value.clone(),
        Err(error) => format!(
            "Call failed for {}: error code:{}",
            kind.label(),
            error.result().code()
        ),
    }
}

/// Runs `mfr_util` against the configured bus socket.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, |config: &Config| {
        SocketTransport::new(config.bus_socket().clone())
    })
}

fn write_help<W: Write>(out: &mut W) {
    let _ = writeln!(out, "{}", Cli::command().render_help());
}

fn load_runtime<L: ConfigLoader>(
    loader: &L,
    config_arguments: &[OsString],
) -> Result<Config, AppError> {
    let config = loader
        .load(config_arguments)
        .map_err(AppError::LoadConfiguration)?;
    telemetry::initialise(&config)?;
    Ok(config)
}

/// Runs `mfr_util` with an injected configuration loader and transport.
pub(crate) fn run_with<I, W, E, L, T, C>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
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

    let field = match Cli::try_parse_from(split.tool_arguments(&args)) {
        Ok(cli) => cli.field.selected(),
        Err(error) if error.kind() == ErrorKind::DisplayHelp => {
            write_help(stdout);
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{error}");
            None
        }
    };
    let Some(field) = field else {
        write_help(stdout);
        return ExitCode::FAILURE;
    };

    let config = match load_runtime(loader, &split.config_arguments) {
        Ok(config) => config,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            return ExitCode::FAILURE;
        }
    };

    let kind = field.serialized_type();
    let mut transport = connect(&config);
    let outcome = fetch_serialized(&mut transport, kind);
    let _ = writeln!(stdout, "{}", describe_outcome(kind, &outcome));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests;
