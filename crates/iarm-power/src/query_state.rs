//! `QueryPowerState`: report the current power state from the power
//! manager or from its cached settings file.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use iarm_config::{Config, ConfigLoader, split_config_arguments};
use tracing::debug;

use crate::bus_controller::CONTROLLER_TARGET;
use crate::controller::PowerController;
use crate::errors::ControllerError;
use crate::settings::{DEFAULT_SETTINGS_PATH, read_settings};
use crate::state::PowerState;

const UNKNOWN_SETTINGS_STATE: &str = "Unknown Power state";
const SETTINGS_READ_FAILED: &str = "Error in reading PWRMgr settings File";

#[derive(Debug, Parser)]
#[command(
    name = "QueryPowerState",
    about = "Print the current power state",
    after_help = "Without -c the state is read from the PowerManager settings file."
)]
struct QueryPowerStateCli {
    /// Ask the PowerManager instead of reading the settings file.
    #[arg(short = 'c', long = "controller")]
    controller: bool,
    #[arg(long, hide = true, default_value = DEFAULT_SETTINGS_PATH)]
    settings_file: PathBuf,
}

/// Asks the power manager for its current state and returns the line to
/// print.
pub fn query_controller<C: PowerController + ?Sized>(controller: &mut C) -> String {
    let report = controller
        .init()
        .and_then(|()| controller.connect())
        .and_then(|()| controller.power_state());
    controller.terminate();

    match report {
        Ok(report) => report.current.to_string(),
        Err(error) => {
            debug!(target: CONTROLLER_TARGET, %error, "power state query failed");
            describe_failure(&error).to_owned()
        }
    }
}

const fn describe_failure(error: &ControllerError) -> &'static str {
    if error.is_unavailable() {
        "Error :: PowerManager plugin unavailable"
    } else {
        "Error :: Unknown"
    }
}

/// Reads the power state cached in the settings file at `path` and returns
/// the line to print.
#[must_use]
pub fn query_settings(path: &Path) -> &'static str {
    match read_settings(path) {
        Ok(settings) => settings
            .power_state()
            .and_then(PowerState::name)
            .unwrap_or(UNKNOWN_SETTINGS_STATE),
        Err(error) => {
            debug!(target: CONTROLLER_TARGET, %error, "settings read failed");
            SETTINGS_READ_FAILED
        }
    }
}

/// Runs `QueryPowerState` with an injected loader and controller factory.
pub(crate) fn run_query_power_state_with<I, W, E, L, C, F>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    make_controller: F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    C: PowerController,
    F: FnOnce(&Config) -> C,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match QueryPowerStateCli::try_parse_from(split.tool_arguments(&args)) {
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

    let config = match crate::load_runtime(loader, &split.config_arguments) {
        Ok(config) => config,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            return ExitCode::FAILURE;
        }
    };

    let line = if cli.controller {
        query_controller(&mut make_controller(&config))
    } else {
        query_settings(&cli.settings_file).to_owned()
    };
    let _ = writeln!(stdout, "{line}");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use iarm_bus::testing::RecordingTransport;
    use iarm_bus::IarmResult;
    use rstest::rstest;

    use super::*;
    use crate::bus_controller::BusPowerController;

    #[rstest]
    #[case(ControllerError::PluginUnavailable, "Error :: PowerManager plugin unavailable")]
    #[case(
        ControllerError::Rejected(IarmResult::InvalidParam),
        "Error :: Unknown"
    )]
    fn describes_query_failures(#[case] error: ControllerError, #[case] expected: &str) {
        assert_eq!(describe_failure(&error), expected);
    }

    #[test]
    fn reports_unavailable_when_the_bus_is_down() {
        let transport = RecordingTransport::default();
        transport.fail_connect(IarmResult::InvalidState);
        let mut controller = BusPowerController::new(transport, "QueryPowerState");

        assert_eq!(
            query_controller(&mut controller),
            "Error :: PowerManager plugin unavailable"
        );
    }

    #[test]
    fn missing_settings_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(
            query_settings(&dir.path().join("absent.bin")),
            SETTINGS_READ_FAILED
        );
    }
}
