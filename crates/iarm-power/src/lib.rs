//! Power-manager client tools.
//!
//! `SetPowerState` requests transitions and can take part in the pre-change
//! handshake as a named client; `QueryPowerState` reports the current state
//! from the power manager or from its cached settings file.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use iarm_bus::{SocketTransport, telemetry};
use iarm_config::{Config, ConfigLoader, OrthoConfigLoader};

mod ack;
mod bus_controller;
mod controller;
mod errors;
mod query_state;
mod set_state;
mod settings;
mod state;

pub use ack::{ACK_LEAD, AckSlot, DelayedAck};
pub use bus_controller::{BusPowerController, PRE_CHANGE_EVENT_ID};
pub use controller::{PowerController, PowerStateReport, PreChangeEvent};
use errors::AppError;
pub use errors::{ControllerError, SettingsError};
pub use query_state::{query_controller, query_settings};
pub use set_state::{
    AckMode, DelayList, MAX_DELAYS, SET_POWER_STATE_REASON, SetPowerStateOptions,
    set_power_state,
};
pub use settings::{DEFAULT_SETTINGS_PATH, PowerSettings, SETTINGS_HEADER_LEN, read_settings};
pub use state::{PowerRequest, PowerState};

/// Bus member name registered by `SetPowerState`.
pub const SET_POWER_STATE_MEMBER: &str = "SetPowerState";
/// Bus member name registered by `QueryPowerState`.
pub const QUERY_POWER_STATE_MEMBER: &str = "QueryPowerState";

fn socket_controller(config: &Config, member: &str) -> BusPowerController<SocketTransport> {
    BusPowerController::new(SocketTransport::new(config.bus_socket().clone()), member)
}

/// Loads configuration and installs diagnostics.
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

/// Runs `SetPowerState` against the configured bus socket.
#[must_use]
pub fn run_set_power_state<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    set_state::run_set_power_state_with(args, stdout, stderr, &OrthoConfigLoader, |config| {
        socket_controller(config, SET_POWER_STATE_MEMBER)
    })
}

/// Runs `QueryPowerState` against the configured bus socket.
#[must_use]
pub fn run_query_power_state<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    query_state::run_query_power_state_with(args, stdout, stderr, &OrthoConfigLoader, |config| {
        socket_controller(config, QUERY_POWER_STATE_MEMBER)
    })
}
