//! `SetPowerState`: request a transition and take part in the pre-change
//! handshake as an optional named client.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, error::ErrorKind};
use iarm_config::{Config, ConfigLoader, split_config_arguments};
use tracing::{debug, info, warn};

use crate::ack::{ACK_LEAD, AckSlot, DelayedAck};
use crate::bus_controller::CONTROLLER_TARGET;
use crate::controller::{PowerController, PreChangeEvent};
use crate::errors::{AppError, ControllerError};
use crate::state::PowerRequest;

/// Reason recorded with every transition this tool requests.
pub const SET_POWER_STATE_REASON: &str = "sys_mon_tool[SetPowerState]";
/// Most delays accepted by `--delay`.
pub const MAX_DELAYS: usize = 10;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SETTLE_TIME: Duration = Duration::from_millis(100);
const TRANSACTION_WAIT_RETRIES: u32 = 5;

const STATE_HELP: &str = "\
States:
  ON          Set to active mode
  STANDBY     Set to standby mode
  LIGHTSLEEP  Set to light-sleep standby
  DEEPSLEEP   Set to deep-sleep standby
  OFF         Set to off
  NOP         No transition; attach alongside a parallel SetPowerState run";

/// Comma-separated delay list given to `--delay`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayList(Vec<i32>);

impl DelayList {
    /// Delays in seconds, in the order given.
    #[must_use]
    pub fn seconds(&self) -> &[i32] {
        &self.0
    }
}

fn parse_delays(raw: &str) -> Result<DelayList, String> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .take(MAX_DELAYS)
        .map(|token| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|error| format!("invalid delay '{token}': {error}"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(DelayList)
}

#[derive(Debug, Parser)]
#[command(
    name = "SetPowerState",
    about = "Request a power state change from the PowerManager",
    after_help = STATE_HELP
)]
struct SetPowerStateCli {
    /// Client name registered for pre-change notifications (e.g. C1).
    #[arg(short = 'c', long, value_name = "CLIENT_NAME")]
    client: Option<String>,
    /// Seconds before acknowledging a pre-change (-1: never, 0: at once).
    #[arg(
        short = 'a',
        long,
        value_name = "ACK_DELAY",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    ack: i32,
    /// Delays in seconds, one `DelayPowerModeChangeBy` call each.
    #[arg(short = 'd', long, value_name = "D1,D2,D3", value_parser = parse_delays)]
    delay: Option<DelayList>,
    /// Keep servicing notifications for this many seconds before exiting.
    #[arg(short = 'w', long = "await", value_name = "SECONDS", default_value_t = 0)]
    await_secs: u64,
    /// Target state.
    state: Option<String>,
}

/// How pre-change notifications are acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Never acknowledge.
    Never,
    /// Acknowledge as soon as the notification arrives.
    Immediate,
    /// Acknowledge after the delay, less [`ACK_LEAD`].
    Delayed(Duration),
}

impl AckMode {
    /// Interprets the `--ack` value.
    #[must_use]
    pub fn from_seconds(seconds: i32) -> Self {
        match u64::try_from(seconds) {
            Ok(0) => Self::Immediate,
            Ok(secs) => Self::Delayed(Duration::from_secs(secs)),
            Err(_) => Self::Never,
        }
    }
}

/// Everything `SetPowerState` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPowerStateOptions {
    /// Requested transition.
    pub request: PowerRequest,
    /// Client name to register, if any.
    pub client: Option<String>,
    /// Acknowledgement policy.
    pub ack: AckMode,
    /// Delays to request once a transaction is known.
    pub delays: Vec<i32>,
    /// Extra time to keep servicing notifications.
    pub await_for: Duration,
}

struct PowerStateSession<'a, C: PowerController + ?Sized, W: Write> {
    controller: &'a mut C,
    out: &'a mut W,
    ack: AckMode,
    client_id: u32,
    transaction_id: Option<i32>,
    pending: AckSlot,
}

impl<'a, C: PowerController + ?Sized, W: Write> PowerStateSession<'a, C, W> {
    fn new(controller: &'a mut C, out: &'a mut W, ack: AckMode) -> Self {
        Self {
            controller,
            out,
            ack,
            client_id: 0,
            transaction_id: None,
            pending: AckSlot::default(),
        }
    }

    /// Polls `connect` until the controller is operational.
    fn connect(&mut self) -> io::Result<()> {
        while !self.controller.is_operational() {
            match self.controller.connect() {
                Ok(()) => {
                    writeln!(self.out, "\nSuccess :: Connect")?;
                    break;
                }
                Err(ControllerError::BusUnavailable(error)) => {
                    debug!(target: CONTROLLER_TARGET, %error, "bus unavailable");
                    writeln!(self.out, "\nFailed :: Connect :: IARM bus is UNAVAILABLE")?;
                }
                Err(ControllerError::PluginUnavailable) => {
                    writeln!(self.out, "\nFailed :: Connect :: PowerManager is UNAVAILABLE")?;
                }
                Err(error) => {
                    debug!(target: CONTROLLER_TARGET, %error, "connect failed");
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    fn attach(&mut self, client: Option<&str>) {
        if let Err(error) = self.controller.register_pre_change_listener() {
            warn!(target: CONTROLLER_TARGET, %error, "pre-change listener not registered");
        }
        if let Some(name) = client {
            match self.controller.add_pre_change_client(name) {
                Ok(client_id) => self.client_id = client_id,
                Err(error) => {
                    warn!(target: CONTROLLER_TARGET, client = name, %error, "client not added");
                }
            }
        }
    }

    fn request(&mut self, request: PowerRequest) -> io::Result<()> {
        let PowerRequest::Set(state) = request else {
            return Ok(());
        };
        match self
            .controller
            .set_power_state(0, state, SET_POWER_STATE_REASON)
        {
            Ok(()) => writeln!(self.out, "SetPowerState :: Success"),
            Err(error) if error.is_unavailable() => writeln!(
                self.out,
                "SetPowerState :: Failed :: PowerManager plugin unavailable"
            ),
            Err(error) => {
                debug!(target: CONTROLLER_TARGET, %error, "set power state failed");
                writeln!(self.out, "SetPowerState :: Failed")
            }
        }
    }

    fn on_pre_change(&mut self, event: PreChangeEvent) -> io::Result<()> {
        writeln!(
            self.out,
            "PowerModePreChange :: current: {}, new: {}, client: {}, transaction: {}, change after: {}s",
            event.current_state,
            event.new_state,
            self.client_id,
            event.transaction_id,
            event.state_change_after,
        )?;
        self.transaction_id = Some(event.transaction_id);

        match self.ack {
            AckMode::Never => {}
            AckMode::Immediate => self.complete(event.transaction_id),
            AckMode::Delayed(delay) => {
                let ack = DelayedAck::schedule(
                    self.client_id,
                    event.transaction_id,
                    delay,
                    Instant::now(),
                );
                if let Some(cancelled) = self.pending.schedule(ack) {
                    debug!(
                        target: CONTROLLER_TARGET,
                        transaction_id = cancelled.transaction_id,
                        "superseded pending acknowledgement"
                    );
                }
            }
        }
        Ok(())
    }

    fn complete(&mut self, transaction_id: i32) {
        if let Err(error) = self
            .controller
            .pre_change_complete(self.client_id, transaction_id)
        {
            warn!(target: CONTROLLER_TARGET, transaction_id, %error, "acknowledgement failed");
        }
    }

    fn fire_due_ack(&mut self, now: Instant) {
        if let Some(ack) = self.pending.take_due(now) {
            self.complete(ack.transaction_id);
        }
    }

    fn service_for(&mut self, duration: Duration) -> io::Result<()> {
        self.service_until(Instant::now() + duration, |_| false)
    }

    /// Services notifications and due acknowledgements until `deadline` or
    /// until `done` holds.
    fn service_until(
        &mut self,
        deadline: Instant,
        done: impl Fn(&Self) -> bool,
    ) -> io::Result<()> {
        loop {
            let now = Instant::now();
            self.fire_due_ack(now);
            if done(self) || now >= deadline {
                return Ok(());
            }
            let mut slice = deadline.saturating_duration_since(now).min(POLL_INTERVAL);
            if let Some(due) = self.pending.next_due() {
                slice = slice.min(due.saturating_duration_since(now));
            }
            match self.controller.next_pre_change(slice) {
                Ok(Some(event)) => self.on_pre_change(event)?,
                Ok(None) => {}
                Err(error) => {
                    warn!(target: CONTROLLER_TARGET, %error, "pre-change stream failed");
                    std::thread::sleep(slice);
                }
            }
        }
    }

    fn run_delays(&mut self, delays: &[i32]) -> io::Result<()> {
        if !delays.iter().any(|delay| *delay > 0) {
            return Ok(());
        }
        let deadline = Instant::now() + POLL_INTERVAL * TRANSACTION_WAIT_RETRIES;
        self.service_until(deadline, |session| session.transaction_id.is_some())?;

        for delay in delays.iter().copied().filter(|delay| *delay > 0) {
            let Some(transaction_id) = self.transaction_id.filter(|id| *id > 0) else {
                break;
            };
            if let Err(error) =
                self.controller
                    .delay_power_mode_change_by(self.client_id, transaction_id, delay)
            {
                warn!(target: CONTROLLER_TARGET, delay, %error, "delay request failed");
            }
            let seconds = Duration::from_secs(u64::try_from(delay).unwrap_or_default());
            self.service_for(seconds.saturating_sub(ACK_LEAD))?;
        }
        Ok(())
    }

    fn finish(mut self, client: Option<&str>) -> io::Result<()> {
        if let Some(due) = self.pending.next_due() {
            self.service_until(due, |session| !session.pending.is_pending())?;
        }
        if client.is_some()
            && let Err(error) = self.controller.remove_pre_change_client(self.client_id)
        {
            warn!(target: CONTROLLER_TARGET, %error, "client not removed");
        }
        if let Err(error) = self.controller.unregister_pre_change_listener() {
            warn!(target: CONTROLLER_TARGET, %error, "listener not unregistered");
        }
        self.controller.terminate();
        Ok(())
    }
}

/// Drives one `SetPowerState` run against `controller`, writing progress to
/// `out`.
///
/// # Errors
///
/// Only write failures are returned; controller failures are reported on
/// `out` or logged.
pub fn set_power_state<C, W>(
    controller: &mut C,
    options: &SetPowerStateOptions,
    out: &mut W,
) -> io::Result<()>
where
    C: PowerController + ?Sized,
    W: Write,
{
    writeln!(out, "{}", options.request.announcement())?;
    if let Err(error) = controller.init() {
        warn!(target: CONTROLLER_TARGET, %error, "controller init failed");
    }

    let client = options.client.as_deref().filter(|name| !name.is_empty());
    let mut session = PowerStateSession::new(controller, out, options.ack);
    session.connect()?;
    session.attach(client);
    session.service_for(SETTLE_TIME)?;
    session.request(options.request)?;
    session.run_delays(&options.delays)?;
    if !options.await_for.is_zero() {
        session.service_for(options.await_for)?;
    }
    info!(target: CONTROLLER_TARGET, request = ?options.request, "set power state finished");
    session.finish(client)
}

fn write_usage<W: Write>(out: &mut W) {
    let _ = writeln!(out, "{}", SetPowerStateCli::command().render_help());
}

/// Runs `SetPowerState` with an injected loader and controller factory.
pub(crate) fn run_set_power_state_with<I, W, E, L, C, F>(
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

    let cli = match SetPowerStateCli::try_parse_from(split.tool_arguments(&args)) {
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

    let Some(state) = cli.state.as_deref() else {
        let _ = writeln!(stderr, "Error: POWER_STATE is mandatory.");
        write_usage(stdout);
        return ExitCode::FAILURE;
    };
    let Some(request) = PowerRequest::parse(state) else {
        let _ = writeln!(stderr, "Error: unknown POWER_STATE '{state}'.");
        write_usage(stdout);
        return ExitCode::FAILURE;
    };

    let options = SetPowerStateOptions {
        request,
        client: cli.client,
        ack: AckMode::from_seconds(cli.ack),
        delays: cli.delay.map(|delays| delays.0).unwrap_or_default(),
        await_for: Duration::from_secs(cli.await_secs),
    };

    let result = crate::load_runtime(loader, &split.config_arguments).and_then(|config| {
        let mut controller = make_controller(&config);
        set_power_state(&mut controller, &options, stdout).map_err(AppError::from)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("5", vec![5])]
    #[case("1,2,3", vec![1, 2, 3])]
    #[case("1,,2", vec![1, 2])]
    #[case("1,2,3,4,5,6,7,8,9,10,11,12", vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10])]
    fn parses_delay_lists(#[case] raw: &str, #[case] expected: Vec<i32>) {
        assert_eq!(parse_delays(raw), Ok(DelayList(expected)));
    }

    #[test]
    fn rejects_non_numeric_delays() {
        assert!(parse_delays("1,soon").is_err());
    }

    #[rstest]
    #[case(-1, AckMode::Never)]
    #[case(-7, AckMode::Never)]
    #[case(0, AckMode::Immediate)]
    #[case(3, AckMode::Delayed(Duration::from_secs(3)))]
    fn interprets_ack_values(#[case] seconds: i32, #[case] expected: AckMode) {
        assert_eq!(AckMode::from_seconds(seconds), expected);
    }
}
