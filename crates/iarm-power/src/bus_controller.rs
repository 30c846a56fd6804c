//! [`PowerController`] backed by the IARM bus.

use std::time::Duration;

use iarm_bus::{BusTransport, POWER_MANAGER_OWNER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::controller::{PowerController, PowerStateReport, PreChangeEvent};
use crate::errors::ControllerError;
use crate::state::PowerState;

/// Tracing target for power-manager traffic.
pub(crate) const CONTROLLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controller");

/// Event id of the power manager's pre-change notification.
pub const PRE_CHANGE_EVENT_ID: u32 = 0;

const GET_POWER_STATE: &str = "GetPowerState";
const SET_POWER_STATE: &str = "SetPowerState";
const ADD_PRE_CHANGE_CLIENT: &str = "AddPowerModePreChangeClient";
const REMOVE_PRE_CHANGE_CLIENT: &str = "RemovePowerModePreChangeClient";
const PRE_CHANGE_COMPLETE: &str = "PowerModePreChangeComplete";
const DELAY_POWER_MODE_CHANGE_BY: &str = "DelayPowerModeChangeBy";

#[derive(Deserialize)]
struct ClientReply {
    client_id: u32,
}

/// Talks to the power manager through a [`BusTransport`].
pub struct BusPowerController<T: BusTransport> {
    transport: T,
    member: String,
    connected: bool,
    listening: bool,
}

impl<T: BusTransport> BusPowerController<T> {
    /// Creates a controller registering on the bus as `member`.
    pub fn new(transport: T, member: impl Into<String>) -> Self {
        Self {
            transport,
            member: member.into(),
            connected: false,
            listening: false,
        }
    }

    /// Borrows the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&mut self, method: &str, argument: &Value) -> Result<Value, ControllerError> {
        if !self.connected {
            return Err(ControllerError::PluginUnavailable);
        }
        debug!(target: CONTROLLER_TARGET, method, %argument, "power manager call");
        Ok(self.transport.call(POWER_MANAGER_OWNER, method, argument)?)
    }

    fn call_decoded<R: DeserializeOwned>(
        &mut self,
        method: &str,
        argument: &Value,
    ) -> Result<R, ControllerError> {
        let reply = self.call(method, argument)?;
        serde_json::from_value(reply).map_err(ControllerError::MalformedReply)
    }
}

impl<T: BusTransport> PowerController for BusPowerController<T> {
    fn init(&mut self) -> Result<(), ControllerError> {
        let member = self.member.clone();
        Ok(self.transport.init(&member)?)
    }

    fn connect(&mut self) -> Result<(), ControllerError> {
        self.transport.connect()?;
        self.connected = true;
        Ok(())
    }

    fn is_operational(&self) -> bool {
        self.connected
    }

    fn power_state(&mut self) -> Result<PowerStateReport, ControllerError> {
        self.call_decoded(GET_POWER_STATE, &Value::Null)
    }

    fn set_power_state(
        &mut self,
        key_code: i32,
        state: PowerState,
        reason: &str,
    ) -> Result<(), ControllerError> {
        let argument = json!({
            "key_code": key_code,
            "state": state,
            "reason": reason,
        });
        self.call(SET_POWER_STATE, &argument).map(drop)
    }

    fn register_pre_change_listener(&mut self) -> Result<(), ControllerError> {
        self.transport
            .register_event_handler(POWER_MANAGER_OWNER, PRE_CHANGE_EVENT_ID)?;
        self.listening = true;
        Ok(())
    }

    fn unregister_pre_change_listener(&mut self) -> Result<(), ControllerError> {
        self.listening = false;
        Ok(self
            .transport
            .unregister_event_handler(POWER_MANAGER_OWNER, PRE_CHANGE_EVENT_ID)?)
    }

    fn add_pre_change_client(&mut self, name: &str) -> Result<u32, ControllerError> {
        let reply: ClientReply =
            self.call_decoded(ADD_PRE_CHANGE_CLIENT, &json!({ "client_name": name }))?;
        Ok(reply.client_id)
    }

    fn remove_pre_change_client(&mut self, client_id: u32) -> Result<(), ControllerError> {
        self.call(REMOVE_PRE_CHANGE_CLIENT, &json!({ "client_id": client_id }))
            .map(drop)
    }

    fn pre_change_complete(
        &mut self,
        client_id: u32,
        transaction_id: i32,
    ) -> Result<(), ControllerError> {
        let argument = json!({
            "client_id": client_id,
            "transaction_id": transaction_id,
        });
        self.call(PRE_CHANGE_COMPLETE, &argument).map(drop)
    }

    fn delay_power_mode_change_by(
        &mut self,
        client_id: u32,
        transaction_id: i32,
        delay_secs: i32,
    ) -> Result<(), ControllerError> {
        let argument = json!({
            "client_id": client_id,
            "transaction_id": transaction_id,
            "delay_period": delay_secs,
        });
        self.call(DELAY_POWER_MODE_CHANGE_BY, &argument).map(drop)
    }

    fn next_pre_change(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<PreChangeEvent>, ControllerError> {
        if !self.listening {
            std::thread::sleep(timeout);
            return Ok(None);
        }
        let Some(event) = self.transport.next_event(timeout)? else {
            return Ok(None);
        };
        if event.owner != POWER_MANAGER_OWNER || event.event_id != PRE_CHANGE_EVENT_ID {
            debug!(
                target: CONTROLLER_TARGET,
                owner = %event.owner,
                event_id = event.event_id,
                "ignoring unrelated event"
            );
            return Ok(None);
        }
        serde_json::from_value(event.data)
            .map(Some)
            .map_err(ControllerError::MalformedReply)
    }

    fn terminate(&mut self) {
        if self.connected {
            if let Err(error) = self.transport.disconnect() {
                warn!(target: CONTROLLER_TARGET, %error, "disconnect failed");
            }
            self.connected = false;
        }
        if let Err(error) = self.transport.term() {
            warn!(target: CONTROLLER_TARGET, %error, "term failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use iarm_bus::testing::{BusCall, RecordingTransport};
    use iarm_bus::{BusEvent, IarmResult};
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn transport() -> RecordingTransport {
        RecordingTransport::new()
    }

    fn connected(transport: &RecordingTransport) -> BusPowerController<RecordingTransport> {
        let mut controller = BusPowerController::new(transport.clone(), "SetPowerState");
        controller.init().expect("init");
        controller.connect().expect("connect");
        controller
    }

    #[rstest]
    fn queries_decode_both_states(transport: RecordingTransport) {
        transport.push_call_reply(Ok(json!({ "current": 3, "previous": 2 })));
        let mut controller = connected(&transport);

        let report = controller.power_state().expect("state");

        assert_eq!(
            report,
            PowerStateReport {
                current: PowerState::On,
                previous: PowerState::Standby,
            }
        );
    }

    #[rstest]
    fn calls_before_connect_are_unavailable(transport: RecordingTransport) {
        let mut controller = BusPowerController::new(transport, "QueryPowerState");
        let error = controller.power_state().expect_err("not connected");
        assert!(error.is_unavailable());
    }

    #[rstest]
    fn set_power_state_sends_the_reason(transport: RecordingTransport) {
        let mut controller = connected(&transport);
        controller
            .set_power_state(0, PowerState::DeepSleep, "tool")
            .expect("set");

        assert!(transport.calls().contains(&BusCall::Call {
            owner: String::from(POWER_MANAGER_OWNER),
            method: String::from(SET_POWER_STATE),
            argument: json!({ "key_code": 0, "state": 5, "reason": "tool" }),
        }));
    }

    #[rstest]
    fn rejected_calls_keep_their_result(transport: RecordingTransport) {
        transport.push_call_reply(Err(IarmResult::InvalidParam));
        let mut controller = connected(&transport);
        let error = controller
            .delay_power_mode_change_by(1, 2, 3)
            .expect_err("rejected");
        assert!(matches!(
            error,
            ControllerError::Rejected(IarmResult::InvalidParam)
        ));
    }

    #[rstest]
    fn pre_change_events_are_decoded(transport: RecordingTransport) {
        transport.push_event(BusEvent {
            owner: String::from("SYSMgr"),
            event_id: 0,
            data: Value::Null,
        });
        transport.push_event(BusEvent {
            owner: String::from(POWER_MANAGER_OWNER),
            event_id: PRE_CHANGE_EVENT_ID,
            data: json!({
                "current_state": 3,
                "new_state": 2,
                "transaction_id": 7,
                "state_change_after": 4,
            }),
        });
        let mut controller = connected(&transport);
        controller.register_pre_change_listener().expect("register");

        let first = controller
            .next_pre_change(Duration::from_millis(1))
            .expect("first");
        let second = controller
            .next_pre_change(Duration::from_millis(1))
            .expect("second");

        assert_eq!(first, None);
        assert_eq!(
            second,
            Some(PreChangeEvent {
                current_state: PowerState::On,
                new_state: PowerState::Standby,
                transaction_id: 7,
                state_change_after: 4,
            })
        );
    }

    #[rstest]
    fn terminate_disconnects_then_terms(transport: RecordingTransport) {
        let mut controller = connected(&transport);
        controller.terminate();
        assert_eq!(
            transport.calls(),
            vec![
                BusCall::Init {
                    member: String::from("SetPowerState")
                },
                BusCall::Connect,
                BusCall::Disconnect,
                BusCall::Term,
            ]
        );
    }
}
