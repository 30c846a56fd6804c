//! The power-manager client seam.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ControllerError;
use crate::state::PowerState;

/// Notice that the power manager is about to change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreChangeEvent {
    /// State being left.
    pub current_state: PowerState,
    /// State being entered.
    pub new_state: PowerState,
    /// Transaction to acknowledge or delay.
    pub transaction_id: i32,
    /// Seconds until the change happens unless delayed.
    pub state_change_after: i32,
}

/// Current and previous power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerStateReport {
    /// State now in effect.
    pub current: PowerState,
    /// State before the last transition.
    pub previous: PowerState,
}

/// Client of the power manager.
///
/// Pre-change notifications are pulled with
/// [`next_pre_change`](Self::next_pre_change) once a listener is registered.
pub trait PowerController {
    /// Prepares the client. Must precede every other call.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the client cannot be prepared.
    fn init(&mut self) -> Result<(), ControllerError>;

    /// Attempts one connection to the power manager.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] describing why the manager is not
    /// reachable yet.
    fn connect(&mut self) -> Result<(), ControllerError>;

    /// Reports whether requests can be served.
    fn is_operational(&self) -> bool;

    /// Queries the current and previous state.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the query fails.
    fn power_state(&mut self) -> Result<PowerStateReport, ControllerError>;

    /// Requests a transition.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the request fails.
    fn set_power_state(
        &mut self,
        key_code: i32,
        state: PowerState,
        reason: &str,
    ) -> Result<(), ControllerError>;

    /// Subscribes to pre-change notifications.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the subscription fails.
    fn register_pre_change_listener(&mut self) -> Result<(), ControllerError>;

    /// Cancels the pre-change subscription.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the request fails.
    fn unregister_pre_change_listener(&mut self) -> Result<(), ControllerError>;

    /// Registers a named client whose acknowledgement gates transitions.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the client is refused.
    fn add_pre_change_client(&mut self, name: &str) -> Result<u32, ControllerError>;

    /// Removes a client added with
    /// [`add_pre_change_client`](Self::add_pre_change_client).
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the request fails.
    fn remove_pre_change_client(&mut self, client_id: u32) -> Result<(), ControllerError>;

    /// Acknowledges a pre-change notification.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the request fails.
    fn pre_change_complete(
        &mut self,
        client_id: u32,
        transaction_id: i32,
    ) -> Result<(), ControllerError>;

    /// Postpones a pending transition by `delay_secs` seconds.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the request fails.
    fn delay_power_mode_change_by(
        &mut self,
        client_id: u32,
        transaction_id: i32,
        delay_secs: i32,
    ) -> Result<(), ControllerError>;

    /// Waits up to `timeout` for the next pre-change notification.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the event stream fails.
    fn next_pre_change(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<PreChangeEvent>, ControllerError>;

    /// Releases the client. No call may follow.
    fn terminate(&mut self);
}
