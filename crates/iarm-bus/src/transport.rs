//! The contract every bus transport fulfils.

use std::time::Duration;

use serde_json::Value;

use crate::errors::BusError;
use crate::frame::BusEvent;
use crate::payload::EventPayload;

/// Member-side view of the inter-process bus.
///
/// Callers drive the lifecycle `init`, `connect`, requests, `disconnect`,
/// `term`. [`crate::BusSession`] enforces that ordering for one-shot tools.
pub trait BusTransport {
    /// Registers the member name used for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the broker cannot be reached.
    fn init(&mut self, member: &str) -> Result<(), BusError>;

    /// Connects the initialised member to the bus.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the broker refuses the member.
    fn connect(&mut self) -> Result<(), BusError>;

    /// Broadcasts `payload` as `event_id` on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Rejected`] when the broker answers with a failure
    /// code, or a transport error.
    fn broadcast_event(
        &mut self,
        owner: &str,
        event_id: u32,
        payload: &EventPayload,
    ) -> Result<(), BusError>;

    /// Invokes `method` published by `owner` and returns the reply body.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Rejected`] when the call fails on the bus, or a
    /// transport error.
    fn call(&mut self, owner: &str, method: &str, argument: &Value) -> Result<Value, BusError>;

    /// Subscribes to `event_id` from `owner`.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the subscription is refused.
    fn register_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError>;

    /// Cancels a subscription made with
    /// [`register_event_handler`](Self::register_event_handler).
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the broker refuses the request.
    fn unregister_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError>;

    /// Waits up to `timeout` for the next subscribed event.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the stream fails.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<BusEvent>, BusError>;

    /// Disconnects the member from the bus.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the disconnect cannot be announced.
    fn disconnect(&mut self) -> Result<(), BusError>;

    /// Releases the member registration.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when teardown fails.
    fn term(&mut self) -> Result<(), BusError>;
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn init(&mut self, member: &str) -> Result<(), BusError> {
        (**self).init(member)
    }

    fn connect(&mut self) -> Result<(), BusError> {
        (**self).connect()
    }

    fn broadcast_event(
        &mut self,
        owner: &str,
        event_id: u32,
        payload: &EventPayload,
    ) -> Result<(), BusError> {
        (**self).broadcast_event(owner, event_id, payload)
    }

    fn call(&mut self, owner: &str, method: &str, argument: &Value) -> Result<Value, BusError> {
        (**self).call(owner, method, argument)
    }

    fn register_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        (**self).register_event_handler(owner, event_id)
    }

    fn unregister_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        (**self).unregister_event_handler(owner, event_id)
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<BusEvent>, BusError> {
        (**self).next_event(timeout)
    }

    fn disconnect(&mut self) -> Result<(), BusError> {
        (**self).disconnect()
    }

    fn term(&mut self) -> Result<(), BusError> {
        (**self).term()
    }
}
