//! Scoped bus membership for one-shot tools.

use serde_json::Value;
use tracing::{debug, warn};

use crate::BUS_TARGET;
use crate::errors::BusError;
use crate::payload::EventPayload;
use crate::transport::BusTransport;

/// An initialised and connected bus member.
///
/// Opening a session performs `init` then `connect`. The session is closed
/// with `disconnect` then `term` either explicitly through
/// [`close`](Self::close) or when it is dropped, so no exit path leaves the
/// member registered.
pub struct BusSession<'a, T: BusTransport + ?Sized> {
    transport: &'a mut T,
    member: String,
    open: bool,
}

impl<'a, T: BusTransport + ?Sized> BusSession<'a, T> {
    /// Initialises `member` on the transport and connects it.
    ///
    /// A failed connect still terminates the member before returning.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`BusError`] from `init` or `connect`.
    pub fn open(transport: &'a mut T, member: &str) -> Result<Self, BusError> {
        transport.init(member)?;
        if let Err(error) = transport.connect() {
            if let Err(term_error) = transport.term() {
                warn!(target: BUS_TARGET, member, error = %term_error, "bus term failed");
            }
            return Err(error);
        }
        debug!(target: BUS_TARGET, member, "bus session open");
        Ok(Self {
            transport,
            member: member.to_owned(),
            open: true,
        })
    }

    /// Returns the member name the session registered.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Broadcasts one event.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`BusError`].
    pub fn broadcast(
        &mut self,
        owner: &str,
        event_id: u32,
        payload: &EventPayload,
    ) -> Result<(), BusError> {
        self.transport.broadcast_event(owner, event_id, payload)
    }

    /// Invokes an RPC method.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`BusError`].
    pub fn call(&mut self, owner: &str, method: &str, argument: &Value) -> Result<Value, BusError> {
        self.transport.call(owner, method, argument)
    }

    /// Gives access to the underlying transport for event subscriptions.
    pub fn transport(&mut self) -> &mut T {
        self.transport
    }

    /// Disconnects and terminates the member.
    ///
    /// Both steps run even when the first fails; the first failure is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`BusError`] reported during teardown.
    pub fn close(mut self) -> Result<(), BusError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), BusError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let disconnected = self.transport.disconnect();
        let terminated = self.transport.term();
        debug!(target: BUS_TARGET, member = %self.member, "bus session closed");
        disconnected.and(terminated)
    }
}

impl<T: BusTransport + ?Sized> Drop for BusSession<'_, T> {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            warn!(target: BUS_TARGET, member = %self.member, %error, "bus teardown failed");
        }
    }
}
