//! In-memory transport that records every bus interaction.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::errors::BusError;
use crate::frame::BusEvent;
use crate::payload::EventPayload;
use crate::result::IarmResult;
use crate::transport::BusTransport;

/// One recorded interaction with the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusCall {
    /// `init(member)`.
    Init {
        /// Member name.
        member: String,
    },
    /// `connect()`.
    Connect,
    /// `broadcast_event(owner, event_id, payload)`.
    Broadcast {
        /// Owner name.
        owner: String,
        /// Event id.
        event_id: u32,
        /// Payload sent.
        payload: EventPayload,
    },
    /// `call(owner, method, argument)`.
    Call {
        /// Owner name.
        owner: String,
        /// Method name.
        method: String,
        /// Argument sent.
        argument: Value,
    },
    /// `register_event_handler(owner, event_id)`.
    RegisterEvent {
        /// Owner name.
        owner: String,
        /// Event id.
        event_id: u32,
    },
    /// `unregister_event_handler(owner, event_id)`.
    UnregisterEvent {
        /// Owner name.
        owner: String,
        /// Event id.
        event_id: u32,
    },
    /// `disconnect()`.
    Disconnect,
    /// `term()`.
    Term,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<BusCall>,
    connect_failure: Option<IarmResult>,
    broadcast_failure: Option<IarmResult>,
    call_replies: VecDeque<Result<Value, IarmResult>>,
    events: VecDeque<BusEvent>,
}

/// Scriptable [`BusTransport`] for tests.
///
/// Clones share the same log so a test can keep one handle while the code
/// under test owns another.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingTransport {
    /// Creates a transport on which every request succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `connect` fail with `result`.
    pub fn fail_connect(&self, result: IarmResult) {
        self.state().connect_failure = Some(result);
    }

    /// Makes every broadcast fail with `result`.
    pub fn fail_broadcasts(&self, result: IarmResult) {
        self.state().broadcast_failure = Some(result);
    }

    /// Queues the reply for the next `call`. Calls without a queued reply
    /// succeed with `null`.
    pub fn push_call_reply(&self, reply: Result<Value, IarmResult>) {
        self.state().call_replies.push_back(reply);
    }

    /// Queues an event for `next_event`.
    pub fn push_event(&self, event: BusEvent) {
        self.state().events.push_back(event);
    }

    /// Returns every recorded interaction in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BusCall> {
        self.state().calls.clone()
    }

    /// Returns only the broadcasts.
    #[must_use]
    pub fn broadcasts(&self) -> Vec<(String, u32, EventPayload)> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                BusCall::Broadcast {
                    owner,
                    event_id,
                    payload,
                } => Some((owner.clone(), *event_id, payload.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BusCall) {
        self.state().calls.push(call);
    }
}

impl BusTransport for RecordingTransport {
    fn init(&mut self, member: &str) -> Result<(), BusError> {
        self.record(BusCall::Init {
            member: member.to_owned(),
        });
        Ok(())
    }

    fn connect(&mut self) -> Result<(), BusError> {
        self.record(BusCall::Connect);
        match self.state().connect_failure {
            Some(result) => Err(BusError::Rejected {
                operation: "hello",
                result,
            }),
            None => Ok(()),
        }
    }

    fn broadcast_event(
        &mut self,
        owner: &str,
        event_id: u32,
        payload: &EventPayload,
    ) -> Result<(), BusError> {
        self.record(BusCall::Broadcast {
            owner: owner.to_owned(),
            event_id,
            payload: payload.clone(),
        });
        match self.state().broadcast_failure {
            Some(result) => Err(BusError::Rejected {
                operation: "broadcast",
                result,
            }),
            None => Ok(()),
        }
    }

    fn call(&mut self, owner: &str, method: &str, argument: &Value) -> Result<Value, BusError> {
        self.record(BusCall::Call {
            owner: owner.to_owned(),
            method: method.to_owned(),
            argument: argument.clone(),
        });
        let reply = self.state().call_replies.pop_front();
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(result)) => Err(BusError::Rejected {
                operation: "call",
                result,
            }),
            None => Ok(Value::Null),
        }
    }

    fn register_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        self.record(BusCall::RegisterEvent {
            owner: owner.to_owned(),
            event_id,
        });
        Ok(())
    }

    fn unregister_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        self.record(BusCall::UnregisterEvent {
            owner: owner.to_owned(),
            event_id,
        });
        Ok(())
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<BusEvent>, BusError> {
        let event = self.state().events.pop_front();
        if event.is_none() {
            thread::sleep(timeout);
        }
        Ok(event)
    }

    fn disconnect(&mut self) -> Result<(), BusError> {
        self.record(BusCall::Disconnect);
        Ok(())
    }

    fn term(&mut self) -> Result<(), BusError> {
        self.record(BusCall::Term);
        Ok(())
    }
}
