//! JSONL frames exchanged with the bus broker.
//!
//! Each request is one JSON object terminated by a newline. The broker answers
//! every request except `bye` with a `result` frame and may interleave
//! unsolicited `event` frames for registered handlers.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BusError;
use crate::payload::EventPayload;
use crate::result::IarmResult;

/// Request sent from a member to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusRequest {
    /// Registers the member name for the connection.
    Hello {
        /// Member name announced by `init`.
        member: String,
    },
    /// Broadcasts an event to every listener of `owner`.
    Broadcast {
        /// Owner the event belongs to.
        owner: String,
        /// Owner-scoped event id.
        event_id: u32,
        /// Event payload.
        payload: EventPayload,
    },
    /// Invokes an RPC method published by `owner`.
    Call {
        /// Owner publishing the method.
        owner: String,
        /// Method name.
        method: String,
        /// Method argument.
        argument: Value,
    },
    /// Subscribes to an owner's event.
    RegisterEvent {
        /// Owner the event belongs to.
        owner: String,
        /// Owner-scoped event id.
        event_id: u32,
    },
    /// Cancels a subscription.
    UnregisterEvent {
        /// Owner the event belongs to.
        owner: String,
        /// Owner-scoped event id.
        event_id: u32,
    },
    /// Announces an orderly disconnect. Not acknowledged.
    Bye,
}

impl BusRequest {
    /// Short name used in diagnostics.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::Broadcast { .. } => "broadcast",
            Self::Call { .. } => "call",
            Self::RegisterEvent { .. } => "register_event",
            Self::UnregisterEvent { .. } => "unregister_event",
            Self::Bye => "bye",
        }
    }
}

/// Frame sent from the broker to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusMessage {
    /// Reply to the most recent request.
    Result {
        /// Outcome code.
        code: IarmResult,
        /// Reply body for calls, `null` otherwise.
        #[serde(default)]
        payload: Value,
    },
    /// Event delivered to a registered handler.
    Event(BusEvent),
}

/// Event delivered to a member that registered a handler for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    /// Owner that broadcast the event.
    pub owner: String,
    /// Owner-scoped event id.
    pub event_id: u32,
    /// Event body.
    #[serde(default)]
    pub data: Value,
}

/// Writes one request frame and flushes the writer.
///
/// # Errors
///
/// Returns [`BusError::Serialise`] or [`BusError::Send`].
pub fn write_request<W: Write>(writer: &mut W, request: &BusRequest) -> Result<(), BusError> {
    let mut line = serde_json::to_vec(request).map_err(BusError::Serialise)?;
    line.push(b'\n');
    writer.write_all(&line).map_err(BusError::Send)?;
    writer.flush().map_err(BusError::Send)
}

/// Parses one broker frame.
///
/// # Errors
///
/// Returns [`BusError::Parse`] when the line is not a valid frame.
pub fn parse_message(line: &str) -> Result<BusMessage, BusError> {
    serde_json::from_str(line.trim_end()).map_err(BusError::Parse)
}
