//! Static description of a sendable event.

use std::fmt;

use iarm_bus::EventPayload;
use serde_json::Value;

/// Kind of a positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Decimal integer with C `atoi` leniency.
    Integer,
    /// `1`, `true`, `0` or `false`, case-insensitive.
    Boolean,
    /// Raw text.
    String,
}

impl ArgKind {
    /// Short label used in usage text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Boolean => "bool",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// One named positional argument of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Name shown in usage text.
    pub name: &'static str,
    /// Expected kind.
    pub kind: ArgKind,
}

impl Param {
    /// Integer argument.
    #[must_use]
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Integer,
        }
    }

    /// Boolean argument.
    #[must_use]
    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Boolean,
        }
    }

    /// Text argument.
    #[must_use]
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::String,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<{}:{}>", self.name, self.kind)
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// Parsed integer.
    Integer(i32),
    /// Parsed boolean.
    Boolean(bool),
    /// Text passed through unchanged.
    String(String),
}

/// Arguments parsed against an event's schema, in declaration order.
///
/// Accessors take the schema position. A position whose kind does not match
/// yields the kind's zero value; handlers only read positions their own schema
/// declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: Vec<TypedValue>,
}

impl ParsedArgs {
    pub(crate) const fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    /// Number of parsed values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether no values were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Integer at `index`.
    #[must_use]
    pub fn integer(&self, index: usize) -> i32 {
        match self.values.get(index) {
            Some(TypedValue::Integer(value)) => *value,
            _ => 0,
        }
    }

    /// Boolean at `index`.
    #[must_use]
    pub fn boolean(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(TypedValue::Boolean(true)))
    }

    /// Text at `index`.
    #[must_use]
    pub fn string(&self, index: usize) -> &str {
        match self.values.get(index) {
            Some(TypedValue::String(value)) => value,
            _ => "",
        }
    }
}

/// Message a handler asks the dispatcher to put on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Event broadcast.
    Broadcast {
        /// Owner the event is published under.
        owner: &'static str,
        /// Owner-scoped event id.
        event_id: u32,
        /// Event payload.
        payload: EventPayload,
    },
    /// RPC call.
    Call {
        /// Owner publishing the method.
        owner: &'static str,
        /// Method name.
        method: &'static str,
        /// Method argument.
        argument: Value,
    },
}

impl Emission {
    /// Builds a broadcast emission.
    #[must_use]
    pub const fn broadcast(owner: &'static str, event_id: u32, payload: EventPayload) -> Self {
        Self::Broadcast {
            owner,
            event_id,
            payload,
        }
    }

    /// Owner the emission targets.
    #[must_use]
    pub const fn owner(&self) -> &'static str {
        match self {
            Self::Broadcast { owner, .. } | Self::Call { owner, .. } => owner,
        }
    }
}

/// Builds the bus message for one event from its parsed arguments.
pub type EventHandler = fn(&ParsedArgs) -> Emission;

/// Static, immutable description of one sendable event.
#[derive(Clone, Copy)]
pub struct EventDescriptor {
    /// Name given on the command line.
    pub name: &'static str,
    /// Positional arguments in order. Their count is the expected arity.
    pub params: &'static [Param],
    /// One-line description for usage text.
    pub summary: &'static str,
    /// Payload builder.
    pub handler: EventHandler,
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl EventDescriptor {
    /// Number of positional arguments the event requires.
    #[must_use]
    pub const fn expected_arg_count(&self) -> usize {
        self.params.len()
    }

    /// Renders the argument shape, e.g. `<port:int> <connected:bool>`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
