//! Failures detected before anything is sent on the bus.

use std::sync::Arc;

use iarm_bus::telemetry::TelemetryError;
use thiserror::Error;

use crate::dispatch::ArgParseError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise diagnostics: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Usage and parse failures. Every variant means no bus activity happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No event name was given.
    #[error("an event name must be provided")]
    MissingEvent,

    /// The event name is in neither table.
    #[error("unknown event '{name}'")]
    UnknownEvent {
        /// Name as typed.
        name: String,
    },

    /// The argument count matches none of the event's arities.
    #[error("{event} expects {} argument(s), got {actual}", join_counts(.expected))]
    Arity {
        /// Canonical event name.
        event: &'static str,
        /// Accepted argument counts.
        expected: Vec<usize>,
        /// Supplied argument count.
        actual: usize,
    },

    /// A positional argument failed to parse.
    #[error("{event}: argument {position} <{param}>: {source}")]
    InvalidArgument {
        /// Canonical event name.
        event: &'static str,
        /// One-based argument position.
        position: usize,
        /// Parameter name from the schema.
        param: &'static str,
        /// Parse failure.
        #[source]
        source: ArgParseError,
    },
}

impl DispatchError {
    /// Creates an unknown-event error.
    pub fn unknown_event(name: impl Into<String>) -> Self {
        Self::UnknownEvent { name: name.into() }
    }

    /// Creates an arity error.
    #[must_use]
    pub const fn arity(event: &'static str, expected: Vec<usize>, actual: usize) -> Self {
        Self::Arity {
            event,
            expected,
            actual,
        }
    }

    /// Creates an invalid-argument error.
    #[must_use]
    pub const fn invalid_argument(
        event: &'static str,
        position: usize,
        param: &'static str,
        source: ArgParseError,
    ) -> Self {
        Self::InvalidArgument {
            event,
            position,
            param,
            source,
        }
    }
}

fn join_counts(counts: &[usize]) -> String {
    counts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
