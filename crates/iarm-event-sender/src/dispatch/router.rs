//! Event lookup, arity validation and argument parsing.
//!
//! Names carrying a device prefix resolve against the device table with an
//! exact, case-sensitive comparison. Every other name resolves against the
//! system table case-insensitively; a system event may be listed once per
//! arity it accepts.

use crate::errors::DispatchError;
use crate::events::{DEVICE_EVENTS, SYSTEM_EVENTS};

use super::descriptor::{EventDescriptor, ParsedArgs};
use super::parse::parse_argument;

/// Prefixes that select the device table.
pub const DEVICE_EVENT_PREFIXES: &[&str] = &["IARM_", "DSMgr_"];

/// The two event tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTable {
    /// Device-settings events, matched exactly.
    Device,
    /// System-manager and legacy events, matched case-insensitively.
    System,
}

impl EventTable {
    /// Selects the table responsible for `name`.
    #[must_use]
    pub fn for_event(name: &str) -> Self {
        if DEVICE_EVENT_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            Self::Device
        } else {
            Self::System
        }
    }

    /// Descriptors in the table, in declaration order.
    #[must_use]
    pub const fn descriptors(self) -> &'static [EventDescriptor] {
        match self {
            Self::Device => DEVICE_EVENTS,
            Self::System => SYSTEM_EVENTS,
        }
    }

    fn matches(self, descriptor: &EventDescriptor, name: &str) -> bool {
        match self {
            Self::Device => descriptor.name == name,
            Self::System => descriptor.name.eq_ignore_ascii_case(name),
        }
    }
}

/// Finds every descriptor registered under `name`.
///
/// The result is never empty; device events have exactly one entry.
///
/// # Errors
///
/// Returns [`DispatchError::UnknownEvent`] when no descriptor matches.
pub fn lookup(name: &str) -> Result<Vec<&'static EventDescriptor>, DispatchError> {
    let table = EventTable::for_event(name);
    let candidates: Vec<&'static EventDescriptor> = table
        .descriptors()
        .iter()
        .filter(|descriptor| table.matches(descriptor, name))
        .collect();

    if candidates.is_empty() {
        Err(DispatchError::unknown_event(name))
    } else {
        Ok(candidates)
    }
}

/// Selects the candidate whose arity equals `actual`.
///
/// # Errors
///
/// Returns [`DispatchError::Arity`] listing the accepted counts.
pub fn validate_arity(
    candidates: &[&'static EventDescriptor],
    actual: usize,
) -> Result<&'static EventDescriptor, DispatchError> {
    if let Some(descriptor) = candidates
        .iter()
        .copied()
        .find(|descriptor| descriptor.expected_arg_count() == actual)
    {
        return Ok(descriptor);
    }

    let event = candidates.first().map_or("", |descriptor| descriptor.name);
    let mut expected: Vec<usize> = candidates
        .iter()
        .map(|descriptor| descriptor.expected_arg_count())
        .collect();
    expected.sort_unstable();
    expected.dedup();
    Err(DispatchError::arity(event, expected, actual))
}

/// Parses `raw` left to right against the descriptor's schema, stopping at
/// the first failure.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidArgument`] for the first value that does
/// not parse.
pub fn parse_arguments(
    descriptor: &'static EventDescriptor,
    raw: &[String],
) -> Result<ParsedArgs, DispatchError> {
    descriptor
        .params
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (param, value))| {
            parse_argument(value, param.kind).map_err(|source| {
                DispatchError::invalid_argument(descriptor.name, index + 1, param.name, source)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ParsedArgs::new)
}
