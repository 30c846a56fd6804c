//! Event dispatch: lookup, validation, parsing and a single emission.
//!
//! Everything up to the handler call is pure; the bus is only touched once the
//! arguments are known to be valid. A failed emission is reported in the
//! outcome rather than as an error, because usage errors and delivery
//! failures exit differently.

mod descriptor;
mod parse;
mod router;
mod usage;

use iarm_bus::{BusError, BusSession, BusTransport};
use tracing::{debug, info, warn};

use crate::errors::DispatchError;

pub use descriptor::{
    ArgKind, Emission, EventDescriptor, EventHandler, Param, ParsedArgs, TypedValue,
};
pub use parse::{ArgParseError, parse_argument, parse_boolean, parse_integer};
pub use router::{DEVICE_EVENT_PREFIXES, EventTable, lookup, parse_arguments, validate_arity};
pub use usage::write_usage;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Result of putting the event on the bus.
#[derive(Debug)]
pub enum Delivery {
    /// The bus accepted the emission.
    Delivered,
    /// Opening the session or the emission itself failed.
    Failed(BusError),
}

/// Outcome of a dispatch that passed validation.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Canonical name of the dispatched event.
    pub event: &'static str,
    /// What happened on the bus.
    pub delivery: Delivery,
}

/// Validates and sends one event.
///
/// The bus member is registered under `event_name` as typed.
///
/// # Errors
///
/// Returns a [`DispatchError`] for unknown events, wrong argument counts and
/// unparsable arguments. No bus call is made in those cases.
pub fn dispatch<T: BusTransport + ?Sized>(
    event_name: &str,
    raw_args: &[String],
    transport: &mut T,
) -> Result<DispatchOutcome, DispatchError> {
    let candidates = lookup(event_name)?;
    let descriptor = validate_arity(&candidates, raw_args.len())?;
    let args = parse_arguments(descriptor, raw_args)?;
    let emission = (descriptor.handler)(&args);
    debug!(target: DISPATCH_TARGET, event = descriptor.name, ?emission, "built emission");

    let delivery = match emit(event_name, &emission, transport) {
        Ok(()) => {
            info!(
                target: DISPATCH_TARGET,
                event = descriptor.name,
                owner = emission.owner(),
                "event delivered"
            );
            Delivery::Delivered
        }
        Err(error) => {
            warn!(
                target: DISPATCH_TARGET,
                event = descriptor.name,
                owner = emission.owner(),
                result = %error.result(),
                %error,
                "event delivery failed"
            );
            Delivery::Failed(error)
        }
    };

    Ok(DispatchOutcome {
        event: descriptor.name,
        delivery,
    })
}

fn emit<T: BusTransport + ?Sized>(
    member: &str,
    emission: &Emission,
    transport: &mut T,
) -> Result<(), BusError> {
    let mut session = BusSession::open(transport, member)?;
    let sent = match emission {
        Emission::Broadcast {
            owner,
            event_id,
            payload,
        } => session.broadcast(owner, *event_id, payload),
        Emission::Call {
            owner,
            method,
            argument,
        } => session.call(owner, method, argument).map(|_| ()),
    };
    if let Err(error) = session.close() {
        warn!(target: DISPATCH_TARGET, member, %error, "bus teardown failed");
    }
    sent
}
