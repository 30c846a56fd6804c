//! The event tables.

mod device;
mod system;

pub use device::DEVICE_EVENTS;
pub use system::{SYSTEM_EVENTS, abbreviate_payload};
