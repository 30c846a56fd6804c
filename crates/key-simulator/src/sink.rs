//! Destination for injected key events.

use tracing::debug;

use crate::errors::KeyError;
use crate::keymap::KeyMapping;
use crate::sequence::{KeyAction, KeyStroke, strokes};

pub(crate) const KEY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::inject");

/// Accepts key events. Each stroke is reported as one `EV_KEY` event and
/// closed with a sync report.
pub trait KeySink {
    /// Emits one key event.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] when the event cannot be delivered.
    fn emit(&mut self, stroke: KeyStroke) -> Result<(), KeyError>;
}

/// Injects every phase of `action` for `mapping`, returning the strokes
/// sent.
///
/// # Errors
///
/// Stops at and returns the first failed emission.
pub fn inject<S: KeySink + ?Sized>(
    sink: &mut S,
    mapping: &KeyMapping,
    action: KeyAction,
) -> Result<Vec<KeyStroke>, KeyError> {
    let mut sent = Vec::new();
    for phase in action.phases() {
        for stroke in strokes(mapping, *phase) {
            debug!(target: KEY_TARGET, code = stroke.code, value = stroke.value, "key event");
            sink.emit(stroke)?;
            sent.push(stroke);
        }
    }
    Ok(sent)
}
