//! Key event sequencing.

use clap::ValueEnum;

use crate::keymap::KeyMapping;

/// Phase of one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    /// Key released.
    Up,
    /// Key pressed.
    Down,
    /// Auto-repeat while held.
    Repeat,
}

impl KeyPhase {
    /// Value carried by the `EV_KEY` event.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Repeat => 2,
        }
    }
}

/// What the operator asked to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyAction {
    /// Down followed by up.
    #[default]
    Press,
    /// Down only.
    Down,
    /// Up only.
    Up,
    /// One auto-repeat event.
    Repeat,
}

impl KeyAction {
    /// Phases injected for the action, in order.
    #[must_use]
    pub const fn phases(self) -> &'static [KeyPhase] {
        match self {
            Self::Press => &[KeyPhase::Down, KeyPhase::Up],
            Self::Down => &[KeyPhase::Down],
            Self::Up => &[KeyPhase::Up],
            Self::Repeat => &[KeyPhase::Repeat],
        }
    }
}

/// One `EV_KEY` event to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    /// Linux key code.
    pub code: u16,
    /// Event value, see [`KeyPhase::value`].
    pub value: i32,
}

/// Events for one phase of `mapping`.
///
/// The modifier goes down before the key and comes up after it; repeats
/// carry no modifier.
#[must_use]
pub fn strokes(mapping: &KeyMapping, phase: KeyPhase) -> Vec<KeyStroke> {
    let value = phase.value();
    let key = KeyStroke {
        code: mapping.key,
        value,
    };
    let modifier = mapping.modifier.map(|code| KeyStroke { code, value });
    match (phase, modifier) {
        (KeyPhase::Down, Some(modifier)) => vec![modifier, key],
        (KeyPhase::Up, Some(modifier)) => vec![key, modifier],
        _ => vec![key],
    }
}
