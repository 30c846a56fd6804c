//! Power states as reported by the power manager and its settings file.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Power state in the controller's numbering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum PowerState {
    /// State not known or not applicable.
    #[default]
    Unknown,
    /// Powered off.
    Off,
    /// Standby.
    Standby,
    /// Fully on.
    On,
    /// Light-sleep standby.
    LightSleep,
    /// Deep-sleep standby.
    DeepSleep,
}

impl PowerState {
    /// Wire code used by the power manager.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Off => 1,
            Self::Standby => 2,
            Self::On => 3,
            Self::LightSleep => 4,
            Self::DeepSleep => 5,
        }
    }

    /// Maps a power-manager code back to a state.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::iter().find(|state| state.code() == code)
    }

    /// Maps the code stored in the cached settings file, which numbers the
    /// states without an `Unknown` slot.
    #[must_use]
    pub const fn from_settings_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::Standby),
            2 => Some(Self::On),
            3 => Some(Self::LightSleep),
            4 => Some(Self::DeepSleep),
            _ => None,
        }
    }

    /// Upper-case name printed by the tools, `None` for [`Self::Unknown`].
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Off => Some("OFF"),
            Self::Standby => Some("STANDBY"),
            Self::On => Some("ON"),
            Self::LightSleep => Some("LIGHTSLEEP"),
            Self::DeepSleep => Some("DEEPSLEEP"),
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name().unwrap_or("Unknown"))
    }
}

impl From<PowerState> for u32 {
    fn from(state: PowerState) -> Self {
        state.code()
    }
}

impl TryFrom<u32> for PowerState {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown power state code {code}"))
    }
}

/// What `SetPowerState` was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRequest {
    /// Request a transition to the state.
    Set(PowerState),
    /// Attach to the power manager without requesting a transition.
    Nop,
}

/// Names accepted as a prefix, in matching order.
const REQUEST_PREFIXES: &[(&str, PowerState)] = &[
    ("ON", PowerState::On),
    ("STANDBY", PowerState::Standby),
    ("LIGHTSLEEP", PowerState::LightSleep),
    ("DEEPSLEEP", PowerState::DeepSleep),
    ("OFF", PowerState::Off),
];

impl PowerRequest {
    /// Parses a state argument.
    ///
    /// State names match case-insensitively as a prefix of the argument, so
    /// `standby_now` requests standby. `NOP` must match exactly.
    #[must_use]
    pub fn parse(argument: &str) -> Option<Self> {
        REQUEST_PREFIXES
            .iter()
            .find(|(name, _)| {
                argument
                    .get(..name.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(name))
            })
            .map(|(_, state)| Self::Set(*state))
            .or_else(|| (argument == "NOP").then_some(Self::Nop))
    }

    /// Line announcing the request.
    #[must_use]
    pub const fn announcement(self) -> &'static str {
        match self {
            Self::Set(PowerState::On) => "ON Request...",
            Self::Set(PowerState::Standby) => "STANDBY Request...",
            Self::Set(PowerState::LightSleep) => "Light Sleep Request...",
            Self::Set(PowerState::DeepSleep) => "Deep Sleep Request...",
            Self::Set(PowerState::Off) => "OFF Request...",
            Self::Set(PowerState::Unknown) | Self::Nop => "NOP Request...",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ON", Some(PowerRequest::Set(PowerState::On)))]
    #[case("on", Some(PowerRequest::Set(PowerState::On)))]
    #[case("ONWARDS", Some(PowerRequest::Set(PowerState::On)))]
    #[case("standby", Some(PowerRequest::Set(PowerState::Standby)))]
    #[case("LightSleep", Some(PowerRequest::Set(PowerState::LightSleep)))]
    #[case("DEEPSLEEP", Some(PowerRequest::Set(PowerState::DeepSleep)))]
    #[case("off", Some(PowerRequest::Set(PowerState::Off)))]
    #[case("NOP", Some(PowerRequest::Nop))]
    #[case("nop", None)]
    #[case("O", None)]
    #[case("SLEEP", None)]
    #[case("", None)]
    fn parses_requests(#[case] argument: &str, #[case] expected: Option<PowerRequest>) {
        assert_eq!(PowerRequest::parse(argument), expected);
    }

    #[rstest]
    #[case(0, Some(PowerState::Off))]
    #[case(2, Some(PowerState::On))]
    #[case(4, Some(PowerState::DeepSleep))]
    #[case(5, None)]
    fn settings_codes_skip_unknown(#[case] code: u32, #[case] expected: Option<PowerState>) {
        assert_eq!(PowerState::from_settings_code(code), expected);
    }

    #[test]
    fn controller_codes_round_trip() {
        for state in PowerState::iter() {
            assert_eq!(PowerState::from_code(state.code()), Some(state));
        }
        assert_eq!(PowerState::from_code(9), None);
    }

    #[test]
    fn unknown_displays_as_unknown() {
        assert_eq!(PowerState::Unknown.to_string(), "Unknown");
        assert_eq!(PowerState::LightSleep.to_string(), "LIGHTSLEEP");
    }
}
