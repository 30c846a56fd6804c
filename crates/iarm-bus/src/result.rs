//! Result codes returned by the bus for every request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome code attached to every bus reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum IarmResult {
    /// The request completed.
    Success,
    /// A request argument was rejected.
    InvalidParam,
    /// The bus or the target was not in a state to accept the request.
    InvalidState,
    /// The inter-process core failed to deliver the request.
    IpcCoreFail,
    /// The bus ran out of memory.
    OutOfMemory,
}

impl IarmResult {
    /// Returns the numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InvalidParam => 1,
            Self::InvalidState => 2,
            Self::IpcCoreFail => 3,
            Self::OutOfMemory => 4,
        }
    }

    /// Maps a numeric code back to a result.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::InvalidParam),
            2 => Some(Self::InvalidState),
            3 => Some(Self::IpcCoreFail),
            4 => Some(Self::OutOfMemory),
            _ => None,
        }
    }

    /// Reports whether the code signals success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Success => "IARM_RESULT_SUCCESS",
            Self::InvalidParam => "IARM_RESULT_INVALID_PARAM",
            Self::InvalidState => "IARM_RESULT_INVALID_STATE",
            Self::IpcCoreFail => "IARM_RESULT_IPCCORE_FAIL",
            Self::OutOfMemory => "IARM_RESULT_OOM",
        }
    }
}

impl fmt::Display for IarmResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.label(), self.code())
    }
}

impl From<IarmResult> for i32 {
    fn from(result: IarmResult) -> Self {
        result.code()
    }
}

impl TryFrom<i32> for IarmResult {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown bus result code {code}"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(IarmResult::Success)]
    #[case(IarmResult::InvalidParam)]
    #[case(IarmResult::InvalidState)]
    #[case(IarmResult::IpcCoreFail)]
    #[case(IarmResult::OutOfMemory)]
    fn codes_map_back_to_results(#[case] result: IarmResult) {
        assert_eq!(IarmResult::from_code(result.code()), Some(result));
    }

    #[test]
    fn unknown_codes_fail_to_deserialise() {
        let parsed: Result<IarmResult, _> = serde_json::from_str("9");
        assert!(parsed.is_err());
    }
}
