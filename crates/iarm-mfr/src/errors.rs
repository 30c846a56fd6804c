//! Error types for the manufacturing query.

use std::sync::Arc;

use iarm_bus::telemetry::TelemetryError;
use iarm_bus::{BusError, IarmResult};
use thiserror::Error;

/// Failures fetching a serialized field.
#[derive(Debug, Error)]
pub enum MfrError {
    /// The bus session or call failed.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// The library answered with a body that could not be decoded.
    #[error("malformed serialized-data reply: {0}")]
    MalformedReply(#[source] serde_json::Error),
}

impl MfrError {
    /// Result code reported to the operator.
    #[must_use]
    pub const fn result(&self) -> IarmResult {
        match self {
            Self::Bus(error) => error.result(),
            Self::MalformedReply(_) => IarmResult::IpcCoreFail,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise diagnostics: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_calls_keep_their_code() {
        let error = MfrError::from(BusError::Rejected {
            operation: "call",
            result: IarmResult::InvalidParam,
        });
        assert_eq!(error.result(), IarmResult::InvalidParam);
    }

    #[test]
    fn malformed_replies_are_core_failures() {
        let source = serde_json::from_str::<u32>("\"x\"").expect_err("not a number");
        assert_eq!(
            MfrError::MalformedReply(source).result(),
            IarmResult::IpcCoreFail
        );
    }
}
