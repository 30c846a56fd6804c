//! Error types for the power tools.

use std::io;
use std::sync::Arc;

use iarm_bus::telemetry::TelemetryError;
use iarm_bus::{BusError, IarmResult};
use thiserror::Error;

/// Failures reported by a [`crate::PowerController`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The bus itself could not be reached.
    #[error("IARM bus is unavailable: {0}")]
    BusUnavailable(#[source] BusError),
    /// The bus is up but the power manager is not serving requests.
    #[error("PowerManager plugin is unavailable")]
    PluginUnavailable,
    /// The power manager refused the request.
    #[error("PowerManager rejected the request: {0}")]
    Rejected(IarmResult),
    /// The power manager replied with a body that could not be decoded.
    #[error("malformed PowerManager reply: {0}")]
    MalformedReply(#[source] serde_json::Error),
}

impl ControllerError {
    /// Reports whether the failure means the power manager cannot be
    /// reached at all.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::BusUnavailable(_) | Self::PluginUnavailable)
    }
}

impl From<BusError> for ControllerError {
    fn from(error: BusError) -> Self {
        match error {
            BusError::Rejected {
                result: IarmResult::InvalidState,
                ..
            } => Self::PluginUnavailable,
            BusError::Rejected { result, .. } => Self::Rejected(result),
            other => Self::BusUnavailable(other),
        }
    }
}

/// Failures reading the cached power-manager settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Settings file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file holds no data.
    #[error("{path} is empty")]
    Empty {
        /// Settings file path.
        path: String,
    },
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise diagnostics: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
