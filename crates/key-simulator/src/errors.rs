//! Error types for key injection.

use std::io;
use std::sync::Arc;

use iarm_bus::telemetry::TelemetryError;
use nix::errno::Errno;
use thiserror::Error;

/// Failures injecting a key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The argument names no mapped key.
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    /// The uinput device node could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Device node path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A uinput setup request failed.
    #[error("uinput {request} failed: {source}")]
    Setup {
        /// Request that failed.
        request: &'static str,
        /// Kernel error.
        #[source]
        source: Errno,
    },
    /// Writing an input event failed.
    #[error("failed to write input event: {0}")]
    Write(#[source] io::Error),
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise diagnostics: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Key(#[from] KeyError),
}
