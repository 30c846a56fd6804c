//! Shared configuration for the IARM system-integration tools.
//!
//! Every binary in the workspace resolves the same [`Config`] through
//! `ortho_config`, layering built-in defaults, an optional configuration file,
//! `IARM_*` environment variables, and command-line flags (highest
//! precedence). The crate also owns the helpers that split configuration flags
//! from a tool's own arguments so each binary can keep its historical argv
//! shape.

mod defaults;
mod loader;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, default_bus_socket, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use loader::{
    CONFIG_CLI_FLAGS, ConfigArgumentSplit, ConfigLoader, OrthoConfigLoader,
    split_config_arguments,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError};

/// Resolved configuration shared by every tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "IARM",
    discovery(
        app_name = "iarm-tools",
        env_var = "IARM_CONFIG_PATH",
        config_file_name = "iarm-tools.toml",
        dotfile_name = ".iarm-tools.toml",
        config_cli_long = "config-path",
        config_cli_visible = true,
    )
)]
pub struct Config {
    /// Endpoint of the bus broker.
    #[serde(default = "default_bus_socket")]
    #[ortho_config(default = default_bus_socket())]
    pub bus_socket: SocketEndpoint,
    /// `tracing` filter directive applied to diagnostics.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for diagnostics on stderr.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Turns a failed broadcast into a non-zero exit status.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub strict_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_socket: default_bus_socket(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            strict_exit: false,
        }
    }
}

impl Config {
    /// Returns the configured bus endpoint.
    #[must_use]
    pub const fn bus_socket(&self) -> &SocketEndpoint {
        &self.bus_socket
    }

    /// Returns the log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the diagnostics output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Reports whether broadcast failures should change the exit status.
    #[must_use]
    pub const fn strict_exit(&self) -> bool {
        self.strict_exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_compact_logs_and_lenient_exit() {
        let config = Config::default();
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert!(!config.strict_exit());
    }
}
