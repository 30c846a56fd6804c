//! Configuration loading and argument splitting shared by every tool.
//!
//! Each binary keeps its historical argv shape. Configuration flags are only
//! recognised as a leading prefix; the first token that is not a known
//! configuration flag starts the tool's own arguments.

use std::ffi::{OsStr, OsString};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use crate::Config;

/// Command-line flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`Config`]. `strict_exit` is deliberately
/// absent: it is configured through `IARM_STRICT_EXIT` or the configuration
/// file only.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--bus-socket",
    "--log-filter",
    "--log-format",
];

/// Loads the layered configuration for a tool.
pub trait ConfigLoader {
    /// Loads configuration from the provided configuration arguments.
    ///
    /// The slice starts with the program name followed by configuration flags
    /// only, as produced by [`split_config_arguments`].
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` failure when a layer cannot be read or
    /// merged.
    fn load(&self, args: &[OsString]) -> Result<Config, Arc<OrthoError>>;
}

/// Loader backed by `ortho_config` discovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(args.iter().cloned())
    }
}

impl<F> ConfigLoader for F
where
    F: Fn(&[OsString]) -> Result<Config, Arc<OrthoError>>,
{
    fn load(&self, args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        self(args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Stop;
    }

    let (flag, has_inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (argument_text.as_ref(), false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Result of separating configuration flags from tool arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgumentSplit {
    /// Program name followed by the configuration flags and their values.
    pub config_arguments: Vec<OsString>,
    /// Index of the first tool argument in the original argv.
    pub command_start: usize,
}

impl ConfigArgumentSplit {
    /// Rebuilds an argv for the tool's own parser: the program name followed
    /// by every token from `command_start` onwards.
    #[must_use]
    pub fn tool_arguments(&self, args: &[OsString]) -> Vec<OsString> {
        let mut tool_args: Vec<OsString> = args.first().cloned().into_iter().collect();
        tool_args.extend(args.iter().skip(self.command_start).cloned());
        tool_args
    }
}

/// Splits the leading configuration flags from the rest of argv.
#[must_use]
pub fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_value = false;

    for argument in args.iter().skip(1) {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }

        match classify_flag(argument) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Stop => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}
