//! Resolution of a command name into the shell text that should run
//!
//! A command is either one of the snippets declared under `commands` in the config, the
//! free-form text passed with `--execute`, or the built-in `edit` action that opens the
//! config file itself.

use log::{debug, warn};
use thiserror::Error;

use crate::config_file::{Config, ConfigError};

pub mod template;

/// Built-in action that opens the config file in the configured editor
pub const EDIT: &str = "edit";
/// Built-in action that runs the `--execute` text instead of a configured snippet
pub const EXECUTE: &str = "execute";

/// Errors that can occur while resolving a command name
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: \"{0}\"")]
    UnknownCommand(String),
    #[error("Please set \"editor\" in the config")]
    MissingEditor,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a command name turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommand {
    /// Run once, outside of any service directory
    Edit(String),
    /// Run in every selected service
    Shell(String),
}

/// Resolve `name` against the config.
///
/// `override_text` is only consulted for the `execute` action and is returned as-is. Only
/// the config values the command needs are read, `edit` never looks at `commands`.
///
/// # Errors
///
/// Returns `CommandError::MissingEditor` for `edit` without an `editor` in the config,
/// `CommandError::UnknownCommand` if `name` is neither built-in nor declared, or
/// `CommandError::Config` if the value it needs is malformed.
pub fn resolve(
    name: &str,
    override_text: &str,
    config: &Config,
) -> Result<ResolvedCommand, CommandError> {
    match name {
        EDIT => {
            let editor = config
                .editor()?
                .filter(|editor| !editor.is_empty())
                .ok_or(CommandError::MissingEditor)?;
            Ok(ResolvedCommand::Edit(format!(
                "{editor} {}",
                config.path.display()
            )))
        }
        EXECUTE => {
            if override_text.is_empty() {
                warn!("`execute` called without --execute text, running an empty command");
            }
            Ok(ResolvedCommand::Shell(override_text.to_string()))
        }
        _ => {
            let snippet = config
                .commands
                .get(name)?
                .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
            debug!("Resolved command `{name}` to `{}`", snippet.trim());
            Ok(ResolvedCommand::Shell(snippet.trim().to_string()))
        }
    }
}
