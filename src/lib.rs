//! Core implementation of multiservice
//!
//! multiservice runs one shell command across many checkouts. A YAML file maps logical
//! service names to directories under a common root and names the shell snippets that can
//! be run in them. Each invocation resolves a command, wraps it so it runs inside every
//! selected service directory, and hands the result to the user's shell, one service at a
//! time.

use std::io::Write;

use thiserror::Error;

use crate::commands::ResolvedCommand;
use crate::commands::template;
use crate::config_file::ConfigError;
use crate::executor::{ExecError, Executor};
use crate::shell::Shell;

pub mod commands;
pub mod config_file;
pub mod executor;
pub mod logger;
pub mod messages;
pub mod shell;

pub use crate::commands::CommandError;
pub use crate::config_file::Config;

/// Any error that ends an invocation
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl Error {
    /// Process exit code for this error: `2` for bad parameters or configuration, `1` when
    /// the shell or the terminal itself failed.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Exec(ExecError::Shell(_) | ExecError::Output(_)) => 1,
            Error::Config(_)
            | Error::Command(_)
            | Error::Exec(ExecError::ServiceNotFound(_) | ExecError::Config(_)) => 2,
        }
    }
}

/// Resolve `command` and run it, either once (`edit`) or in each of `services`.
///
/// # Errors
///
/// Returns `Error::Command` or `Error::Config` if the command or its template cannot be
/// resolved, before anything runs, or `Error::Exec` if a service is unknown or malformed,
/// or the shell cannot be started.
pub fn run<S: Shell + ?Sized, W: Write>(
    executor: &mut Executor<'_, S, W>,
    command: &str,
    override_text: &str,
    services: &[String],
) -> Result<(), Error> {
    let config = executor.config();
    match commands::resolve(command, override_text, config)? {
        ResolvedCommand::Edit(command_line) => executor.run_once(&command_line)?,
        ResolvedCommand::Shell(snippet) => {
            let templated = template::wrap(&snippet, config)?;
            executor.execute_for_services(command, &templated, services)?;
        }
    }
    Ok(())
}
