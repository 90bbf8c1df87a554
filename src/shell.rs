//! Running generated command lines through the user's shell

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

use log::debug;
use thiserror::Error;

/// Environment variable that overrides the interpreter
pub const SHELL_ENV: &str = "SHELL";

#[cfg(windows)]
pub const DEFAULT_SHELL: &str = "cmd.exe";
#[cfg(not(windows))]
pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Unable to start shell {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can run a command line to completion.
pub trait Shell {
    /// Run `command_line`, blocking until it exits.
    ///
    /// Returns the exit code, or `None` when the process was ended by a signal.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Spawn` if the shell itself could not be started.
    fn run(&mut self, command_line: &str) -> Result<Option<i32>, ShellError>;
}

/// The real shell: `$SHELL -c <line>`, falling back to the platform default.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: PathBuf,
}

impl SystemShell {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `$SHELL` when it is set and non-empty, the platform default otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_var(std::env::var_os(SHELL_ENV))
    }

    /// Pick the interpreter from the value of `$SHELL`. Unset and empty both mean
    /// [`DEFAULT_SHELL`].
    #[must_use]
    pub fn from_var(value: Option<OsString>) -> Self {
        let program = value
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SHELL), PathBuf::from);
        Self::new(program)
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// `cmd.exe` takes `/C`, everything else (sh, bash, zsh, fish, ...) takes `-c`.
fn command_flag(program: &Path) -> &'static str {
    let is_cmd = program
        .file_stem()
        .and_then(OsStr::to_str)
        .is_some_and(|stem| stem.eq_ignore_ascii_case("cmd"));
    if is_cmd { "/C" } else { "-c" }
}

impl Shell for SystemShell {
    fn run(&mut self, command_line: &str) -> Result<Option<i32>, ShellError> {
        debug!("Running with {}: {command_line}", self.program.display());
        let status = ProcessCommand::new(&self.program)
            .arg(command_flag(&self.program))
            .arg(command_line)
            .status()
            .map_err(|e| ShellError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;
        Ok(status.code())
    }
}
