//! Sequential execution of a templated command across services

use std::io::Write;

use log::{info, warn};
use thiserror::Error;

use crate::commands::template;
use crate::config_file::{Config, ConfigError};
use crate::messages::format_running_message;
use crate::shell::{Shell, ShellError};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Service {0} not found")]
    ServiceNotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error("Unable to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Runs command lines through a [`Shell`], reporting progress to `out`.
pub struct Executor<'a, S: Shell + ?Sized, W: Write> {
    config: &'a Config,
    shell: &'a mut S,
    out: W,
    color: bool,
}

impl<'a, S: Shell + ?Sized, W: Write> Executor<'a, S, W> {
    pub fn new(config: &'a Config, shell: &'a mut S, out: W) -> Self {
        Self {
            config,
            shell,
            out,
            color: false,
        }
    }

    /// Style announcements with ANSI colors
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Consume the executor, handing back the output sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run a single command line as-is, outside of any service directory.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::Shell` if the shell could not be started.
    pub fn run_once(&mut self, command_line: &str) -> Result<(), ExecError> {
        let code = self.shell.run(command_line)?;
        log_exit(command_line, code);
        Ok(())
    }

    /// Run `templated` in each service, strictly one after another.
    ///
    /// With no `services`, every configured service runs in declaration order. The exit
    /// status of each run is logged and otherwise ignored: a failing service neither stops
    /// the ones after it nor fails the invocation.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::ServiceNotFound` for the first name that resolves to nothing, or
    /// `ExecError::Config` for the first service whose entry is malformed. Services before
    /// it have already run, none after it are attempted.
    pub fn execute_for_services(
        &mut self,
        command_name: &str,
        templated: &str,
        services: &[String],
    ) -> Result<(), ExecError> {
        let config = self.config;
        let names = if services.is_empty() {
            config.services.names()?
        } else {
            services.to_vec()
        };

        for name in &names {
            let service_dir = config
                .services
                .resolve(name)?
                .ok_or_else(|| ExecError::ServiceNotFound(name.clone()))?;

            writeln!(
                self.out,
                "{}",
                format_running_message(command_name, &service_dir, self.color)
            )?;
            self.out.flush()?;

            let path = config.root()?.join(&service_dir);
            let command_line = template::in_directory(templated, &path, &service_dir);
            info!("Running `{command_name}` for service `{name}` in {}", path.display());

            // A non-zero exit is only logged, the process exit code never reflects it
            let code = self.shell.run(&command_line)?;
            log_exit(&command_line, code);

            writeln!(self.out, "\n")?;
        }
        Ok(())
    }
}

fn log_exit(command_line: &str, code: Option<i32>) {
    match code {
        Some(0) => info!("`{command_line}` succeeded"),
        Some(code) => warn!("`{command_line}` exited with code {code}"),
        None => warn!("`{command_line}` was terminated by a signal"),
    }
}
