use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};

use multiservice::config_file::DEFAULT_CONFIG_PATH;
use multiservice::executor::Executor;
use multiservice::shell::SystemShell;
use multiservice::{Config, Error};

#[derive(Parser, Debug)]
#[command(
    name = "multiservice",
    version,
    about = "Run configured shell commands across multiple service directories"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Command line to run with the `execute` command
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    execute: String,

    /// Log file path (log records are also written here)
    #[arg(long)]
    log_file: Option<String>,

    /// Name of a configured command, `edit` or `execute`
    command: String,

    /// Services to run the command in (all configured services if omitted)
    services: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = match cli.log_file.as_ref().map(std::fs::File::create).transpose() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: unable to open log file: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = multiservice::logger::init(log_file) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    debug!("CLI args parsed: {cli:?}");
    let config = Config::load(&cli.config)?;

    let mut shell = SystemShell::from_env();
    debug!("Using shell {}", shell.program().display());

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let mut executor = Executor::new(&config, &mut shell, stdout.lock()).with_color(color);
    multiservice::run(&mut executor, &cli.command, &cli.execute, &cli.services)
}
