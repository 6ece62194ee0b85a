mod commands;
mod helpers;

use clap::Parser;
use coincell_core::domain::CoincError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub fn run_from_env() -> i32 {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let coinc_error = error.as_coinc_error();
            eprintln!("{}", coinc_error.diagnostic_line());
            if let Some(summary_line) = coinc_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            coinc_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("coincell".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => commands::run_cluster_command(cli.cluster),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "coincell",
    version,
    about = "Cell-based coincidence search over candidate event files"
)]
struct Cli {
    #[command(flatten)]
    cluster: commands::ClusterArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(CoincError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_coinc_error(&self) -> CoincError {
        match self {
            Self::Usage(message) => CoincError::configuration("CONFIG.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => CoincError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
