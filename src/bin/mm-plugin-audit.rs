use clap::Parser;
use mm_plugin_audit::config::{Cli, Settings, TerminalPassword};
use mm_plugin_audit::error::{AuditError, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use mm_plugin_audit::{audit_server, format_output, MattermostClient};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Variables already in the environment take precedence over .env
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    init_logging(cli.verbose);

    let outcome = match Settings::from_cli(cli, &TerminalPassword) {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("{}", e);
            let mut cause = std::error::Error::source(&e);
            while let Some(inner) = cause {
                debug!("caused by: {}", inner);
                cause = inner.source();
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "mm_plugin_audit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(settings: Settings) -> Result<(), AuditError> {
    debug!("connecting to {}", settings.server.url);
    let client = MattermostClient::connect(&settings.server).await?;

    let result = audit_server(&client, &settings.options).await?;

    let mut writer = open_output(settings.output.as_deref());
    format_output(&mut writer, &result, settings.format)
        .and_then(|()| writer.flush().map_err(anyhow::Error::from))
        .map_err(|e| {
            AuditError::output(
                format!("error: failed to write output: {:#}", e),
                Some(e.into()),
            )
        })
}

/// Opens the report destination, falling back to stdout when the file
/// cannot be created.
fn open_output(path: Option<&Path>) -> Box<dyn Write> {
    match path {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                warn!(
                    "unable to write to {} ({}), falling back to stdout",
                    path.display(),
                    e
                );
                Box::new(io::stdout().lock())
            }
        },
        None => Box::new(io::stdout().lock()),
    }
}
