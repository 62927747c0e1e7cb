use crate::{
    config::JobFile,
    error::CliError,
    shutdown::{ExitCode, register_handlers},
};
use clap::Parser;
use commands::Commands;
use connectors::dynamodb::DynamoTable;
use engine::{error::CopyError, job::CopyJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};

mod commands;
mod config;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(name = "dynocopy", version = "0.1.0", about = "Cross-account table copy tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(CliError::Copy(CopyError::ShutdownRequested {
            records_read,
            records_written,
        })) => {
            warn!(
                records_read,
                records_written, "Copy interrupted before completion; re-run to finish"
            );
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Run { config } => {
            let job_file = load_job_file(&config).await?;
            run_copy(job_file).await
        }
        Commands::Validate { config } => {
            let job_file = load_job_file(&config).await?;
            output::print_effective_config(&job_file);
            Ok(ExitCode::Success)
        }
    }
}

async fn run_copy(job_file: JobFile) -> Result<ExitCode, CliError> {
    let cancel = CancellationToken::new();
    register_handlers(cancel.clone());

    info!(
        profile = %job_file.source.profile,
        region = %job_file.source.region,
        table = %job_file.source.table,
        "Connecting to source"
    );
    let source = DynamoTable::connect(&job_file.source.credential_context()).await?;

    info!(
        profile = %job_file.target.profile,
        region = %job_file.target.region,
        table = %job_file.target.table,
        "Connecting to target"
    );
    let target = DynamoTable::connect(&job_file.target.credential_context()).await?;

    let job = CopyJob::new(Arc::new(source), Arc::new(target), job_file.copy_config())
        .with_cancellation(cancel);

    let summary = job.run().await?;
    output::print_summary(&summary)?;

    if summary.is_complete() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::GeneralError)
    }
}

async fn load_job_file(path: &str) -> Result<JobFile, CliError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(JobFile::parse(&raw)?)
}
