mod colors;
mod config;
mod labels;
mod mongo;
mod nickname;
mod normalizer;
mod output;
mod report;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::colors::ColorTable;
use crate::config::Config;
use crate::mongo::MongoStore;
use crate::normalizer::RunOptions;
use crate::report::RunReport;
use crate::store::SessionStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Classify records without writing anything back
    #[arg(long, global = true)]
    dry_run: bool,

    /// Stop at the first failed update instead of reporting and moving on
    #[arg(long, global = true)]
    abort_on_error: bool,

    #[arg(short, long, global = true, default_value = "stdout")]
    output: String,

    /// Color table tried before the built-in locations
    #[arg(long, global = true)]
    color_table: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Translate English emotion labels on diary sessions to Korean
    Emotions,
    /// Generate nicknames for users that have none
    Nicknames,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(report) if report.aborted => {
            error!("migration aborted after a failed update");
            ExitCode::FAILURE
        }
        Ok(report) if !report.succeeded() => {
            error!(failed = report.failed.len(), "migration finished with failed updates");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("migration failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// A run with everything resolved that can be rejected without touching the store.
struct Job {
    command: Command,
    opts: RunOptions,
    color_table: ColorTable,
    writer: output::Writer,
}

impl Job {
    fn prepare(args: &Args, config: &Config, cwd: &Path) -> Result<Self> {
        let writer = output::create_writer(&args.output).context("invalid --output")?;

        let color_table = match args.command {
            Command::Emotions => {
                let candidates = colors::candidates(
                    &[args.color_table.clone(), config.color_table_path.clone()],
                    cwd,
                );
                let load = colors::load(&candidates)?;
                if load.source.is_none() {
                    info!(tried = ?load.tried, "color table fallback in use");
                }
                load.table
            }
            Command::Nicknames => ColorTable::new(),
        };

        Ok(Self {
            command: args.command,
            opts: RunOptions {
                dry_run: args.dry_run,
                abort_on_error: args.abort_on_error,
            },
            color_table,
            writer,
        })
    }
}

async fn run(args: &Args) -> Result<RunReport> {
    let config = Config::from_env().context("invalid configuration")?;
    let cwd = std::env::current_dir().context("cannot resolve working directory")?;
    let job = Job::prepare(args, &config, &cwd)?;

    let store = MongoStore::connect(&config).await?;
    execute(&store, job).await
}

/// Runs the job against an open store, closes it, then writes the report.
async fn execute(store: &dyn SessionStore, job: Job) -> Result<RunReport> {
    let result = match job.command {
        Command::Emotions => {
            normalizer::normalize_emotions(store, &job.color_table, job.opts).await
        }
        Command::Nicknames => {
            let mut rng = StdRng::from_entropy();
            nickname::normalize_nicknames(store, &mut rng, job.opts).await
        }
    };
    store.close().await;

    let report = result.context("snapshot query failed")?;
    info!(
        transformed = report.transformed,
        unmapped = report.unmapped.len(),
        failed = report.failed.len(),
        "run complete"
    );
    let mut writer = job.writer;
    writer.write_report(&report)?;
    writer.finish()?;
    Ok(report)
}
