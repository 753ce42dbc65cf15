mod app;
mod cli;
mod error;
mod report;
mod results;

use clap::Parser;
use daon_batch::{CancellationToken, Phase};
use daon_client::Client;
use daon_config::Config;
use daon_import::{HttpFetcher, SourceKind};
use exn::ResultExt;
use std::io;
use std::process::ExitCode;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::Approval;
use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use crate::report::Reporter;

/// Overrides the `-v` derived filter, e.g. `DAON_LOG=daon_client=trace`.
const LOG_ENV: &str = "DAON_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args).await.map_err(|err| miette::miette!("{err:?}"))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut reporter = Reporter::new(io::stdout());
    let Some(source) = args.source() else {
        exn::bail!(ErrorKind::MissingSource);
    };
    if !source.exists() {
        reporter.source_not_found(source).or_raise(|| ErrorKind::Terminal)?;
        return Ok(ExitCode::FAILURE);
    }

    let mut config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    args.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;
    let mode = args.mode();

    let kind = match args.format {
        Some(format) => SourceKind::from(format),
        None => SourceKind::detect(source).await.or_raise(|| ErrorKind::Import(source.to_path_buf()))?,
    };
    reporter.header(source, kind, config.license, mode).or_raise(|| ErrorKind::Terminal)?;

    let fetcher = HttpFetcher::with_settings(&config.import.user_agent, config.import.fetch_timeout())
        .or_raise(|| ErrorKind::Import(source.to_path_buf()))?;
    let imported = daon_import::import(source, kind, &config.import_options(), &fetcher)
        .await
        .or_raise(|| ErrorKind::Import(source.to_path_buf()))?;

    let client = Client::http(config.client_config()).or_raise(|| ErrorKind::Client)?;
    let options = config.batch_options(mode);
    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(exit_on_second_interrupt(cancel.clone()));

    let mut phase = Phase::default();
    let mut stdin = io::stdin().lock();
    let approval = if args.yes { Approval::Granted } else { Approval::Ask(&mut stdin) };
    let outcome = app::protect(&imported, &client, &options, approval, &mut reporter, &cancel, &mut phase).await;
    interrupt.abort();

    if let Some(result) = outcome? {
        if config.results.enabled {
            let timestamp = OffsetDateTime::now_utc().unix_timestamp();
            match results::save(&config.results.directory, &result, timestamp) {
                Ok(Some(path)) => reporter.results_saved(&path).or_raise(|| ErrorKind::Terminal)?,
                Ok(None) => {},
                Err(err) => {
                    warn!(error = ?err, "Could not save results");
                    reporter.results_failed(&*err).or_raise(|| ErrorKind::Terminal)?;
                },
            }
        }
        phase.advance(Phase::Done);
    }
    info!(%phase, "Run finished");
    Ok(ExitCode::SUCCESS)
}

/// Exit status of a run killed by a second interrupt (128 + SIGINT).
const FORCED_EXIT: i32 = 130;

async fn exit_on_second_interrupt(cancel: CancellationToken) {
    if watch_interrupts(cancel, tokio::signal::ctrl_c).await == Interrupt::Forced {
        warn!("Interrupted again, exiting without waiting for the current work");
        std::process::exit(FORCED_EXIT);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Signals cannot be received; the run can only end on its own.
    Unavailable,
    /// A second interrupt arrived after the first cancelled the run.
    Forced,
}

/// The first interrupt cancels `cancel`; returns once a second one arrives.
async fn watch_interrupts<S, F>(cancel: CancellationToken, mut interrupted: S) -> Interrupt
where
    S: FnMut() -> F,
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupted().await {
        warn!(error = %e, "Cannot listen for interrupts");
        return Interrupt::Unavailable;
    }
    warn!("Interrupted, stopping after the current work (interrupt again to quit now)");
    cancel.cancel();
    match interrupted().await {
        Ok(()) => Interrupt::Forced,
        Err(_) => Interrupt::Unavailable,
    }
}
