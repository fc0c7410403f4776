/*!
 * Command-line interface for tsmanifest
 */

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tsmanifest::config::{Args, ScanOptions};
use tsmanifest::watch::{install_signal_handler, WatchLoop};
use tsmanifest::{ManifestBuilder, Result};

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "tsmanifest", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let options = ScanOptions::from_args(args)?;

    if args.watch {
        let session = WatchLoop::new(options).start()?;
        install_signal_handler(session.shutdown_handle())?;
        let summary = session.run();
        tracing::debug!("watch summary: {:?}", summary);
        return Ok(());
    }

    let progress = if options.verbose {
        ProgressBar::hidden()
    } else {
        spinner()
    };
    let progress = Arc::new(progress);

    let result = ManifestBuilder::new(options)
        .with_progress(Arc::clone(&progress))
        .build();
    progress.finish_and_clear();

    result.map(|_| ())
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {pos}/{len} files ({elapsed_precise})")
    {
        progress.set_style(style);
    }
    progress.set_prefix("🔍 Scanning");
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
