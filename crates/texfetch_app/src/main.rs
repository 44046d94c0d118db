mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use texfetch_engine::{
    DesktopViewer, Pipeline, PipelineError, ReqwestFetcher, RunOutcome, SystemRunner,
};
use texfetch_logging::{level_for, tf_error, tf_info};

use cli::Cli;
use logging::LogDestination;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(
        LogDestination::from_option(cli.log_file.clone()),
        level_for(cli.verbose),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let pipeline = Pipeline::new(
        cli.pipeline_options(),
        Box::new(ReqwestFetcher::new(cli.fetch_settings())),
        Box::new(SystemRunner::new(cli.verbose)),
        Box::new(DesktopViewer),
    );

    let result = runtime.block_on(pipeline.run(&cli.tag, cli.compiler()));
    Ok(if report(&cli.tag, result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs how the run ended; `false` means the process must exit non-zero.
fn report(tag: &str, result: Result<RunOutcome, PipelineError>) -> bool {
    match result {
        Ok(RunOutcome::Built(pdf)) => {
            tf_info!("{}", pdf.display());
            true
        }
        Ok(RunOutcome::Withdrawn) => true,
        Err(err) => {
            tf_error!("{tag}: {err}");
            false
        }
    }
}
