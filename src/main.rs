use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use masothue::{cli::Args, info_time, process::enrich_file, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let start_time = Local::now();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(_) => {
            info_time!(start_time, "Full program time:");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let job = args.into_job()?;
    enrich_file(&job).await?;
    Ok(())
}
