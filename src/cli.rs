use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::process::{EnrichJob, PipelineOptions};
use crate::request::LookupConfig;
use crate::table::Sheet;
use crate::{Error, Result, BASE_URL, DEFAULT_OUTPUT, TAX_ID_COLUMN};

#[derive(Parser, Debug)]
#[command(name = "masothue", version)]
#[command(about = "Look up company details on masothue.com for every tax identifier in a table")]
pub struct Args {
    /// Input table (.csv, or .tsv for tab separated)
    pub input: PathBuf,

    /// Column holding the tax identifiers
    #[arg(long, default_value = TAX_ID_COLUMN)]
    pub column: String,

    /// Sheet name or index
    #[arg(long, default_value = "0")]
    pub sheet: Sheet,

    /// Where to write the enriched table
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Seconds to wait between requests
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub delay: f64,

    /// Seconds before a single request gives up
    #[arg(long, default_value_t = 15.0, allow_negative_numbers = true)]
    pub timeout: f64,

    /// Lookup host
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,
}

impl Args {
    pub fn into_job(self) -> Result<EnrichJob> {
        let delay = seconds("delay", self.delay)?;
        let timeout = seconds("timeout", self.timeout)?;
        if timeout.is_zero() {
            return Err(Error::InvalidDuration {
                name: "timeout",
                value: self.timeout,
            });
        }

        Ok(EnrichJob {
            input: self.input,
            sheet: self.sheet,
            column: self.column,
            output: self.output,
            options: PipelineOptions { delay, timeout },
            lookup: LookupConfig::with_base_url(self.base_url),
        })
    }
}

fn seconds(name: &'static str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| Error::InvalidDuration { name, value })
}
