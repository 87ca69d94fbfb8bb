use std::{path::PathBuf, time::Duration};

use chrono::Local;

use crate::merge::merge_results;
use crate::parse::parse_page;
use crate::request::{LookupClient, LookupConfig};
use crate::table::{read_table, write_table, Sheet, Table};
use crate::{info_time, warn_time, Error, FieldMap, Result};

/// What happened to a single input row.
#[derive(Debug)]
pub enum RowOutcome {
    Found(FieldMap),
    Failed { identifier: String, error: Error },
    /// Blank identifier, nothing was requested.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Pause after every attempted lookup.
    pub delay: Duration,
    /// Limit for each request.
    pub timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
        }
    }
}

/// What a pipeline run produced.
/// Every found or failed row printed one progress line, skipped rows none.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub results: Vec<FieldMap>,
    /// 1-based row position and identifier of every failed lookup.
    pub failed: Vec<(usize, String)>,
    pub skipped: usize,
}

impl PipelineReport {
    /// Number of progress lines printed.
    pub fn reported(&self) -> usize {
        self.results.len() + self.failed.len()
    }
}

/// Everything a single enrichment run needs.
#[derive(Debug, Clone)]
pub struct EnrichJob {
    pub input: PathBuf,
    pub sheet: Sheet,
    pub column: String,
    pub output: PathBuf,
    pub options: PipelineOptions,
    pub lookup: LookupConfig,
}

/// Looks up one identifier. Never fails: errors come back as `RowOutcome::Failed`.
pub async fn process_row(client: &LookupClient, raw_identifier: &str, timeout: Duration) -> RowOutcome {
    let identifier = raw_identifier.trim();
    if identifier.is_empty() {
        return RowOutcome::Skipped;
    }

    match lookup(client, identifier, timeout).await {
        Ok(fields) => RowOutcome::Found(fields),
        Err(error) => RowOutcome::Failed {
            identifier: identifier.to_string(),
            error,
        },
    }
}

async fn lookup(client: &LookupClient, identifier: &str, timeout: Duration) -> Result<FieldMap> {
    let page = client.fetch(identifier, timeout).await?;
    parse_page(page, identifier.to_string()).await
}

/// Looks up every identifier in order, one request at a time, pausing
/// `options.delay` after each attempt.
/// Fails with `NoResults` if no lookup succeeded.
pub async fn run_pipeline<S: AsRef<str>>(
    client: &LookupClient,
    identifiers: &[S],
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    let start_time = Local::now();
    let total = identifiers.len();
    let mut report = PipelineReport::default();

    for (idx, raw) in identifiers.iter().enumerate() {
        let pos = idx + 1;
        match process_row(client, raw.as_ref(), options.timeout).await {
            RowOutcome::Skipped => {
                report.skipped += 1;
                continue;
            }
            RowOutcome::Found(fields) => {
                info_time!(
                    "[{}/{}] OK {} -> {}",
                    pos,
                    total,
                    fields.identifier().unwrap_or_default(),
                    fields.display_name().unwrap_or_default()
                );
                report.results.push(fields);
            }
            RowOutcome::Failed { identifier, error } => {
                warn_time!("[{}/{}] FAILED {}: {}", pos, total, identifier, error);
                report.failed.push((pos, identifier));
            }
        }
        tokio::time::sleep(options.delay).await;
    }

    info_time!(
        start_time,
        "Looked up {} rows: {} found, {} failed, {} skipped.",
        total,
        report.results.len(),
        report.failed.len(),
        report.skipped
    );

    if report.results.is_empty() {
        return Err(Error::NoResults);
    }
    Ok(report)
}

/// Reads the input table, looks up its identifiers, and writes the merged table.
/// Nothing is written if the run fails.
pub async fn enrich_file(job: &EnrichJob) -> Result<Table> {
    let table = read_table(&job.input, &job.sheet)?;
    let identifiers = table.column(&job.column)?;
    info_time!(
        "Read {} rows from {}",
        table.len(),
        job.input.display()
    );

    let client = LookupClient::new(job.lookup.clone());
    let report = run_pipeline(&client, &identifiers, &job.options).await?;

    let merged = merge_results(&table, &job.column, &report.results)?;
    let local_now = Local::now();
    write_table(&merged, &job.output)?;
    info_time!(local_now, "Saved results to {}", job.output.display());

    Ok(merged)
}
