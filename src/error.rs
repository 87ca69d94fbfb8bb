use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Identifier is empty.")]
    EmptyIdentifier,

    #[error("Couldn't load {url} (HTTP {status})")]
    Http { status: u16, url: String },

    #[error("Page doesn't mention identifier {0}.")]
    IdentifierNotFound(String),

    #[error("No useful data found for identifier {0}.")]
    InsufficientData(String),

    #[error("No lookup succeeded. Check the identifier list.")]
    NoResults,

    #[error("Column '{column}' not found in input. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Sheet '{sheet}' not found in {path}")]
    SheetNotFound { sheet: String, path: String },

    #[error("Line {line} has {found} cells but the header has {expected}")]
    RaggedRow {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("Can't write {0}: only .xlsx, .csv and .tsv outputs are supported")]
    UnsupportedFormat(String),

    #[error("Invalid {name}: {value} seconds")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook Error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook Write Error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
