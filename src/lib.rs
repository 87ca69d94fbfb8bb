//! MASOTHUE ENRICHER
//! Looks up every tax identifier of a table on masothue.com and writes the
//! table back out with the company details appended to each row.

pub mod cli;
mod error;
pub mod fields;
mod macros;
pub mod merge;
pub mod parse;
pub mod process;
pub mod request;
pub mod table;

pub use error::{Error, Result};
pub use fields::FieldMap;

pub const BASE_URL: &str = "https://masothue.com";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/120.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9";

/// Column holding the identifiers, and the field every lookup result carries its identifier in.
pub const TAX_ID_COLUMN: &str = "tax_id";
/// Field holding the final URL a result was read from.
pub const URL_COLUMN: &str = "masothue_url";
/// Field holding the page heading.
pub const DISPLAY_NAME_LABEL: &str = "Tên doanh nghiệp";

pub const DEFAULT_OUTPUT: &str = "masothue_results.xlsx";
