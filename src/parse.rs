use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::request::Page;
use crate::{Error, FieldMap, Result, DISPLAY_NAME_LABEL, TAX_ID_COLUMN, URL_COLUMN};

/// Only the identifier and the source URL: the page had nothing of its own.
const MIN_USEFUL_ENTRIES: usize = 3;

/// Elements whose text never shows up on the rendered page.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parses a fetched page off the async runtime.
pub(crate) async fn parse_page(page: Page, identifier: String) -> Result<FieldMap> {
    spawn_blocking(move || parse_record(&page.html, &identifier, page.url.as_str())).await?
}

/// Extracts the flat record of a detail page.
///
/// The page has to mention `identifier` (hyphens ignored) in its visible text.
/// Every table row with exactly two cells contributes `label -> value`, the
/// first `<h1>` becomes the display name, and the first value seen for a label
/// is the one kept. Fails with `InsufficientData` when nothing beyond the
/// identifier and `source_url` could be read.
pub fn parse_record(html: &str, identifier: &str, source_url: &str) -> Result<FieldMap> {
    let doc = Html::parse_document(html);

    let page_text = visible_text(&doc)?;
    if !normalize_identifier(&page_text).contains(&normalize_identifier(identifier)) {
        return Err(Error::IdentifierNotFound(identifier.to_string()));
    }

    let heading_selector = create_selector("h1")?;
    let table_selector = create_selector("table")?;
    let row_selector = create_selector("tr")?;
    let cell_selector = create_selector("th, td")?;

    let mut fields = FieldMap::new();
    fields.insert(TAX_ID_COLUMN, identifier);
    fields.insert(URL_COLUMN, source_url);

    if let Some(heading) = doc.select(&heading_selector).next() {
        let name = element_text(heading);
        if !name.is_empty() {
            fields.insert(DISPLAY_NAME_LABEL, name);
        }
    }

    for table in doc.select(&table_selector) {
        for row in table.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();
            if let [label, value] = cells.as_slice() {
                fields.insert(element_text(*label), element_text(*value));
            }
        }
    }

    if fields.len() < MIN_USEFUL_ENTRIES {
        return Err(Error::InsufficientData(identifier.to_string()));
    }
    Ok(fields)
}

/// Drops hyphens so `03-0502-9405` and `0305029405` compare equal.
pub fn normalize_identifier(s: &str) -> String {
    s.replace('-', "")
}

/// Text nodes under `<body>`, skipping those inside script-like elements.
fn visible_text(doc: &Html) -> Result<String> {
    let body_selector = create_selector("body")?;
    let Some(body) = doc.select(&body_selector).next() else {
        return Ok(String::new());
    };

    let text = body
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|parent| {
                parent
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            })
        })
        .map(|(_, text)| &**text)
        .collect::<String>();
    Ok(text)
}

/// Text of an element with every whitespace run collapsed to a single space.
fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
