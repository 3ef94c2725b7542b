//! CSV corpus loading
//!
//! The corpus is a CSV file with a header row. The columns `Article`,
//! `Date`, `Heading` and `NewsType` are required, in any order; others are
//! ignored. Row order assigns document ids.

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use super::document::Document;
use crate::error::{Result, SearchError};

pub const COL_ARTICLE: &str = "Article";
pub const COL_DATE: &str = "Date";
pub const COL_HEADING: &str = "Heading";
pub const COL_NEWS_TYPE: &str = "NewsType";

pub const REQUIRED_COLUMNS: [&str; 4] = [COL_ARTICLE, COL_DATE, COL_HEADING, COL_NEWS_TYPE];

/// Load documents from a CSV file on disk
pub fn load_csv(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)?;
    let text = decode_text(bytes);
    let documents = read_csv(text.as_bytes())?;

    info!(
        path = %path.display(),
        documents = documents.len(),
        "Loaded corpus"
    );
    Ok(documents)
}

/// Parse documents from CSV data
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Document>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| column(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(SearchError::schema(format!(
            "corpus needs columns {}; missing: {}",
            REQUIRED_COLUMNS.join(", "),
            missing.join(", ")
        )));
    }

    // All present, checked above
    let idx = |name: &str| column(name).unwrap_or_default();
    let (article, date, heading, news_type) = (
        idx(COL_ARTICLE),
        idx(COL_DATE),
        idx(COL_HEADING),
        idx(COL_NEWS_TYPE),
    );

    let mut documents = Vec::new();
    for (id, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        documents.push(Document::new(
            id,
            cell(article),
            cell(date),
            cell(heading),
            cell(news_type),
        ));
    }

    debug!(rows = documents.len(), columns = headers.len(), "Parsed CSV");
    Ok(documents)
}

/// UTF-8 when valid, Latin-1 otherwise
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("Corpus is not valid UTF-8, decoding as Latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}
