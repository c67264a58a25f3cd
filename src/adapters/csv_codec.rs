// CSV/TSV read and write for lead tables

use crate::domain::model::Table;
use crate::utils::error::{LeadError, Result};
use std::collections::HashSet;
use std::path::Path;

/// `.tsv` paths are tab-delimited, everything else is comma-delimited.
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

/// Parses decoded text with a header row.
///
/// Short rows are padded with empty cells; rows wider than the header are rejected
/// since there is no column to put the extra cells in. Blank lines are skipped.
pub fn parse_table(name: &str, text: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(LeadError::DuplicateColumnError {
                column: header.clone(),
                input: name.to_string(),
            });
        }
    }

    let mut table = Table::new(name, headers);
    let width = table.headers.len();

    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            return Err(LeadError::MalformedRowError {
                input: name.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                reason: format!("expected at most {} fields, found {}", width, record.len()),
            });
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        table.rows.push(row);
    }

    tracing::debug!(
        "Parsed {} rows x {} columns from {}",
        table.rows.len(),
        width,
        name
    );
    Ok(table)
}

/// Serializes a table (header row first) into UTF-8 bytes.
pub fn write_table(table: &Table, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| LeadError::IoError(e.into_error()))
}
