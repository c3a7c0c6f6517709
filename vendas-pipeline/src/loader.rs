//! Spreadsheet and CSV ingestion.
//!
//! Both loaders produce the same raw [`Table`]: the first row becomes the
//! header row and every other row is kept verbatim as cells. No schema is
//! assumed here; column meaning is decided later by the resolver.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{PipelineError, PipelineResult};
use crate::table::{Cell, Table};

/// Load a file, dispatching on its extension.
pub fn load_file(path: impl AsRef<Path>) -> PipelineResult<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xls" => load_spreadsheet(path),
        "csv" => {
            let file = File::open(path)?;
            load_csv(file)
        }
        other => Err(PipelineError::UnsupportedFormat(other.to_string())),
    }
}

/// Load the first sheet of an Excel workbook.
pub fn load_spreadsheet(path: &Path) -> PipelineResult<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .unwrap_or_default();
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }
    Ok(table)
}

/// Load a CSV with a header row. Fields are trimmed; blank fields become
/// empty cells. Every field is kept as text, the way the file gave it.
pub fn load_csv<R: Read>(reader: R) -> PipelineResult<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = Table::new(headers);
    for result in csv_reader.records() {
        let record = result?;
        table.push_row(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}

fn header_text(value: &Data) -> String {
    match value {
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Empty => String::new(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value.as_f64().to_string(),
        Data::Error(err) => format!("{err:?}"),
    }
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Bool(value) => Cell::Bool(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::String(text) => Cell::Text(text.clone()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(err) => Cell::Text(format!("{err:?}")),
    }
}
