//! CSV ingest.
//!
//! This module turns a bookings CSV into the immutable columnar
//! `BookingTable` used by every view.
//!
//! Design goals:
//! - **Lenient schema**: absent schema columns are reported, not fatal; the
//!   views that need them fail individually later
//! - **Row-level validation** (skip rows with unparseable numbers, but report
//!   what happened)
//! - **Deterministic behavior** (no hidden randomness, stable column order)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{BookingTable, Column, Field, FieldKind};
use crate::error::AppError;

/// Cell values treated as missing.
const MISSING_TOKENS: [&str; 9] = ["", "na", "n/a", "nan", "null", "none", "<na>", "#n/a", "-nan"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what happened while building it.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub table: BookingTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Schema columns absent from the header.
    pub missing_fields: Vec<Field>,
}

/// Open and load a bookings CSV.
pub fn load_table(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let data = read_table(file)?;

    tracing::info!(
        path = %path.display(),
        rows = data.rows_used,
        skipped = data.row_errors.len(),
        "loaded bookings table"
    );
    if !data.missing_fields.is_empty() {
        let names: Vec<&str> = data.missing_fields.iter().map(|f| f.name()).collect();
        tracing::warn!("CSV is missing schema columns: {}", names.join(", "));
    }
    for err in data.row_errors.iter().take(5) {
        tracing::warn!(line = err.line, "{}", err.message);
    }

    Ok(data)
}

/// Load a bookings table from any CSV reader.
pub fn read_table<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = map_headers(&headers);
    let present: Vec<(Field, usize)> = Field::ALL
        .into_iter()
        .filter_map(|f| header_map.get(&f).map(|idx| (f, *idx)))
        .collect();
    let missing_fields: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| !header_map.contains_key(f))
        .collect();

    let mut columns: HashMap<Field, Column> = present
        .iter()
        .map(|(f, _)| {
            let empty = match f.kind() {
                FieldKind::Numeric => Column::Numeric(Vec::new()),
                FieldKind::Categorical => Column::Categorical(Vec::new()),
            };
            (*f, empty)
        })
        .collect();

    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        // Parse every cell first so a bad row never leaves columns ragged.
        let cells = match parse_row(&record, &present) {
            Ok(cells) => cells,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        for (field, cell) in cells {
            match (columns.get_mut(&field), cell) {
                (Some(Column::Numeric(values)), Cell::Number(v)) => values.push(v),
                (Some(Column::Categorical(values)), Cell::Text(v)) => values.push(v),
                _ => {}
            }
        }
        rows_used += 1;
    }

    let table = BookingTable::from_columns(rows_used, columns)
        .map_err(|e| AppError::new(4, format!("Internal ingest error: {e}")))?;

    Ok(IngestedData {
        table,
        row_errors,
        rows_read,
        rows_used,
        missing_fields,
    })
}

enum Cell {
    Number(f64),
    Text(Option<String>),
}

fn parse_row(record: &StringRecord, present: &[(Field, usize)]) -> Result<Vec<(Field, Cell)>, String> {
    let mut cells = Vec::with_capacity(present.len());
    for (field, idx) in present {
        let raw = get_cell(record, *idx);
        let cell = match field.kind() {
            FieldKind::Numeric => Cell::Number(parse_number(*field, raw)?),
            FieldKind::Categorical => Cell::Text(raw.map(str::to_string)),
        };
        cells.push((*field, cell));
    }
    Ok(cells)
}

/// Schema field -> column index. Unknown headers are ignored; a repeated header
/// maps to its last column.
fn map_headers(headers: &StringRecord) -> HashMap<Field, usize> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| Field::from_name(&normalize_header_name(name)).map(|f| (f, idx)))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the first column looks missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// A trimmed cell, or `None` when empty or a missing-value token.
fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !is_missing_token(s))
}

fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

fn parse_number(field: Field, raw: Option<&str>) -> Result<f64, String> {
    let Some(s) = raw else {
        return Ok(f64::NAN);
    };
    if field == Field::IsCanceled {
        if s.eq_ignore_ascii_case("true") {
            return Ok(1.0);
        }
        if s.eq_ignore_ascii_case("false") {
            return Ok(0.0);
        }
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{}` value '{s}'.", field.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;

    const SAMPLE: &str = "\
hotel,is_canceled,lead_time,arrival_date_year,adults,children,babies,country,customer_type,adr,stays_in_weekend_nights,stays_in_week_nights,previous_cancellations,reserved_room_type
Resort Hotel,0,342,2015,2,0,0,PRT,Transient,0,0,0,0,C
Resort Hotel,1,737,2015,2,NA,0,NULL,Transient,75,0,1,0,A
City Hotel,1,7,2015,1,0,0,GBR,Contract,98.5,0,2,1,A
";

    #[test]
    fn reads_full_schema_and_ignores_extra_columns() {
        let data = read_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 3);
        assert!(data.row_errors.is_empty());
        assert!(data.missing_fields.is_empty());
        assert_eq!(data.table.len(), 3);
        assert_eq!(data.table.numeric(Field::LeadTime).unwrap(), &[342.0, 737.0, 7.0]);
    }

    #[test]
    fn missing_tokens_become_missing_values() {
        let data = read_table(SAMPLE.as_bytes()).unwrap();
        let children = data.table.numeric(Field::Children).unwrap();
        assert!(children[1].is_nan());
        let countries = data.table.categorical(Field::Country).unwrap();
        assert_eq!(countries[1], None);
        assert_eq!(
            metrics::value_counts(&data.table, Field::Country).unwrap(),
            vec![("PRT".to_string(), 1), ("GBR".to_string(), 1)]
        );
    }

    #[test]
    fn bad_numeric_row_is_skipped_and_reported() {
        let csv = "hotel,adr,is_canceled\nCity Hotel,abc,0\nCity Hotel,80,true\n";
        let data = read_table(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 2);
        assert!(data.row_errors[0].message.contains("`adr`"));
        assert_eq!(data.table.numeric(Field::IsCanceled).unwrap(), &[1.0]);
    }

    #[test]
    fn absent_columns_are_listed_not_fatal() {
        let csv = "\u{feff}Hotel,ADR\nCity Hotel,80\n";
        let data = read_table(csv.as_bytes()).unwrap();
        assert!(data.table.has(Field::Hotel));
        assert!(data.table.has(Field::Adr));
        assert_eq!(data.missing_fields.len(), Field::ALL.len() - 2);
        assert!(data.missing_fields.contains(&Field::LeadTime));
    }

    #[test]
    fn headers_map_to_schema_fields() {
        let headers = StringRecord::from(vec!["\u{feff}HOTEL", " Lead_Time ", "arrival_date_year", "adr", "ADR"]);
        let map = map_headers(&headers);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&Field::Hotel], 0);
        assert_eq!(map[&Field::LeadTime], 1);
        assert_eq!(map[&Field::Adr], 4);
    }

    #[test]
    fn header_only_file_gives_empty_table() {
        let data = read_table("hotel,adr,is_canceled\n".as_bytes()).unwrap();
        assert!(data.table.is_empty());
        assert_eq!(
            metrics::cancellation_rate(&data.table).unwrap_err(),
            crate::error::MetricsError::EmptyTable
        );
    }

    #[test]
    fn missing_file_is_exit_code_2() {
        let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Failed to open CSV"));
    }
}
