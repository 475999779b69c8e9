use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: expected name,zip_code,address but found {found} field(s)")]
    FieldCount { line: u64, found: usize },
}

/// One venue to geocode, as listed in the batch input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub name: String,
    pub zip_code: String,
    pub address: String,
}

/// A venue as listed in a resolved output file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Venue {
    pub name: String,
    #[serde(rename = "zip")]
    pub zip_code: String,
    pub address: String,
}

fn csv_reader(data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.trim_start_matches('\u{feff}').as_bytes())
}

/// Reads `name,zip_code,address` lines after a header row. Whitespace around each value is dropped.
pub fn read_input_records<P: AsRef<Path>>(path: P) -> Result<Vec<InputRecord>, RecordError> {
    parse_input_records(&fs::read_to_string(path)?)
}

pub fn parse_input_records(data: &str) -> Result<Vec<InputRecord>, RecordError> {
    let mut rdr = csv_reader(data);
    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() != 3 {
            return Err(RecordError::FieldCount {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                found: record.len(),
            });
        }
        records.push(InputRecord {
            name: record[0].to_string(),
            zip_code: record[1].to_string(),
            address: record[2].to_string(),
        });
    }
    Ok(records)
}

/// Reads the venue columns (`name,zip,address`) of a resolved output file.
pub fn read_venues<P: AsRef<Path>>(path: P) -> Result<Vec<Venue>, RecordError> {
    parse_venues(&fs::read_to_string(path)?)
}

pub fn parse_venues(data: &str) -> Result<Vec<Venue>, RecordError> {
    let mut rdr = csv_reader(data);
    let venues = rdr.deserialize().collect::<Result<Vec<Venue>, _>>()?;
    Ok(venues)
}
