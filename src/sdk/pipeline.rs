// Batch resolution of venue addresses to coordinates
use std::{
    fmt,
    fs::File,
    io::{self, Write},
    path::Path,
};

use serde::Serialize;
use thiserror::Error;

use super::{
    geocoding::{Coordinate, CoordinateCache, GeocodeError, Geocoder},
    records::InputRecord,
    util::pacing::Pacing,
};

pub const OUTPUT_HEADER: [&str; 6] = ["name", "zip", "address", "longitude", "latitude", "method"];

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Lookup failed for record {index} (\"{address}\"): {source}")]
    Lookup {
        index: usize,
        address: String,
        #[source]
        source: GeocodeError,
    },

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write output row: {0}")]
    Csv(#[from] csv::Error),
}

/// Which lookup produced the coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Geocoding,
    ZipCode,
    Failure,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Geocoding => "geocoding",
            Method::ZipCode => "zip_code",
            Method::Failure => "failure",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub record: InputRecord,
    pub coordinate: Option<Coordinate>,
    pub method: Method,
}

#[derive(Serialize)]
struct OutputRow<'a> {
    name: &'a str,
    zip: &'a str,
    address: &'a str,
    longitude: Option<f64>,
    latitude: Option<f64>,
    method: &'static str,
}

/// Streams results to CSV, flushing after every row.
pub struct ResultWriter<W: Write> {
    wtr: csv::Writer<W>,
}

impl ResultWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> ResultWriter<W> {
    /// Writes the UTF-8 BOM and the bare header row straight away. Rows that
    /// follow quote every text field and leave numbers bare.
    pub fn new(mut inner: W) -> Result<Self, PipelineError> {
        inner.write_all("\u{feff}".as_bytes())?;
        let mut header = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        header.write_record(OUTPUT_HEADER)?;
        let inner = header
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(inner);
        wtr.flush()?;
        Ok(Self { wtr })
    }

    pub fn write(&mut self, result: &ResolutionResult) -> Result<(), PipelineError> {
        self.wtr.serialize(OutputRow {
            name: &result.record.name,
            zip: &result.record.zip_code,
            address: &result.record.address,
            longitude: result.coordinate.map(|c| c.longitude),
            latitude: result.coordinate.map(|c| c.latitude),
            method: result.method.as_str(),
        })?;
        self.wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, PipelineError> {
        self.wtr
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<ResolutionResult>,
    pub geocoded: usize,
    pub by_zip_code: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, result: ResolutionResult) {
        match result.method {
            Method::Geocoding => self.geocoded += 1,
            Method::ZipCode => self.by_zip_code += 1,
            Method::Failure => self.failed += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Cache of every resolved address; failures are left out.
    pub fn coordinate_cache(&self) -> CoordinateCache {
        self.results
            .iter()
            .filter_map(|r| r.coordinate.map(|c| (r.record.address.as_str(), c)))
            .collect()
    }
}

/// Resolves records one at a time: address geocoding first, postal code second.
pub struct ResolutionPipeline<G, P> {
    geocoder: G,
    pacing: P,
}

impl<G: Geocoder, P: Pacing> ResolutionPipeline<G, P> {
    pub fn new(geocoder: G, pacing: P) -> Self {
        Self { geocoder, pacing }
    }

    pub fn resolve(&self, record: &InputRecord) -> Result<ResolutionResult, GeocodeError> {
        let (coordinate, method) =
            if let Some(coord) = self.geocoder.resolve_by_address(&record.address)? {
                (Some(coord), Method::Geocoding)
            } else if let Some(coord) = self.geocoder.resolve_by_zip(&record.zip_code)? {
                (Some(coord), Method::ZipCode)
            } else {
                (None, Method::Failure)
            };

        Ok(ResolutionResult {
            record: record.clone(),
            coordinate,
            method,
        })
    }

    /// Writes exactly one row per record, in input order. A lookup error stops
    /// the run; rows already written are left in place.
    pub fn run<W: Write>(
        &mut self,
        records: &[InputRecord],
        sink: &mut ResultWriter<W>,
    ) -> Result<RunSummary, PipelineError> {
        let total = records.len();
        let mut summary = RunSummary::default();

        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                self.pacing.pause();
            }

            let result = self.resolve(record).map_err(|source| PipelineError::Lookup {
                index: i + 1,
                address: record.address.clone(),
                source,
            })?;
            sink.write(&result)?;

            match result.coordinate {
                Some(coord) => log::info!(
                    "[{}/{}] {} \"{}\" -> {} ({})",
                    i + 1,
                    total,
                    record.name,
                    record.address,
                    coord,
                    result.method
                ),
                None => log::warn!(
                    "[{}/{}] {} \"{}\" could not be resolved",
                    i + 1,
                    total,
                    record.name,
                    record.address
                ),
            }
            summary.record(result);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::geocoding::coord::ParseCoordinateError;
    use crate::sdk::util::pacing::NoDelay;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Canned answers keyed by query; anything listed in `broken` fails to decode.
    #[derive(Default)]
    struct FakeGeocoder {
        addresses: HashMap<String, Coordinate>,
        zips: HashMap<String, Coordinate>,
        broken: Vec<String>,
        calls: Cell<usize>,
    }

    impl FakeGeocoder {
        fn answer(&self, table: &HashMap<String, Coordinate>, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            if self.broken.iter().any(|b| b == query) {
                return Err(ParseCoordinateError(query.to_string()).into());
            }
            Ok(table.get(query).copied())
        }
    }

    impl Geocoder for FakeGeocoder {
        fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.answer(&self.addresses, address)
        }

        fn resolve_by_zip(&self, zip_code: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.answer(&self.zips, zip_code)
        }
    }

    struct CountingPacing(usize);

    impl Pacing for CountingPacing {
        fn pause(&mut self) {
            self.0 += 1;
        }
    }

    fn record(name: &str, zip_code: &str, address: &str) -> InputRecord {
        InputRecord {
            name: name.into(),
            zip_code: zip_code.into(),
            address: address.into(),
        }
    }

    fn output_rows(bytes: &[u8]) -> Vec<Vec<String>> {
        let text = std::str::from_utf8(bytes).unwrap();
        assert!(text.starts_with('\u{feff}'));
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        rdr.records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn geocoding_hit_is_tagged_geocoding() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .addresses
            .insert("Tokyo Chiyoda".into(), Coordinate::new(139.75, 35.68));
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let summary = pipeline
            .run(&[record("Taro", "100-0001", "Tokyo Chiyoda")], &mut sink)
            .unwrap();

        assert_eq!(summary.geocoded, 1);
        assert_eq!(summary.results[0].method, Method::Geocoding);
        assert_eq!(summary.results[0].coordinate, Some(Coordinate::new(139.75, 35.68)));
        // no fallback call once the address resolved
        assert_eq!(geocoder.calls.get(), 1);

        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows[0], OUTPUT_HEADER);
        assert_eq!(
            rows[1],
            ["Taro", "100-0001", "Tokyo Chiyoda", "139.75", "35.68", "geocoding"]
        );
    }

    #[test]
    fn text_fields_are_quoted_and_numbers_bare() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .addresses
            .insert("Tokyo Chiyoda".into(), Coordinate::new(139.75, 35.68));
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        pipeline
            .run(&[record("Taro", "100-0001", "Tokyo Chiyoda")], &mut sink)
            .unwrap();

        let bytes = sink.into_inner().unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], "name,zip,address,longitude,latitude,method");
        assert!(lines[1].starts_with(r#""Taro","100-0001","Tokyo Chiyoda",139.75,35.68,"#));
    }

    #[test]
    fn falls_back_to_zip_code() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .zips
            .insert("100-0001".into(), Coordinate::new(139.70, 35.69));
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let summary = pipeline
            .run(&[record("Taro", "100-0001", "Tokyo Chiyoda")], &mut sink)
            .unwrap();

        assert_eq!(summary.by_zip_code, 1);
        assert_eq!(summary.results[0].method, Method::ZipCode);
        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows[1], ["Taro", "100-0001", "Tokyo Chiyoda", "139.7", "35.69", "zip_code"]);
    }

    #[test]
    fn both_misses_write_an_empty_coordinate() {
        let geocoder = FakeGeocoder::default();
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let summary = pipeline
            .run(&[record("Taro", "100-0001", "Tokyo Chiyoda")], &mut sink)
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[0].coordinate, None);
        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows[1], ["Taro", "100-0001", "Tokyo Chiyoda", "", "", "failure"]);
    }

    #[test]
    fn one_row_per_record_in_input_order() {
        let mut geocoder = FakeGeocoder::default();
        geocoder.addresses.insert("a".into(), Coordinate::new(1.0, 1.0));
        geocoder.zips.insert("200".into(), Coordinate::new(2.0, 2.0));
        let records = vec![
            record("first", "100", "a"),
            record("second", "200", "b"),
            record("third", "300", "c"),
            record("first", "100", "a"),
        ];
        let mut pipeline = ResolutionPipeline::new(&geocoder, CountingPacing(0));
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let summary = pipeline.run(&records, &mut sink).unwrap();
        assert_eq!(summary.total(), records.len());
        assert_eq!((summary.geocoded, summary.by_zip_code, summary.failed), (2, 1, 1));
        // paced between records, not after the last one
        assert_eq!(pipeline.pacing.0, 3);

        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows.len(), records.len() + 1);
        let names: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, ["first", "second", "third", "first"]);
        let methods: Vec<&str> = rows[1..].iter().map(|r| r[5].as_str()).collect();
        assert_eq!(methods, ["geocoding", "zip_code", "failure", "geocoding"]);
    }

    #[test]
    fn lookup_error_aborts_but_keeps_written_prefix() {
        let mut geocoder = FakeGeocoder::default();
        geocoder.addresses.insert("a".into(), Coordinate::new(1.0, 1.0));
        geocoder.broken.push("b".into());
        let records = vec![
            record("ok", "100", "a"),
            record("bad", "200", "b"),
            record("never", "300", "c"),
        ];
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let err = pipeline.run(&records, &mut sink).unwrap_err();
        match err {
            PipelineError::Lookup { index, address, .. } => {
                assert_eq!(index, 2);
                assert_eq!(address, "b");
            }
            other => panic!("expected lookup error, got {:?}", other),
        }

        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "ok");
    }

    #[test]
    fn rows_are_flushed_to_disk_as_they_are_written() {
        let mut geocoder = FakeGeocoder::default();
        geocoder.addresses.insert("a".into(), Coordinate::new(1.0, 1.0));
        geocoder.broken.push("b".into());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("address_out.csv");

        let mut sink = ResultWriter::create(&path).unwrap();
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let records = vec![record("ok", "100", "a"), record("bad", "200", "b")];
        assert!(pipeline.run(&records, &mut sink).is_err());

        // read while the writer is still alive
        let on_disk = std::fs::read(&path).unwrap();
        let rows = output_rows(&on_disk);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][5], "geocoding");
        drop(sink);
    }

    #[test]
    fn empty_input_still_writes_header() {
        let geocoder = FakeGeocoder::default();
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let summary = pipeline.run(&[], &mut sink).unwrap();
        assert_eq!(summary.total(), 0);
        let rows = output_rows(&sink.into_inner().unwrap());
        assert_eq!(rows, vec![OUTPUT_HEADER.to_vec()]);
    }

    #[test]
    fn cache_holds_only_resolved_addresses() {
        let mut geocoder = FakeGeocoder::default();
        geocoder.addresses.insert("a".into(), Coordinate::new(1.0, 1.0));
        geocoder.zips.insert("200".into(), Coordinate::new(2.0, 2.0));
        let records = vec![
            record("x", "100", "a"),
            record("y", "200", "b"),
            record("z", "300", "c"),
        ];
        let mut pipeline = ResolutionPipeline::new(&geocoder, NoDelay);
        let mut sink = ResultWriter::new(Vec::new()).unwrap();

        let cache = pipeline.run(&records, &mut sink).unwrap().coordinate_cache();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(cache.get("b"), Some(Coordinate::new(2.0, 2.0)));
        assert_eq!(cache.get("c"), None);
    }
}
