use super::coord::Coordinate;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, io, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to access coordinate cache: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid coordinate cache row: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Serialize, Deserialize)]
struct CacheRow {
    address: String,
    longitude: f64,
    latitude: f64,
}

/// Address → coordinate table shared between the batch run and nearby queries.
///
/// Keys match exactly as written by the batch run. Loaded once and read-only
/// afterwards; reloading rebuilds the whole table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateCache {
    coordinates: HashMap<String, Coordinate>,
}

impl CoordinateCache {
    /// Reads an `address,longitude,latitude` CSV. Extra columns are ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let data = fs::read_to_string(path)?;
        Self::from_csv(&data)
    }

    pub fn from_csv(data: &str) -> Result<Self, CacheError> {
        let data = data.trim_start_matches('\u{feff}');
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());

        let mut cache = Self::default();
        for row in rdr.deserialize() {
            let row: CacheRow = row?;
            cache.insert(&row.address, Coordinate::new(row.longitude, row.latitude));
        }
        Ok(cache)
    }

    /// Writes the table sorted by address so reruns produce stable files.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CacheError> {
        let mut wtr = csv::Writer::from_path(path)?;
        let mut rows: Vec<(&String, &Coordinate)> = self.coordinates.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        for (address, coord) in rows {
            wtr.serialize(CacheRow {
                address: address.clone(),
                longitude: coord.longitude,
                latitude: coord.latitude,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<Coordinate> {
        self.coordinates.get(address).copied()
    }

    pub fn insert(&mut self, address: &str, coord: Coordinate) {
        self.coordinates.insert(address.to_string(), coord);
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, Coordinate)> for CoordinateCache {
    fn from_iter<I: IntoIterator<Item = (&'a str, Coordinate)>>(iter: I) -> Self {
        let mut cache = Self::default();
        for (address, coord) in iter {
            cache.insert(address, coord);
        }
        cache
    }
}
