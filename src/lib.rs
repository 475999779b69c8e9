pub mod sdk;

pub use sdk::config::GeocoderConfig;
pub use sdk::geocoding::{
    distance_meters, rank_by_distance, Coordinate, CoordinateCache, Geocoder, MemoizedGeocoder,
    YahooGeocoder, UNKNOWN_DISTANCE_METERS,
};
pub use sdk::pipeline::{Method, ResolutionPipeline, ResolutionResult, ResultWriter};
pub use sdk::records::{read_input_records, read_venues, InputRecord, Venue};
