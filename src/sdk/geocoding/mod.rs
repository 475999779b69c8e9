pub mod cache;
pub mod coord;
pub mod distance;
pub mod error;
pub mod memo;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{CacheError, CoordinateCache};
pub use coord::Coordinate;
pub use distance::{distance_meters, rank_by_distance, RankedVenue, UNKNOWN_DISTANCE_METERS};
pub use error::GeocodeError;
pub use memo::MemoizedGeocoder;
pub use provider::YahooGeocoder;
pub use service::Geocoder;
