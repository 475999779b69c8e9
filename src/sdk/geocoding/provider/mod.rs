pub mod yahoo;

pub use yahoo::YahooGeocoder;
