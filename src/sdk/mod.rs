pub mod config;
pub mod geocoding;
pub mod pipeline;
pub mod records;
pub mod util;
