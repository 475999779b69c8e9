pub mod log;
pub mod pacing;
