use std::thread;
use std::time::Duration;

/// Delay the geocoder asks for between consecutive batch requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Called by the batch pipeline between two records.
pub trait Pacing {
    fn pause(&mut self);
}

/// Sleeps the current thread for a fixed period.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_REQUEST_DELAY)
    }
}

impl Pacing for FixedDelay {
    fn pause(&mut self) {
        if !self.0.is_zero() {
            log::debug!("Sleeping {:?} before next request", self.0);
            thread::sleep(self.0);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacing for NoDelay {
    fn pause(&mut self) {}
}
