use super::coord::Coordinate;
use super::error::GeocodeError;
use super::service::Geocoder;
use std::cell::RefCell;
use std::collections::HashMap;

type Memo = RefCell<HashMap<String, Option<Coordinate>>>;

/// Remembers every answered lookup for the life of the process.
///
/// Both hits and misses are kept; nothing is ever evicted. Errors are passed
/// through and not remembered, so a later call retries the network.
/// Single-threaded: the memo is not `Sync`.
pub struct MemoizedGeocoder<G> {
    inner: G,
    by_address: Memo,
    by_zip: Memo,
}

impl<G: Geocoder> MemoizedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            by_address: RefCell::new(HashMap::new()),
            by_zip: RefCell::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> G {
        self.inner
    }

    fn cached<F>(memo: &Memo, key: &str, fetch: F) -> Result<Option<Coordinate>, GeocodeError>
    where
        F: FnOnce() -> Result<Option<Coordinate>, GeocodeError>,
    {
        let hit = memo.borrow().get(key).copied();
        if let Some(hit) = hit {
            log::debug!("[CACHE HIT] {}", key);
            return Ok(hit);
        }

        // not borrowed while the inner lookup runs
        let answer = fetch()?;
        memo.borrow_mut().insert(key.to_string(), answer);
        Ok(answer)
    }
}

impl<G: Geocoder> Geocoder for MemoizedGeocoder<G> {
    fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Self::cached(&self.by_address, address, || self.inner.resolve_by_address(address))
    }

    fn resolve_by_zip(&self, zip_code: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Self::cached(&self.by_zip, zip_code, || self.inner.resolve_by_zip(zip_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::geocoding::coord::ParseCoordinateError;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingGeocoder {
        calls: Cell<usize>,
        fail: Cell<bool>,
    }

    impl Geocoder for CountingGeocoder {
        fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(ParseCoordinateError(address.to_string()).into());
            }
            Ok((address == "known").then(|| Coordinate::new(139.0, 35.0)))
        }

        fn resolve_by_zip(&self, _zip_code: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            Ok(None)
        }
    }

    #[test]
    fn repeat_lookups_hit_the_memo() {
        let memo = MemoizedGeocoder::new(CountingGeocoder::default());
        assert!(memo.resolve_by_address("known").unwrap().is_some());
        assert!(memo.resolve_by_address("known").unwrap().is_some());
        assert_eq!(memo.into_inner().calls.get(), 1);
    }

    #[test]
    fn misses_are_remembered_too() {
        let memo = MemoizedGeocoder::new(CountingGeocoder::default());
        assert_eq!(memo.resolve_by_address("nowhere").unwrap(), None);
        assert_eq!(memo.resolve_by_address("nowhere").unwrap(), None);
        assert_eq!(memo.resolve_by_zip("000-0000").unwrap(), None);
        assert_eq!(memo.resolve_by_zip("000-0000").unwrap(), None);
        assert_eq!(memo.into_inner().calls.get(), 2);
    }

    #[test]
    fn interleaved_keys_each_reach_the_network_once() {
        let memo = MemoizedGeocoder::new(CountingGeocoder::default());
        for address in ["known", "nowhere", "known", "elsewhere", "nowhere", "known"] {
            memo.resolve_by_address(address).unwrap();
        }
        assert_eq!(memo.resolve_by_address("known").unwrap(), Some(Coordinate::new(139.0, 35.0)));
        assert_eq!(memo.into_inner().calls.get(), 3);
    }

    #[test]
    fn address_and_zip_memos_are_separate() {
        let memo = MemoizedGeocoder::new(CountingGeocoder::default());
        memo.resolve_by_address("known").unwrap();
        assert_eq!(memo.resolve_by_zip("known").unwrap(), None);
        assert_eq!(memo.into_inner().calls.get(), 2);
    }

    #[test]
    fn errors_are_not_remembered() {
        let memo = MemoizedGeocoder::new(CountingGeocoder::default());
        memo.inner.fail.set(true);
        assert!(memo.resolve_by_address("known").is_err());
        memo.inner.fail.set(false);
        assert!(memo.resolve_by_address("known").unwrap().is_some());
        assert_eq!(memo.into_inner().calls.get(), 2);
    }
}
