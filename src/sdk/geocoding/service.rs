use super::coord::Coordinate;
use super::error::GeocodeError;

/// The two lookups the resolution pipeline falls back between.
///
/// `Ok(None)` means the service answered but had no match; `Err` is reserved
/// for failures the caller must not silently skip.
pub trait Geocoder {
    /// Geocodes a free-text address.
    fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;

    /// Resolves a Japanese postal code to the centre of its area.
    fn resolve_by_zip(&self, zip_code: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        (**self).resolve_by_address(address)
    }

    fn resolve_by_zip(&self, zip_code: &str) -> Result<Option<Coordinate>, GeocodeError> {
        (**self).resolve_by_zip(zip_code)
    }
}
