use super::cache::CoordinateCache;
use super::coord::Coordinate;
use crate::sdk::records::Venue;

/// Distance reported for venues whose address never resolved. Larger than
/// any distance on Earth, so they sort last.
pub const UNKNOWN_DISTANCE_METERS: u64 = 999_999_999;

/// How many venues the nearby query shows by default.
pub const DEFAULT_NEARBY_LIMIT: usize = 50;

/// Whole metres from `origin` to the cached position of `target_address`.
pub fn distance_meters(origin: Coordinate, target_address: &str, cache: &CoordinateCache) -> u64 {
    match cache.get(target_address) {
        // truncation, not rounding
        Some(target) => origin.geodesic_distance(&target) as u64,
        None => UNKNOWN_DISTANCE_METERS,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedVenue<'a> {
    pub venue: &'a Venue,
    pub distance_m: u64,
}

impl RankedVenue<'_> {
    pub fn is_known(&self) -> bool {
        self.distance_m != UNKNOWN_DISTANCE_METERS
    }
}

/// Nearest `limit` venues to `origin`, closest first. Ties keep input order.
pub fn rank_by_distance<'a>(
    origin: Coordinate,
    venues: &'a [Venue],
    cache: &CoordinateCache,
    limit: usize,
) -> Vec<RankedVenue<'a>> {
    let mut ranked: Vec<RankedVenue<'a>> = venues
        .iter()
        .map(|venue| RankedVenue {
            venue,
            distance_m: distance_meters(origin, &venue.address, cache),
        })
        .collect();
    ranked.sort_by_key(|r| r.distance_m);
    ranked.truncate(limit);
    ranked
}
