use super::coord::Coordinate;
use super::error::GeocodeError;
use serde::Deserialize;

// --- Yahoo! Open Local Platform response shape, shared by the geocoder and zip search ---

#[derive(Deserialize, Debug)]
pub struct FeatureResponse {
    #[serde(rename = "Feature", default)]
    pub features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
pub struct Feature {
    #[serde(rename = "Geometry", default)]
    pub geometry: Option<Geometry>,
}

#[derive(Deserialize, Debug)]
pub struct Geometry {
    #[serde(rename = "Coordinates", default)]
    pub coordinates: Option<String>,
}

impl FeatureResponse {
    /// Coordinate of the first feature, if the service found one.
    pub fn first_coordinate(&self) -> Result<Option<Coordinate>, GeocodeError> {
        let raw = self
            .features
            .first()
            .and_then(|feature| feature.geometry.as_ref())
            .and_then(|geometry| geometry.coordinates.as_deref())
            .filter(|raw| !raw.trim().is_empty());

        match raw {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }
}

/// Decodes a response body into the first coordinate it carries.
pub fn parse_first_coordinate(body: &str) -> Result<Option<Coordinate>, GeocodeError> {
    let response: FeatureResponse = serde_json::from_str(body)?;
    response.first_coordinate()
}

/// Like [`parse_first_coordinate`], but rejects a body that is not valid UTF-8
/// anywhere, including fields we otherwise skip.
pub fn parse_first_coordinate_bytes(body: &[u8]) -> Result<Option<Coordinate>, GeocodeError> {
    parse_first_coordinate(std::str::from_utf8(body)?)
}
