use super::coord::ParseCoordinateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Response body is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    // The body was not the `{ "Feature": [...] }` shape we expect
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Malformed Coordinates field: {0}")]
    InvalidCoordinates(#[from] ParseCoordinateError),
}
