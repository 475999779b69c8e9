use crate::sdk::config::GeocoderConfig;
use crate::sdk::geocoding::coord::Coordinate;
use crate::sdk::geocoding::error::GeocodeError;
use crate::sdk::geocoding::service::Geocoder;
use crate::sdk::geocoding::types::parse_first_coordinate_bytes;
use reqwest::blocking::Client;

/// Blocking client for the Yahoo! geocoder and postal-code search APIs.
pub struct YahooGeocoder {
    client: Client,
    config: GeocoderConfig,
}

impl YahooGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: GeocoderConfig, client: Client) -> Self {
        Self { client, config }
    }

    fn lookup(&self, url: &str, params: &[(&str, &str)]) -> Result<Option<Coordinate>, GeocodeError> {
        let query = params
            .iter()
            .find(|(name, _)| *name == "query")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        log::debug!("[PROVIDER] GET {} query=\"{}\"", url, query);

        let response = self
            .client
            .get(url)
            .query(&[("appid", self.config.api_key.as_str())])
            .query(params)
            .send()?;
        let status = response.status();

        if !status.is_success() {
            log::info!(
                "Lookup for \"{}\" returned status {}, treating as no result",
                query,
                status
            );
            if log::log_enabled!(log::Level::Debug) {
                // a broken error body is still just a miss
                let text = response.text().unwrap_or_default();
                log::debug!("Body: {}", text);
            }
            return Ok(None);
        }

        let body = response.bytes()?;
        parse_first_coordinate_bytes(&body).map_err(|e| {
            log::error!(
                "Failed to parse lookup response. URL: {}\nError: {}. Body: {}",
                url,
                e,
                String::from_utf8_lossy(&body)
            );
            e
        })
    }
}

impl Geocoder for YahooGeocoder {
    fn resolve_by_address(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.lookup(
            &self.config.geocoder_url,
            &[
                ("query", address),
                ("output", "json"),
                ("recursive", "true"),
            ],
        )
    }

    fn resolve_by_zip(&self, zip_code: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.lookup(
            &self.config.zip_search_url,
            &[
                ("query", zip_code),
                ("ac", "JP"),
                ("zkind", "0,1,2,3"),
                ("output", "json"),
                ("recursive", "true"),
            ],
        )
    }
}
