use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolveError;
use crate::types::geo::Coordinate;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ResolveError>;
}

pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("voyageviz-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ResolveError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status(response.status().as_u16()));
        }

        let payload: Vec<Value> = response
            .json()
            .await
            .map_err(|err| ResolveError::InvalidResponse(err.to_string()))?;

        Ok(payload.first().and_then(parse_place))
    }
}

/// Nominatim reports `lat`/`lon` as strings; some proxies send numbers.
fn parse_place(place: &Value) -> Option<Coordinate> {
    let lon = coordinate_field(place.get("lon")?)?;
    let lat = coordinate_field(place.get("lat")?)?;
    let coordinate = Coordinate::new(lon, lat);
    coordinate.is_finite().then_some(coordinate)
}

fn coordinate_field(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
