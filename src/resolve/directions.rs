use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolveError;
use crate::types::geo::Coordinate;

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn directions(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, ResolveError>;
}

pub struct HttpDirections {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirections {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DirectionsProvider for HttpDirections {
    async fn directions(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, ResolveError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        );
        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status(response.status().as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ResolveError::InvalidResponse(err.to_string()))?;

        if payload.get("code").and_then(Value::as_str) == Some("NoRoute") {
            return Ok(None);
        }

        let coordinates = payload
            .get("routes")
            .and_then(Value::as_array)
            .and_then(|routes| routes.first())
            .and_then(|route| route.get("geometry"))
            .and_then(|geometry| geometry.get("coordinates"))
            .and_then(Value::as_array);

        let Some(coordinates) = coordinates else {
            return Ok(None);
        };

        let path = coordinates
            .iter()
            .filter_map(|pair| {
                let pair = pair.as_array()?;
                let lon = pair.first().and_then(Value::as_f64)?;
                let lat = pair.get(1).and_then(Value::as_f64)?;
                Some(Coordinate::new(lon, lat))
            })
            .collect();

        Ok(Some(path))
    }
}
