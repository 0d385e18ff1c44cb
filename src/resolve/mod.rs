pub mod cache;
pub mod directions;
pub mod geocode;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResolveError;
use crate::pipeline::corridor::CorridorSynthesizer;
use crate::pipeline::normalize::dedupe_coordinates;
use crate::types::geo::Coordinate;
use crate::types::track::Route;

use self::cache::ResolutionCache;
use self::directions::DirectionsProvider;
use self::geocode::Geocoder;

/// Read-through access to the geocoding and directions services. Failures
/// never reach the caller: addresses come back as `None` and routes fall back
/// to corridor synthesis.
#[derive(Clone)]
pub struct Resolver {
    cache: Arc<ResolutionCache>,
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn DirectionsProvider>,
    corridor: Arc<CorridorSynthesizer>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        cache: Arc<ResolutionCache>,
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn DirectionsProvider>,
        corridor: Arc<CorridorSynthesizer>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            geocoder,
            directions,
            corridor,
            timeout,
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn corridor(&self) -> &CorridorSynthesizer {
        &self.corridor
    }

    pub async fn resolve_address(&self, text: &str) -> Option<Coordinate> {
        if let Some(hit) = self.cache.address(text) {
            tracing::debug!(address = text, "Address cache hit");
            return Some(hit);
        }

        match self.bounded(self.geocoder.geocode(text)).await {
            Ok(Some(coordinate)) => {
                self.cache.insert_address(text, coordinate);
                tracing::info!(
                    address = text,
                    lon = coordinate.lon,
                    lat = coordinate.lat,
                    "Geocoded address"
                );
                Some(coordinate)
            }
            Ok(None) => {
                tracing::warn!(address = text, "No geocoding match");
                None
            }
            Err(err) => {
                tracing::warn!(address = text, "Geocoding failed: {}", err);
                None
            }
        }
    }

    pub async fn resolve_route(&self, from: Coordinate, to: Coordinate) -> Route {
        if let Some(hit) = self.cache.route(&from, &to) {
            tracing::debug!("Route cache hit");
            return hit;
        }

        let fetched = self.bounded(self.directions.directions(&from, &to)).await;
        match fetched.map(|path| path.and_then(|path| anchored_route(from, to, path))) {
            Ok(Some(route)) => {
                self.cache.insert_route(&from, &to, route.clone());
                tracing::info!(points = route.len(), "Resolved directions");
                route
            }
            Ok(None) => {
                tracing::warn!("No directions found, synthesizing corridor");
                self.corridor.synthesize(from, to, &[])
            }
            Err(err) => {
                tracing::warn!("Directions failed ({}), synthesizing corridor", err);
                self.corridor.synthesize(from, to, &[])
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ResolveError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout.as_millis()))?
    }
}

fn anchored_route(from: Coordinate, to: Coordinate, path: Vec<Coordinate>) -> Option<Route> {
    let path: Vec<Coordinate> = path.into_iter().filter(Coordinate::is_finite).collect();
    if path.is_empty() {
        return None;
    }
    let mut anchored = Vec::with_capacity(path.len() + 2);
    anchored.push(from);
    anchored.extend(path);
    anchored.push(to);
    Route::new(dedupe_coordinates(anchored))
}
