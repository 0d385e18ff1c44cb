use dashmap::DashMap;

use crate::types::geo::Coordinate;
use crate::types::track::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    from: [u64; 2],
    to: [u64; 2],
}

impl RouteKey {
    pub fn new(from: &Coordinate, to: &Coordinate) -> Self {
        Self {
            from: [from.lon.to_bits(), from.lat.to_bits()],
            to: [to.lon.to_bits(), to.lat.to_bits()],
        }
    }
}

// Concurrent writers for one key race; the last one wins.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    addresses: DashMap<String, Coordinate>,
    routes: DashMap<RouteKey, Route>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self, text: &str) -> Option<Coordinate> {
        self.addresses.get(text).map(|entry| *entry)
    }

    pub fn insert_address(&self, text: impl Into<String>, coordinate: Coordinate) {
        self.addresses.insert(text.into(), coordinate);
    }

    pub fn route(&self, from: &Coordinate, to: &Coordinate) -> Option<Route> {
        self.routes
            .get(&RouteKey::new(from, to))
            .map(|entry| entry.value().clone())
    }

    pub fn insert_route(&self, from: &Coordinate, to: &Coordinate, route: Route) {
        self.routes.insert(RouteKey::new(from, to), route);
    }

    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn clear(&self) {
        self.addresses.clear();
        self.routes.clear();
        tracing::info!("Resolution cache cleared");
    }
}
