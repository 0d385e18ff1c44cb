#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use voyageviz_rs::clock::FixedClock;
use voyageviz_rs::config::Config;
use voyageviz_rs::error::ResolveError;
use voyageviz_rs::pipeline::corridor::CorridorSynthesizer;
use voyageviz_rs::resolve::cache::ResolutionCache;
use voyageviz_rs::resolve::directions::DirectionsProvider;
use voyageviz_rs::resolve::geocode::Geocoder;
use voyageviz_rs::resolve::Resolver;
use voyageviz_rs::routes;
use voyageviz_rs::state::AppState;
use voyageviz_rs::types::geo::Coordinate;

pub const SHANGHAI: Coordinate = Coordinate::new(121.5, 31.2);
pub const FELIXSTOWE: Coordinate = Coordinate::new(1.35, 51.95);
pub const PICKUP_ADDRESS: &str = "88 Century Avenue, Shanghai";
pub const PICKUP: Coordinate = Coordinate::new(121.2, 31.0);
pub const DELIVERY_ADDRESS: &str = "1 Canada Square, London";
pub const DELIVERY: Coordinate = Coordinate::new(-0.02, 51.5);

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn test_config() -> Config {
    let mut config = Config::from_env();
    config.fetch_timeout = Duration::from_millis(500);
    config.navigation.zoom_threshold = 9.0;
    config.navigation.proximity_km = 50.0;
    config.navigation.leg_animation = Duration::from_millis(4000);
    config.playback_percent_per_second = 10.0;
    config.corridor_margin_deg = 1.0;
    config
}

/// Geocoder answering from a fixed table.
#[derive(Default)]
pub struct TableGeocoder {
    places: HashMap<String, Coordinate>,
    pub calls: AtomicUsize,
}

impl TableGeocoder {
    pub fn standard() -> Self {
        let mut places = HashMap::new();
        places.insert(PICKUP_ADDRESS.to_string(), PICKUP);
        places.insert(DELIVERY_ADDRESS.to_string(), DELIVERY);
        Self {
            places,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(address).copied())
    }
}

pub enum DirectionsBehavior {
    /// Straight road with a midpoint bend.
    Road,
    Fail,
    NoRoute,
}

/// Directions service that can be held back until the test releases it.
pub struct ScriptedDirections {
    behavior: DirectionsBehavior,
    gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl ScriptedDirections {
    pub fn new(behavior: DirectionsBehavior) -> Self {
        Self {
            behavior,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(behavior: DirectionsBehavior, gate: Arc<Notify>) -> Self {
        Self {
            behavior,
            gate: Some(gate),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectionsProvider for ScriptedDirections {
    async fn directions(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.behavior {
            DirectionsBehavior::Road => {
                let bend = Coordinate::new(from.lerp(to, 0.5).lon + 0.01, from.lerp(to, 0.5).lat);
                Ok(Some(vec![*from, bend, *to]))
            }
            DirectionsBehavior::Fail => Err(ResolveError::Status(503)),
            DirectionsBehavior::NoRoute => Ok(None),
        }
    }
}

pub fn resolver(
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn DirectionsProvider>,
    timeout: Duration,
) -> Resolver {
    Resolver::new(
        Arc::new(ResolutionCache::new()),
        geocoder,
        directions,
        Arc::new(CorridorSynthesizer::default()),
        timeout,
    )
}

/// App state with the table geocoder, a road directions service and the clock
/// pinned to 2025-01-06.
pub fn test_state() -> AppState {
    AppState::with_services(
        test_config(),
        Arc::new(TableGeocoder::standard()),
        Arc::new(ScriptedDirections::new(DirectionsBehavior::Road)),
        Arc::new(FixedClock::new(utc(2025, 1, 6))),
    )
}

pub async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = routes::router(state.clone())
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
