use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ResolveError;
use crate::pipeline::corridor::CorridorSynthesizer;
use crate::resolve::cache::ResolutionCache;
use crate::resolve::directions::{DirectionsProvider, HttpDirections};
use crate::resolve::geocode::{Geocoder, HttpGeocoder};
use crate::resolve::Resolver;
use crate::session::VoyageSession;

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<DashMap<String, CachedSession>>,
    resolver: Resolver,
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
}

struct CachedSession {
    session: Arc<VoyageSession>,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ResolveError> {
        let geocoder = HttpGeocoder::new(config.geocoder_url.clone(), config.fetch_timeout)?;
        let directions = HttpDirections::new(config.directions_url.clone(), config.fetch_timeout)?;
        Ok(Self::with_services(
            config,
            Arc::new(geocoder),
            Arc::new(directions),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_services(
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn DirectionsProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let corridor = CorridorSynthesizer::default().with_margin(config.corridor_margin_deg);
        let resolver = Resolver::new(
            Arc::new(ResolutionCache::new()),
            geocoder,
            directions,
            Arc::new(corridor),
            config.fetch_timeout,
        );
        Self {
            sessions: Arc::new(DashMap::new()),
            resolver,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn insert(&self, session: VoyageSession) -> Arc<VoyageSession> {
        let session = Arc::new(session);
        self.sessions.insert(
            session.id().to_string(),
            CachedSession {
                session: session.clone(),
                inserted_at: Instant::now(),
            },
        );
        session
    }

    pub fn get(&self, voyage_id: &str) -> Option<Arc<VoyageSession>> {
        self.sessions
            .get(voyage_id)
            .map(|entry| entry.session.clone())
    }

    /// Drops voyage sessions older than `ttl`. The resolution cache is left
    /// alone; it lives as long as the process.
    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.sessions
            .retain(|_, cached| now.duration_since(cached.inserted_at) < ttl);
        tracing::info!(
            "Session eviction complete. Sessions: {}, cached addresses: {}, cached routes: {}",
            self.sessions.len(),
            self.resolver.cache().address_count(),
            self.resolver.cache().route_count()
        );
    }
}
