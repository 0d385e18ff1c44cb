use std::time::Duration;

use crate::navigation::NavigationConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub session_ttl: Duration,
    pub fetch_timeout: Duration,
    pub geocoder_url: String,
    pub directions_url: String,
    pub navigation: NavigationConfig,
    pub playback_percent_per_second: f64,
    pub corridor_margin_deg: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", 3000);
        let session_ttl_seconds = env_or("SESSION_TTL_SECONDS", 3600);
        let fetch_timeout_ms = env_or("FETCH_TIMEOUT_MS", 5000);

        let geocoder_url = std::env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let directions_url = std::env::var("DIRECTIONS_URL")
            .unwrap_or_else(|_| "https://router.project-osrm.org".to_string());

        let navigation = NavigationConfig {
            zoom_threshold: env_or("LEG_ZOOM_THRESHOLD", 9.0),
            proximity_km: env_or("LEG_PROXIMITY_KM", 50.0),
            leg_animation: Duration::from_millis(env_or("LEG_ANIMATION_MS", 4000)),
        };

        Self {
            port,
            session_ttl: Duration::from_secs(session_ttl_seconds),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            geocoder_url,
            directions_url,
            navigation,
            playback_percent_per_second: env_or("PLAYBACK_PERCENT_PER_SECOND", 5.0),
            corridor_margin_deg: env_or("CORRIDOR_MARGIN_DEG", 1.0),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
