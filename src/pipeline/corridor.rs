use crate::pipeline::geo::{cumulative_distances, project_onto_path};
use crate::pipeline::normalize::dedupe_coordinates;
use crate::types::geo::Coordinate;
use crate::types::track::Route;

pub const DEFAULT_WAYPOINTS: &[(&str, Coordinate)] = &[
    ("Taiwan Strait", Coordinate::new(119.5, 24.5)),
    ("South China Sea", Coordinate::new(113.0, 15.0)),
    ("Singapore Strait", Coordinate::new(104.0, 1.2)),
    ("Strait of Malacca", Coordinate::new(98.5, 4.5)),
    ("Dondra Head", Coordinate::new(80.6, 5.6)),
    ("Arabian Sea", Coordinate::new(62.0, 13.0)),
    ("Bab-el-Mandeb", Coordinate::new(43.4, 12.6)),
    ("Red Sea", Coordinate::new(38.0, 21.0)),
    ("Suez Canal", Coordinate::new(32.55, 29.9)),
    ("Port Said", Coordinate::new(32.3, 31.3)),
    ("Strait of Sicily", Coordinate::new(12.0, 37.3)),
    ("Strait of Gibraltar", Coordinate::new(-5.6, 35.95)),
    ("Cape Finisterre", Coordinate::new(-9.8, 43.0)),
    ("Ushant", Coordinate::new(-5.8, 48.6)),
];

pub const DEFAULT_MARGIN_DEG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Longitude,
    Latitude,
}

impl Axis {
    fn between(origin: &Coordinate, destination: &Coordinate) -> Self {
        let lon_span = (destination.lon - origin.lon).abs();
        let lat_span = (destination.lat - origin.lat).abs();
        if lat_span > lon_span {
            Axis::Latitude
        } else {
            Axis::Longitude
        }
    }

    fn value(&self, coordinate: &Coordinate) -> f64 {
        match self {
            Axis::Longitude => coordinate.lon,
            Axis::Latitude => coordinate.lat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorridorSynthesizer {
    waypoints: Vec<Coordinate>,
    margin_deg: f64,
}

impl Default for CorridorSynthesizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_WAYPOINTS.iter().map(|(_, c)| *c).collect(),
            DEFAULT_MARGIN_DEG,
        )
    }
}

impl CorridorSynthesizer {
    pub fn new(waypoints: Vec<Coordinate>, margin_deg: f64) -> Self {
        Self {
            waypoints,
            margin_deg: margin_deg.max(0.0),
        }
    }

    pub fn with_margin(mut self, margin_deg: f64) -> Self {
        self.margin_deg = margin_deg.max(0.0);
        self
    }

    /// Corridor from `origin` to `destination` threaded through any known
    /// predicted samples. The result always starts at `origin`, ends at
    /// `destination` and has at least two points.
    pub fn synthesize(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        predicted: &[Coordinate],
    ) -> Route {
        if origin == destination {
            return Route::straight(origin, destination);
        }

        let corridor = self.corridor(origin, destination);
        if corridor.len() < 2 {
            return Route::straight(origin, destination);
        }
        if predicted.is_empty() {
            return Route::new(corridor).unwrap_or_else(|| Route::straight(origin, destination));
        }

        let merged = merge_samples(&corridor, origin, destination, predicted);
        tracing::debug!(
            corridor = corridor.len(),
            samples = predicted.len(),
            merged = merged.len(),
            "Merged predicted samples into corridor"
        );
        Route::new(merged).unwrap_or_else(|| Route::straight(origin, destination))
    }

    fn corridor(&self, origin: Coordinate, destination: Coordinate) -> Vec<Coordinate> {
        let axis = Axis::between(&origin, &destination);
        let from = axis.value(&origin);
        let to = axis.value(&destination);
        let low = from.min(to) - self.margin_deg;
        let high = from.max(to) + self.margin_deg;
        let ascending = to >= from;

        let mut kept: Vec<Coordinate> = self
            .waypoints
            .iter()
            .filter(|waypoint| (low..=high).contains(&axis.value(waypoint)))
            .copied()
            .collect();
        kept.sort_by(|a, b| {
            let ordering = axis.value(a).total_cmp(&axis.value(b));
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let mut corridor = Vec::with_capacity(kept.len() + 2);
        corridor.push(origin);
        corridor.extend(kept);
        corridor.push(destination);
        dedupe_coordinates(corridor)
    }
}

/// Orders interior corridor waypoints and predicted samples by their distance
/// along the corridor. Ties keep waypoints ahead of samples.
fn merge_samples(
    corridor: &[Coordinate],
    origin: Coordinate,
    destination: Coordinate,
    predicted: &[Coordinate],
) -> Vec<Coordinate> {
    let cumulative = cumulative_distances(corridor);
    let interior = corridor.len().saturating_sub(1);

    let mut entries: Vec<(f64, Coordinate)> = (1..interior)
        .map(|idx| (cumulative[idx], corridor[idx]))
        .collect();
    for sample in predicted {
        if !sample.is_finite() {
            continue;
        }
        if let Some(projection) = project_onto_path(corridor, sample) {
            entries.push((projection.along_km, *sample));
        }
    }
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged = Vec::with_capacity(entries.len() + 2);
    merged.push(origin);
    merged.extend(entries.into_iter().map(|(_, coordinate)| coordinate));
    merged.push(destination);
    dedupe_coordinates(merged)
}
