use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::geo::{Bounds, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointTag {
    Historic,
    Latest,
    Predicted,
}

impl PointTag {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "historic" | "history" => Some(PointTag::Historic),
            "latest" | "current" => Some(PointTag::Latest),
            "predicted" | "prediction" => Some(PointTag::Predicted),
            _ => None,
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, PointTag::Historic | PointTag::Latest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub coordinate: Coordinate,
    pub timestamp: Option<DateTime<Utc>>,
    pub tag: PointTag,
}

impl TrackPoint {
    pub fn new(coordinate: Coordinate, timestamp: Option<DateTime<Utc>>, tag: PointTag) -> Self {
        Self {
            coordinate,
            timestamp,
            tag,
        }
    }
}

/// Observed and predicted samples for one voyage. Both sequences are
/// time-ordered and free of consecutive duplicate coordinates; build one
/// through [`crate::pipeline::normalize::normalize`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoyageTrack {
    historic: Vec<TrackPoint>,
    predicted: Vec<TrackPoint>,
}

impl VoyageTrack {
    pub(crate) fn from_parts(historic: Vec<TrackPoint>, predicted: Vec<TrackPoint>) -> Self {
        Self {
            historic,
            predicted,
        }
    }

    pub fn historic(&self) -> &[TrackPoint] {
        &self.historic
    }

    pub fn predicted(&self) -> &[TrackPoint] {
        &self.predicted
    }

    pub fn latest(&self) -> Option<&TrackPoint> {
        self.historic.last()
    }

    pub fn is_empty(&self) -> bool {
        self.historic.is_empty() && self.predicted.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { points })
    }

    pub fn straight(from: Coordinate, to: Coordinate) -> Self {
        Self {
            points: vec![from, to],
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn first(&self) -> Coordinate {
        self.points[0]
    }

    pub fn last(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds {
            south_west: self.first(),
            north_east: self.first(),
        };
        for point in &self.points[1..] {
            bounds.extend(point);
        }
        bounds
    }
}

#[derive(Debug, Default)]
pub struct ResolvedAddress {
    raw_text: String,
    coordinate: OnceLock<Coordinate>,
}

impl ResolvedAddress {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            coordinate: OnceLock::new(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate.get().copied()
    }

    pub fn resolve(&self, coordinate: Coordinate) -> Coordinate {
        *self.coordinate.get_or_init(|| coordinate)
    }
}

#[derive(Debug)]
pub struct RouteEndpoints {
    pub pickup: Option<ResolvedAddress>,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub delivery: Option<ResolvedAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegSchedule {
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub const START: Progress = Progress(0.0);
    pub const END: Progress = Progress(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::START;
        }
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 100.0
    }
}
