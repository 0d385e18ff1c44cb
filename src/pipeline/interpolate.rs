use chrono::{DateTime, Utc};

use crate::pipeline::geo::{haversine_distance, path_length, project_onto_path};
use crate::types::geo::Coordinate;
use crate::types::track::{Progress, TrackPoint, VoyageTrack};

/// Coordinate at `pct` percent of the path's geodesic length.
///
/// `0` and `100` return the first and last vertex exactly. A single-point or
/// zero-length path always yields its first vertex; an empty one yields
/// `None`.
pub fn position_at_progress(points: &[Coordinate], pct: f64) -> Option<Coordinate> {
    let first = *points.first()?;
    let last = *points.last()?;
    if points.len() == 1 {
        return Some(first);
    }

    let pct = Progress::new(pct).value();
    if pct <= 0.0 {
        return Some(first);
    }
    if pct >= 100.0 {
        return Some(last);
    }

    let total = path_length(points);
    if total <= f64::EPSILON {
        return Some(first);
    }

    let target = pct / 100.0 * total;
    let mut travelled = 0.0;
    for pair in points.windows(2) {
        let segment = haversine_distance(&pair[0], &pair[1]);
        if segment <= f64::EPSILON {
            continue;
        }
        if travelled + segment >= target {
            let local_t = ((target - travelled) / segment).clamp(0.0, 1.0);
            return Some(pair[0].lerp(&pair[1], local_t));
        }
        travelled += segment;
    }

    Some(last)
}

pub fn position_at_time(series: &[TrackPoint], at: DateTime<Utc>) -> Option<Coordinate> {
    let timed: Vec<(DateTime<Utc>, Coordinate)> = series
        .iter()
        .filter_map(|point| point.timestamp.map(|ts| (ts, point.coordinate)))
        .collect();

    let Some(&(first_time, first_coord)) = timed.first() else {
        return series.last().map(|point| point.coordinate);
    };
    let Some(&(last_time, last_coord)) = timed.last() else {
        return Some(first_coord);
    };

    if at <= first_time {
        return Some(first_coord);
    }
    if at >= last_time {
        return Some(last_coord);
    }

    for pair in timed.windows(2) {
        let (prev_time, prev_coord) = pair[0];
        let (next_time, next_coord) = pair[1];
        if at >= prev_time && at < next_time {
            let span = (next_time - prev_time).num_milliseconds() as f64;
            if span <= 0.0 {
                return Some(next_coord);
            }
            let elapsed = (at - prev_time).num_milliseconds() as f64;
            return Some(prev_coord.lerp(&next_coord, (elapsed / span).clamp(0.0, 1.0)));
        }
    }

    Some(last_coord)
}

pub fn current_position(
    track: &VoyageTrack,
    fallback_path: &[Coordinate],
    progress: Progress,
) -> Option<Coordinate> {
    if let Some(latest) = track.latest() {
        return Some(latest.coordinate);
    }
    position_at_progress(fallback_path, progress.value())
}

pub fn progress_along(points: &[Coordinate], coordinate: &Coordinate) -> Progress {
    let total = path_length(points);
    if total <= f64::EPSILON {
        return Progress::START;
    }
    project_onto_path(points, coordinate)
        .map(|projection| Progress::new(projection.along_km / total * 100.0))
        .unwrap_or(Progress::START)
}
