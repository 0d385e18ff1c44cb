use chrono::{DateTime, Utc};

use crate::types::geo::Coordinate;
use crate::types::track::{TrackPoint, VoyageTrack};

pub fn sort_by_time(points: &mut [TrackPoint]) {
    points.sort_by_key(sort_key);
}

// Untimed points sort first, as the epoch.
fn sort_key(point: &TrackPoint) -> DateTime<Utc> {
    point.timestamp.unwrap_or_default()
}

pub fn dedupe_sequential(points: Vec<TrackPoint>) -> Vec<TrackPoint> {
    let mut retained: Vec<TrackPoint> = Vec::with_capacity(points.len());
    for point in points {
        if retained
            .last()
            .is_some_and(|prev| prev.coordinate == point.coordinate)
        {
            continue;
        }
        retained.push(point);
    }
    retained
}

/// Drops every timestamped point stamped at exactly the same instant as the
/// previously retained one; the first report for an instant wins.
pub fn dedupe_timestamps(points: Vec<TrackPoint>) -> Vec<TrackPoint> {
    let mut retained: Vec<TrackPoint> = Vec::with_capacity(points.len());
    for point in points {
        let conflicting = point.timestamp.is_some()
            && retained
                .last()
                .is_some_and(|prev| prev.timestamp == point.timestamp);
        if conflicting {
            continue;
        }
        retained.push(point);
    }
    retained
}

pub fn dedupe_coordinates(points: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut retained: Vec<Coordinate> = Vec::with_capacity(points.len());
    for point in points {
        if retained.last() == Some(&point) {
            continue;
        }
        retained.push(point);
    }
    retained
}

pub fn normalize(raw: Vec<TrackPoint>) -> VoyageTrack {
    let (mut historic, mut predicted): (Vec<_>, Vec<_>) =
        raw.into_iter().partition(|point| point.tag.is_observed());

    sort_by_time(&mut historic);
    sort_by_time(&mut predicted);

    let historic = dedupe_sequential(dedupe_timestamps(historic));
    let predicted = dedupe_sequential(dedupe_timestamps(predicted));

    tracing::debug!(
        historic = historic.len(),
        predicted = predicted.len(),
        "Normalized voyage track"
    );

    VoyageTrack::from_parts(historic, predicted)
}

/// Observed samples followed by the predicted ones stamped after the latest
/// observation, with duplicates at the seam removed. Untimed points are kept.
pub fn merged_points(track: &VoyageTrack) -> Vec<TrackPoint> {
    let observed_until = track.latest().and_then(|point| point.timestamp);
    let ahead = track
        .predicted()
        .iter()
        .filter(|point| match (observed_until, point.timestamp) {
            (Some(until), Some(at)) => at > until,
            _ => true,
        });
    let merged = track.historic().iter().chain(ahead).cloned().collect();
    dedupe_sequential(merged)
}
