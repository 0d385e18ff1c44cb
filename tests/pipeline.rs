mod common;

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use voyageviz_rs::pipeline::animate::Playback;
use voyageviz_rs::pipeline::corridor::CorridorSynthesizer;
use voyageviz_rs::pipeline::geo::haversine_distance;
use voyageviz_rs::pipeline::interpolate::{
    current_position, position_at_progress, position_at_time, progress_along,
};
use voyageviz_rs::pipeline::normalize::{dedupe_sequential, merged_points, normalize, sort_by_time};
use voyageviz_rs::pipeline::progress::{
    estimate_progress, parse_calendar_date, FALLBACK_PROGRESS,
};
use voyageviz_rs::types::geo::Coordinate;
use voyageviz_rs::types::track::{PointTag, Progress, TrackPoint};

use common::{date, utc};

fn point(lon: f64, lat: f64) -> Coordinate {
    Coordinate::new(lon, lat)
}

fn sample(lon: f64, lat: f64, hours: Option<i64>, tag: PointTag) -> TrackPoint {
    let base = utc(2025, 3, 1);
    TrackPoint::new(
        point(lon, lat),
        hours.map(|h| base + ChronoDuration::hours(h)),
        tag,
    )
}

#[test]
fn normalize_drops_duplicate_coordinate_report() {
    let raw = vec![
        sample(0.0, 0.0, Some(0), PointTag::Historic),
        sample(10.0, 10.0, Some(1), PointTag::Historic),
        sample(0.0, 0.0, Some(1), PointTag::Historic),
    ];

    let track = normalize(raw);

    let coords: Vec<Coordinate> = track.historic().iter().map(|p| p.coordinate).collect();
    assert_eq!(coords, vec![point(0.0, 0.0), point(10.0, 10.0)]);
    assert_eq!(track.historic()[1].timestamp, Some(utc(2025, 3, 1) + ChronoDuration::hours(1)));
}

#[test]
fn normalize_splits_and_orders_tag_groups() {
    let raw = vec![
        sample(3.0, 0.0, Some(30), PointTag::Predicted),
        sample(2.0, 0.0, Some(2), PointTag::Latest),
        sample(1.0, 0.0, Some(1), PointTag::Historic),
        sample(4.0, 0.0, Some(20), PointTag::Predicted),
    ];

    let track = normalize(raw);

    let historic: Vec<f64> = track.historic().iter().map(|p| p.coordinate.lon).collect();
    let predicted: Vec<f64> = track.predicted().iter().map(|p| p.coordinate.lon).collect();
    assert_eq!(historic, vec![1.0, 2.0]);
    assert_eq!(predicted, vec![4.0, 3.0]);
    assert_eq!(track.latest().map(|p| p.tag), Some(PointTag::Latest));
}

#[test]
fn missing_timestamps_sort_first_and_keep_order() {
    let mut points = vec![
        sample(5.0, 0.0, Some(5), PointTag::Historic),
        sample(1.0, 0.0, None, PointTag::Historic),
        sample(2.0, 0.0, None, PointTag::Historic),
    ];

    sort_by_time(&mut points);

    let lons: Vec<f64> = points.iter().map(|p| p.coordinate.lon).collect();
    assert_eq!(lons, vec![1.0, 2.0, 5.0]);
}

#[test]
fn dedupe_is_idempotent() {
    let points = vec![
        sample(1.0, 1.0, Some(0), PointTag::Historic),
        sample(1.0, 1.0, Some(1), PointTag::Historic),
        sample(2.0, 2.0, Some(2), PointTag::Historic),
        sample(2.0, 2.0, Some(3), PointTag::Historic),
        sample(1.0, 1.0, Some(4), PointTag::Historic),
    ];

    let once = dedupe_sequential(points);
    let twice = dedupe_sequential(once.clone());

    assert_eq!(once.len(), 3);
    assert_eq!(once, twice);

    let raw = vec![
        sample(0.0, 0.0, Some(0), PointTag::Historic),
        sample(10.0, 10.0, Some(1), PointTag::Historic),
        sample(0.0, 0.0, Some(1), PointTag::Historic),
        sample(0.0, 0.0, Some(2), PointTag::Historic),
    ];
    let first = normalize(raw);
    let second = normalize(first.historic().to_vec());
    assert_eq!(first.historic(), second.historic());
}

#[test]
fn merged_points_dedupes_the_seam() {
    let raw = vec![
        sample(1.0, 0.0, Some(1), PointTag::Historic),
        sample(2.0, 0.0, Some(2), PointTag::Latest),
        sample(2.0, 0.0, Some(3), PointTag::Predicted),
        sample(3.0, 0.0, Some(4), PointTag::Predicted),
    ];

    let merged = merged_points(&normalize(raw));

    let lons: Vec<f64> = merged.iter().map(|p| p.coordinate.lon).collect();
    assert_eq!(lons, vec![1.0, 2.0, 3.0]);
}

#[test]
fn merged_points_drop_predictions_behind_latest_observation() {
    let raw = vec![
        sample(0.0, 0.0, Some(0), PointTag::Historic),
        sample(10.0, 0.0, Some(10), PointTag::Latest),
        sample(5.0, 1.0, Some(5), PointTag::Predicted),
        sample(8.0, 1.0, Some(8), PointTag::Predicted),
        sample(20.0, 0.0, Some(20), PointTag::Predicted),
    ];

    let merged = merged_points(&normalize(raw));

    let hours: Vec<i64> = merged
        .iter()
        .filter_map(|p| p.timestamp)
        .map(|t| (t - utc(2025, 3, 1)).num_hours())
        .collect();
    assert_eq!(hours, vec![0, 10, 20]);
    let ahead = position_at_time(&merged, utc(2025, 3, 1) + ChronoDuration::hours(12))
        .expect("position");
    assert!((ahead.lon - 12.0).abs() < 1e-9, "got {:?}", ahead);
    assert!(ahead.lat.abs() < 1e-9);
    assert_eq!(
        position_at_time(&merged, utc(2025, 3, 1) + ChronoDuration::hours(30)),
        Some(point(20.0, 0.0))
    );
}

#[test]
fn progress_endpoints_are_exact() {
    let route = vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];

    assert_eq!(position_at_progress(&route, 0.0), Some(route[0]));
    assert_eq!(position_at_progress(&route, 100.0), Some(route[2]));
    assert_eq!(position_at_progress(&route, -15.0), Some(route[0]));
    assert_eq!(position_at_progress(&route, 250.0), Some(route[2]));
}

#[test]
fn progress_is_monotonic_along_route() {
    let route = vec![
        point(0.0, 0.0),
        point(5.0, 1.0),
        point(10.0, 3.0),
        point(20.0, 4.0),
    ];

    let mut previous = 0.0;
    for step in 0..=100 {
        let position = position_at_progress(&route, step as f64).expect("position");
        let distance = haversine_distance(&route[0], &position);
        assert!(
            distance + 1e-9 >= previous,
            "distance shrank at {}%: {} < {}",
            step,
            distance,
            previous
        );
        previous = distance;
    }
}

#[test]
fn progress_interpolates_within_segment() {
    let route = vec![point(0.0, 0.0), point(10.0, 0.0)];

    let midpoint = position_at_progress(&route, 50.0).expect("position");

    assert!((midpoint.lon - 5.0).abs() < 1e-9);
    assert!(midpoint.lat.abs() < 1e-9);
}

#[test]
fn progress_handles_degenerate_routes() {
    assert_eq!(position_at_progress(&[], 50.0), None);
    assert_eq!(position_at_progress(&[point(3.0, 4.0)], 50.0), Some(point(3.0, 4.0)));
    assert_eq!(
        position_at_progress(&[point(3.0, 4.0), point(3.0, 4.0)], 50.0),
        Some(point(3.0, 4.0))
    );
}

#[test]
fn time_interpolation_brackets_and_clamps() {
    let series = vec![
        sample(0.0, 0.0, Some(0), PointTag::Historic),
        sample(10.0, 0.0, Some(10), PointTag::Historic),
        sample(10.0, 10.0, Some(20), PointTag::Historic),
    ];
    let base = utc(2025, 3, 1);

    let before = position_at_time(&series, base - ChronoDuration::hours(3));
    let halfway = position_at_time(&series, base + ChronoDuration::hours(5)).expect("position");
    let later = position_at_time(&series, base + ChronoDuration::hours(15)).expect("position");
    let after = position_at_time(&series, base + ChronoDuration::hours(99));

    assert_eq!(before, Some(point(0.0, 0.0)));
    assert!((halfway.lon - 5.0).abs() < 1e-9);
    assert!((later.lat - 5.0).abs() < 1e-9);
    assert_eq!(after, Some(point(10.0, 10.0)));
    assert_eq!(position_at_time(&[], base), None);
}

#[test]
fn latest_observation_beats_model_position() {
    let track = normalize(vec![
        sample(1.0, 1.0, Some(0), PointTag::Historic),
        sample(2.0, 2.0, Some(1), PointTag::Latest),
        sample(9.0, 9.0, Some(5), PointTag::Predicted),
    ]);
    let fallback = vec![point(0.0, 0.0), point(10.0, 10.0)];

    let position = current_position(&track, &fallback, Progress::new(90.0));
    assert_eq!(position, Some(point(2.0, 2.0)));

    let unobserved = normalize(vec![sample(9.0, 9.0, Some(5), PointTag::Predicted)]);
    let position = current_position(&unobserved, &fallback, Progress::END);
    assert_eq!(position, Some(point(10.0, 10.0)));
}

#[test]
fn progress_along_locates_projection() {
    let route = vec![point(0.0, 0.0), point(10.0, 0.0)];

    let progress = progress_along(&route, &point(2.5, 0.5));

    assert!((progress.value() - 25.0).abs() < 0.5);
}

#[test]
fn estimate_progress_boundaries() {
    let start = date(2025, 1, 1);
    let end = date(2025, 1, 11);

    assert_eq!(estimate_progress(Some(start), Some(end), None, None, utc(2025, 1, 1)), 0.0);
    assert_eq!(estimate_progress(Some(start), Some(end), None, None, utc(2025, 1, 11)), 100.0);
    assert_eq!(estimate_progress(Some(start), Some(end), None, None, utc(2024, 12, 1)), 0.0);
    assert_eq!(estimate_progress(Some(start), Some(end), None, None, utc(2025, 2, 1)), 100.0);
    assert_eq!(
        estimate_progress(Some(end), Some(start), None, None, utc(2025, 1, 6)),
        FALLBACK_PROGRESS
    );
    assert_eq!(
        estimate_progress(Some(start), Some(start), None, None, utc(2025, 1, 6)),
        FALLBACK_PROGRESS
    );
    assert_eq!(
        estimate_progress(None, Some(end), None, None, utc(2025, 1, 6)),
        FALLBACK_PROGRESS
    );
}

#[test]
fn estimate_progress_mid_journey() {
    let now = utc(2025, 1, 6);
    let progress = estimate_progress(
        parse_calendar_date("2025-01-01"),
        parse_calendar_date("2025-01-11"),
        None,
        None,
        now,
    );

    assert!((progress - 50.0).abs() <= 1.0, "got {}", progress);
}

#[test]
fn actual_dates_override_planned() {
    let progress = estimate_progress(
        Some(date(2025, 1, 1)),
        Some(date(2025, 1, 11)),
        Some(date(2025, 1, 5)),
        Some(date(2025, 1, 7)),
        utc(2025, 1, 6),
    );

    assert!((progress - 50.0).abs() < 1e-9);
}

#[test]
fn calendar_dates_parse_leniently() {
    assert_eq!(parse_calendar_date("2025-01-06"), Some(date(2025, 1, 6)));
    assert_eq!(parse_calendar_date("2025-01-06T18:30:00Z"), Some(date(2025, 1, 6)));
    assert_eq!(parse_calendar_date("06/01/2025"), Some(date(2025, 1, 6)));
    assert_eq!(parse_calendar_date("soon"), None);
    assert_eq!(parse_calendar_date(""), None);
}

#[test]
fn corridor_spans_asia_to_europe() {
    let origin = point(120.0, 30.0);
    let destination = point(-0.5, 51.5);

    let route = CorridorSynthesizer::default().synthesize(origin, destination, &[]);

    assert!(route.len() >= 2);
    assert_eq!(route.first(), origin);
    assert_eq!(route.last(), destination);
    assert!(route.points().contains(&point(32.55, 29.9)), "expected Suez waypoint");
    let lons: Vec<f64> = route.points().iter().map(|p| p.lon).collect();
    assert!(lons.windows(2).all(|pair| pair[0] >= pair[1]), "lons not descending: {:?}", lons);
}

#[test]
fn corridor_orders_waypoints_with_travel_direction() {
    let synthesizer = CorridorSynthesizer::new(
        vec![point(8.0, 1.0), point(2.0, 1.0), point(5.0, 1.0), point(30.0, 1.0)],
        0.5,
    );

    let eastbound = synthesizer.synthesize(point(0.0, 0.0), point(10.0, 0.0), &[]);
    let westbound = synthesizer.synthesize(point(10.0, 0.0), point(0.0, 0.0), &[]);

    let east: Vec<f64> = eastbound.points().iter().map(|p| p.lon).collect();
    let west: Vec<f64> = westbound.points().iter().map(|p| p.lon).collect();
    assert_eq!(east, vec![0.0, 2.0, 5.0, 8.0, 10.0]);
    assert_eq!(west, vec![10.0, 8.0, 5.0, 2.0, 0.0]);
}

#[test]
fn corridor_uses_latitude_for_north_south_legs() {
    let synthesizer = CorridorSynthesizer::new(vec![point(11.0, 30.0), point(11.0, 10.0)], 1.0);

    let route = synthesizer.synthesize(point(10.0, 0.0), point(12.0, 40.0), &[]);

    assert_eq!(
        route.points(),
        &[point(10.0, 0.0), point(11.0, 10.0), point(11.0, 30.0), point(12.0, 40.0)]
    );
}

#[test]
fn corridor_falls_back_to_straight_line() {
    let synthesizer = CorridorSynthesizer::new(Vec::new(), 1.0);

    let route = synthesizer.synthesize(point(0.0, 0.0), point(1.0, 1.0), &[]);
    assert_eq!(route.points(), &[point(0.0, 0.0), point(1.0, 1.0)]);

    let same = synthesizer.synthesize(point(4.0, 4.0), point(4.0, 4.0), &[]);
    assert_eq!(same.points(), &[point(4.0, 4.0), point(4.0, 4.0)]);
}

#[test]
fn corridor_threads_predicted_samples_in_order() {
    let synthesizer = CorridorSynthesizer::new(vec![point(5.0, 0.0)], 0.5);
    let predicted = [point(7.0, 0.2), point(5.0, 1.0), point(3.0, 0.2), point(10.0, 0.0)];

    let route = synthesizer.synthesize(point(0.0, 0.0), point(10.0, 0.0), &predicted);

    assert_eq!(
        route.points(),
        &[
            point(0.0, 0.0),
            point(3.0, 0.2),
            point(5.0, 0.0),
            point(5.0, 1.0),
            point(7.0, 0.2),
            point(10.0, 0.0),
        ]
    );
}

#[test]
fn playback_steps_forward_and_scrubs_back() {
    let mut playback = Playback::new(10.0);

    assert_eq!(playback.advance(Duration::from_secs(1)), Progress::START);

    playback.set_playing(true);
    assert_eq!(playback.advance(Duration::from_secs(1)).value(), 10.0);
    assert_eq!(playback.advance(Duration::from_secs(60)), Progress::END);
    assert!(!playback.is_playing());

    assert_eq!(playback.scrub(30.0).value(), 30.0);
    assert_eq!(playback.scrub(f64::NAN), Progress::START);
}

#[test]
fn fixed_duration_animation_completes_on_time() {
    let mut cursor = Playback::over(Duration::from_millis(4000));

    assert!((cursor.advance(Duration::from_millis(2000)).value() - 50.0).abs() < 1e-9);
    assert!(cursor.advance(Duration::from_millis(2000)).is_complete());
    assert!(!cursor.is_playing());
    assert!(Playback::over(Duration::ZERO).progress().is_complete());
}
