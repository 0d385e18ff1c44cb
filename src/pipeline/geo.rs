use crate::types::geo::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn cumulative_distances(points: &[Coordinate]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (idx, point) in points.iter().enumerate() {
        if idx > 0 {
            total += haversine_distance(&points[idx - 1], point);
        }
        cumulative.push(total);
    }
    cumulative
}

pub fn path_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Coordinate,
    pub along_km: f64,
    pub offset_km: f64,
}

pub fn project_onto_path(points: &[Coordinate], target: &Coordinate) -> Option<Projection> {
    let first = points.first()?;
    if points.len() == 1 {
        return Some(Projection {
            point: *first,
            along_km: 0.0,
            offset_km: haversine_distance(first, target),
        });
    }

    let cumulative = cumulative_distances(points);
    let mut best: Option<Projection> = None;
    for (idx, pair) in points.windows(2).enumerate() {
        let t = segment_parameter(&pair[0], &pair[1], target);
        let point = pair[0].lerp(&pair[1], t);
        let offset_km = haversine_distance(&point, target);
        if best.map_or(true, |b| offset_km < b.offset_km) {
            best = Some(Projection {
                point,
                along_km: cumulative[idx] + haversine_distance(&pair[0], &point),
                offset_km,
            });
        }
    }
    best
}

fn segment_parameter(a: &Coordinate, b: &Coordinate, target: &Coordinate) -> f64 {
    let scale = ((a.lat + b.lat) / 2.0).to_radians().cos();
    let dx = (b.lon - a.lon) * scale;
    let dy = b.lat - a.lat;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return 0.0;
    }
    let px = (target.lon - a.lon) * scale;
    let py = target.lat - a.lat;
    ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
}

