use crate::navigation::NavigationMode;
use crate::types::geo::{Bounds, Coordinate};
use crate::types::scene::{CameraCommand, Layer, LayerId, LayerStyle, Marker, MarkerKind};
use crate::types::track::Route;

pub const DEFAULT_PITCH: f64 = 0.0;
pub const DEFAULT_BEARING: f64 = 0.0;
pub const TERRAIN_PITCH: f64 = 60.0;
pub const TERRAIN_EXAGGERATION: f64 = 1.5;

const OVERVIEW_PADDING: u32 = 60;
const LEG_PADDING: u32 = 24;

const EMPHASIS_EXTRA_WIDTH: f32 = 3.0;
const DIMMED_OPACITY: f32 = 0.25;

#[derive(Debug, Default)]
pub struct SceneInputs<'a> {
    pub historic: &'a [Coordinate],
    pub predicted: &'a [Coordinate],
    pub pickup_leg: Option<&'a Route>,
    pub delivery_leg: Option<&'a Route>,
    pub pickup: Option<Coordinate>,
    pub origin: Option<Coordinate>,
    pub vessel: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub delivery: Option<Coordinate>,
}

impl SceneInputs<'_> {
    pub fn layers(&self, mode: NavigationMode) -> Vec<Layer> {
        let candidates = [
            (LayerId::PickupLeg, self.pickup_leg.map(Route::points)),
            (LayerId::HistoricPath, Some(self.historic)),
            (LayerId::PredictedPath, Some(self.predicted)),
            (LayerId::DeliveryLeg, self.delivery_leg.map(Route::points)),
        ];

        candidates
            .into_iter()
            .filter_map(|(id, path)| {
                let path = path?;
                if path.len() < 2 {
                    return None;
                }
                Some(Layer {
                    id,
                    path: path.to_vec(),
                    style: style_for(id, mode),
                })
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<Marker> {
        [
            (MarkerKind::Pickup, self.pickup),
            (MarkerKind::Origin, self.origin),
            (MarkerKind::Vessel, self.vessel),
            (MarkerKind::Destination, self.destination),
            (MarkerKind::Delivery, self.delivery),
        ]
        .into_iter()
        .filter_map(|(kind, coordinate)| coordinate.map(|c| Marker::new(kind, c)))
        .collect()
    }
}

pub fn normal_style(id: LayerId) -> LayerStyle {
    match id {
        LayerId::PickupLeg => LayerStyle {
            color: "#F78166",
            width: 3.0,
            opacity: 0.9,
            dash: None,
        },
        LayerId::HistoricPath => LayerStyle {
            color: "#1F6FEB",
            width: 3.0,
            opacity: 0.9,
            dash: None,
        },
        LayerId::PredictedPath => LayerStyle {
            color: "#8B949E",
            width: 2.0,
            opacity: 0.8,
            dash: Some([2.0, 2.0]),
        },
        LayerId::DeliveryLeg => LayerStyle {
            color: "#3FB950",
            width: 3.0,
            opacity: 0.9,
            dash: None,
        },
    }
}

pub fn style_for(id: LayerId, mode: NavigationMode) -> LayerStyle {
    let focused = match mode {
        NavigationMode::Overview => return normal_style(id),
        NavigationMode::PickupLeg => LayerId::PickupLeg,
        NavigationMode::DeliveryLeg => LayerId::DeliveryLeg,
    };

    let mut style = normal_style(id);
    if id == focused {
        style.opacity = 1.0;
        style.width += EMPHASIS_EXTRA_WIDTH;
    } else {
        style.opacity = DIMMED_OPACITY;
    }
    style
}

pub fn overview_camera(bounds: Option<Bounds>) -> CameraCommand {
    match bounds {
        Some(bounds) => CameraCommand::FitBounds {
            bounds,
            padding: OVERVIEW_PADDING,
            pitch: DEFAULT_PITCH,
            bearing: DEFAULT_BEARING,
        },
        None => CameraCommand::CenterOn {
            center: Coordinate::new(0.0, 0.0),
            zoom: 1.0,
            pitch: DEFAULT_PITCH,
            bearing: DEFAULT_BEARING,
        },
    }
}

pub fn leg_camera(route: &Route, pitch: f64, bearing: f64) -> CameraCommand {
    CameraCommand::FitBounds {
        bounds: route.bounds(),
        padding: LEG_PADDING,
        pitch,
        bearing,
    }
}

pub fn visible_bounds(layers: &[Layer], markers: &[Marker]) -> Option<Bounds> {
    Bounds::from_points(
        layers
            .iter()
            .flat_map(|layer| layer.path.iter())
            .chain(markers.iter().map(|marker| &marker.coordinate)),
    )
}
