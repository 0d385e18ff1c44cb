use serde::Serialize;

use crate::types::geo::{Bounds, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    PickupLeg,
    HistoricPath,
    PredictedPath,
    DeliveryLeg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyle {
    pub color: &'static str,
    pub width: f32,
    pub opacity: f32,
    pub dash: Option<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: LayerId,
    pub path: Vec<Coordinate>,
    pub style: LayerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Pickup,
    Origin,
    Vessel,
    Destination,
    Delivery,
    LegCursor,
}

impl MarkerKind {
    pub fn icon(&self) -> &'static str {
        match self {
            MarkerKind::Pickup => "marker-pickup",
            MarkerKind::Origin => "marker-port",
            MarkerKind::Vessel => "marker-vessel",
            MarkerKind::Destination => "marker-port",
            MarkerKind::Delivery => "marker-delivery",
            MarkerKind::LegCursor => "marker-truck",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub coordinate: Coordinate,
    pub icon: &'static str,
}

impl Marker {
    pub fn new(kind: MarkerKind, coordinate: Coordinate) -> Self {
        Self {
            kind,
            coordinate,
            icon: kind.icon(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraCommand {
    FitBounds {
        bounds: Bounds,
        padding: u32,
        pitch: f64,
        bearing: f64,
    },
    CenterOn {
        center: Coordinate,
        zoom: f64,
        pitch: f64,
        bearing: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Terrain {
    pub enabled: bool,
    pub exaggeration: f64,
}

impl Terrain {
    pub const FLAT: Terrain = Terrain {
        enabled: false,
        exaggeration: 1.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub markers: Vec<Marker>,
    pub camera: CameraCommand,
    pub terrain: Terrain,
}

impl Scene {
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    Camera(CameraCommand),
    StyleLayer { id: LayerId, style: LayerStyle },
    PlaceMarker(Marker),
    RemoveMarker { kind: MarkerKind },
    Terrain(Terrain),
}
