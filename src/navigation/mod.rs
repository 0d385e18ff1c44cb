//! Navigation view state machine.
//!
//! The navigator switches between the fleet overview and the two last-mile
//! legs. Leg transitions are two-phase: [`machine::Navigator::request_leg`]
//! hands out a [`machine::TransitionTicket`] while the leg's route resolves
//! elsewhere, and [`machine::Navigator::complete_leg`] applies it only if that
//! ticket is still current.

pub mod machine;
pub mod scene;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::geo::Coordinate;

pub use machine::{Completion, Navigator, Rejection, TransitionTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    #[default]
    Overview,
    PickupLeg,
    DeliveryLeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Pickup,
    Delivery,
}

impl Leg {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pickup" | "collection" => Some(Leg::Pickup),
            "delivery" => Some(Leg::Delivery),
            _ => None,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        match self {
            Leg::Pickup => NavigationMode::PickupLeg,
            Leg::Delivery => NavigationMode::DeliveryLeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    MarkerClick,
    Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegAnchors {
    pub pickup: Vec<Coordinate>,
    pub delivery: Vec<Coordinate>,
}

impl LegAnchors {
    pub fn for_leg(&self, leg: Leg) -> &[Coordinate] {
        match leg {
            Leg::Pickup => &self.pickup,
            Leg::Delivery => &self.delivery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationConfig {
    pub zoom_threshold: f64,
    pub proximity_km: f64,
    pub leg_animation: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: 9.0,
            proximity_km: 50.0,
            leg_animation: Duration::from_millis(4000),
        }
    }
}
