use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::navigation::scene::{
    leg_camera, overview_camera, style_for, visible_bounds, SceneInputs, DEFAULT_BEARING,
    DEFAULT_PITCH, TERRAIN_EXAGGERATION, TERRAIN_PITCH,
};
use crate::navigation::{Leg, LegAnchors, NavigationConfig, NavigationMode, Trigger, Viewport};
use crate::pipeline::animate::Playback;
use crate::pipeline::geo::haversine_distance;
use crate::pipeline::interpolate::position_at_progress;
use crate::types::geo::{Bounds, Coordinate};
use crate::types::scene::{LayerId, Marker, MarkerKind, RenderCommand, Scene, Terrain};
use crate::types::track::{Progress, Route};

const ALL_LAYERS: [LayerId; 4] = [
    LayerId::PickupLeg,
    LayerId::HistoricPath,
    LayerId::PredictedPath,
    LayerId::DeliveryLeg,
];

#[derive(Debug, Clone)]
pub struct TransitionTicket {
    id: u64,
    leg: Leg,
    trigger: Trigger,
    token: CancellationToken,
}

impl TransitionTicket {
    pub fn leg(&self) -> Leg {
        self.leg
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    NotInOverview,
    TransitionPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied(Vec<RenderCommand>),
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewState {
    pitch: f64,
    bearing: f64,
    terrain: Terrain,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_PITCH,
            bearing: DEFAULT_BEARING,
            terrain: Terrain::FLAT,
        }
    }
}

#[derive(Debug)]
struct FocusedLeg {
    route: Route,
    cursor: Playback,
}

#[derive(Debug)]
pub struct Navigator {
    config: NavigationConfig,
    mode: NavigationMode,
    pending: Option<TransitionTicket>,
    focused: Option<FocusedLeg>,
    view: ViewState,
    next_ticket: u64,
}

impl Navigator {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            mode: NavigationMode::Overview,
            pending: None,
            focused: None,
            view: ViewState::default(),
            next_ticket: 0,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn pending_leg(&self) -> Option<Leg> {
        self.pending.as_ref().map(TransitionTicket::leg)
    }

    pub fn is_3d(&self) -> bool {
        self.view.terrain.enabled
    }

    pub fn request_leg(&mut self, leg: Leg, trigger: Trigger) -> Result<TransitionTicket, Rejection> {
        if self.mode != NavigationMode::Overview {
            tracing::debug!(?leg, mode = ?self.mode, "Dropped leg request outside overview");
            return Err(Rejection::NotInOverview);
        }
        if let Some(pending) = &self.pending {
            tracing::debug!(?leg, pending = ?pending.leg, "Dropped leg request while another is pending");
            return Err(Rejection::TransitionPending);
        }

        self.next_ticket += 1;
        let ticket = TransitionTicket {
            id: self.next_ticket,
            leg,
            trigger,
            token: CancellationToken::new(),
        };
        self.pending = Some(ticket.clone());
        tracing::debug!(?leg, ?trigger, "Leg transition pending");
        Ok(ticket)
    }

    pub fn complete_leg(&mut self, ticket: &TransitionTicket, route: Route) -> Completion {
        if !self.is_current(ticket) {
            tracing::debug!(leg = ?ticket.leg, "Discarded stale leg transition");
            return Completion::Stale;
        }
        self.pending = None;

        let mode = ticket.leg.mode();
        self.mode = mode;

        let mut commands = Vec::with_capacity(ALL_LAYERS.len() + 2);
        commands.push(RenderCommand::Camera(leg_camera(
            &route,
            self.view.pitch,
            self.view.bearing,
        )));
        commands.extend(ALL_LAYERS.iter().map(|id| RenderCommand::StyleLayer {
            id: *id,
            style: style_for(*id, mode),
        }));
        commands.push(RenderCommand::PlaceMarker(Marker::new(
            MarkerKind::LegCursor,
            route.first(),
        )));

        self.focused = Some(FocusedLeg {
            route,
            cursor: Playback::over(self.config.leg_animation),
        });

        tracing::info!(leg = ?ticket.leg, trigger = ?ticket.trigger, "Entered leg view");
        Completion::Applied(commands)
    }

    pub fn abandon(&mut self, ticket: &TransitionTicket) {
        if self.is_current(ticket) {
            ticket.token.cancel();
            self.pending = None;
            tracing::debug!(leg = ?ticket.leg, "Abandoned leg transition");
        }
    }

    /// Returns to the overview, cancelling any pending transition. Calling it
    /// again while already in the overview changes nothing and emits nothing.
    pub fn close(&mut self, overview_bounds: Option<Bounds>) -> Vec<RenderCommand> {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            tracing::debug!(leg = ?pending.leg, "Cancelled pending leg transition");
        }

        let had_custom_view = self.view != ViewState::default();
        if self.mode == NavigationMode::Overview && self.focused.is_none() && !had_custom_view {
            return Vec::new();
        }

        self.mode = NavigationMode::Overview;
        self.view = ViewState::default();
        let had_cursor = self.focused.take().is_some();

        let mut commands = Vec::with_capacity(ALL_LAYERS.len() + 3);
        commands.push(RenderCommand::Camera(overview_camera(overview_bounds)));
        commands.extend(ALL_LAYERS.iter().map(|id| RenderCommand::StyleLayer {
            id: *id,
            style: style_for(*id, NavigationMode::Overview),
        }));
        commands.push(RenderCommand::Terrain(Terrain::FLAT));
        if had_cursor {
            commands.push(RenderCommand::RemoveMarker {
                kind: MarkerKind::LegCursor,
            });
        }

        tracing::info!("Returned to overview");
        commands
    }

    /// Feeds a viewport update into automatic leg detection. Returns the leg to
    /// request when the overview is zoomed in close to one. A pending
    /// viewport-triggered transition is cancelled once the view stops
    /// qualifying for it.
    pub fn observe_viewport(&mut self, viewport: &Viewport, anchors: &LegAnchors) -> Option<Leg> {
        if let Some(pending) = &self.pending {
            if pending.trigger == Trigger::Viewport
                && self.leg_distance(viewport, anchors.for_leg(pending.leg)).is_none()
            {
                pending.token.cancel();
                tracing::debug!(leg = ?pending.leg, "Viewport left leg before it resolved");
                self.pending = None;
            }
            return None;
        }

        if self.mode != NavigationMode::Overview {
            return None;
        }

        [Leg::Pickup, Leg::Delivery]
            .into_iter()
            .filter_map(|leg| {
                self.leg_distance(viewport, anchors.for_leg(leg))
                    .map(|distance| (leg, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(leg, _)| leg)
    }

    pub fn set_3d(&mut self, enabled: bool) -> Vec<RenderCommand> {
        if self.view.terrain.enabled == enabled {
            return Vec::new();
        }

        if enabled {
            self.view.pitch = TERRAIN_PITCH;
            self.view.terrain = Terrain {
                enabled: true,
                exaggeration: TERRAIN_EXAGGERATION,
            };
        } else {
            self.view = ViewState::default();
        }

        let mut commands = Vec::with_capacity(2);
        if let Some(focused) = &self.focused {
            commands.push(RenderCommand::Camera(leg_camera(
                &focused.route,
                self.view.pitch,
                self.view.bearing,
            )));
        }
        commands.push(RenderCommand::Terrain(self.view.terrain));
        commands
    }

    pub fn advance(&mut self, delta: Duration) -> Option<Coordinate> {
        let focused = self.focused.as_mut()?;
        let progress = focused.cursor.advance(delta);
        position_at_progress(focused.route.points(), progress.value())
    }

    pub fn cursor_progress(&self) -> Option<Progress> {
        self.focused.as_ref().map(|focused| focused.cursor.progress())
    }

    pub fn scene(&self, inputs: &SceneInputs<'_>) -> Scene {
        let layers = inputs.layers(self.mode);
        let mut markers = inputs.markers();

        let camera = match &self.focused {
            Some(focused) => {
                let progress = focused.cursor.progress().value();
                if let Some(cursor) = position_at_progress(focused.route.points(), progress) {
                    markers.push(Marker::new(MarkerKind::LegCursor, cursor));
                }
                leg_camera(&focused.route, self.view.pitch, self.view.bearing)
            }
            None => overview_camera(visible_bounds(&layers, &markers)),
        };

        Scene {
            layers,
            markers,
            camera,
            terrain: self.view.terrain,
        }
    }

    fn is_current(&self, ticket: &TransitionTicket) -> bool {
        !ticket.is_cancelled()
            && self
                .pending
                .as_ref()
                .is_some_and(|pending| pending.id == ticket.id)
    }

    fn leg_distance(&self, viewport: &Viewport, anchors: &[Coordinate]) -> Option<f64> {
        if viewport.zoom < self.config.zoom_threshold {
            return None;
        }
        anchors
            .iter()
            .map(|anchor| haversine_distance(&viewport.center, anchor))
            .filter(|distance| *distance <= self.config.proximity_km)
            .min_by(|a, b| a.total_cmp(b))
    }
}
