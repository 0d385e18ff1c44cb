use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::navigation::scene::{visible_bounds, SceneInputs};
use crate::navigation::{
    Completion, Leg, LegAnchors, NavigationMode, Navigator, Rejection, TransitionTicket, Trigger,
    Viewport,
};
use crate::pipeline::animate::Playback;
use crate::pipeline::corridor::CorridorSynthesizer;
use crate::pipeline::interpolate::{self, progress_along};
use crate::pipeline::normalize::{dedupe_coordinates, merged_points, normalize};
use crate::pipeline::progress::estimate_schedule;
use crate::resolve::Resolver;
use crate::types::geo::{Bounds, Coordinate};
use crate::types::scene::{RenderCommand, Scene};
use crate::types::track::{
    LegSchedule, Progress, ResolvedAddress, Route, RouteEndpoints, TrackPoint, VoyageTrack,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LegOutcome {
    Entered { commands: Vec<RenderCommand> },
    /// The route resolved after the user had moved on; it was cached but not
    /// shown.
    Stale,
    Rejected { reason: Rejection },
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoyageSummary {
    pub voyage_id: String,
    pub historic_points: usize,
    pub predicted_points: usize,
    pub progress: Progress,
    pub position: Option<Coordinate>,
    pub mode: NavigationMode,
    pub pending_leg: Option<Leg>,
    pub playback: Playback,
}

#[derive(Debug)]
pub struct VoyageSession {
    id: String,
    track: VoyageTrack,
    endpoints: RouteEndpoints,
    schedule: LegSchedule,
    historic_path: Vec<Coordinate>,
    forward_path: Route,
    journey: Vec<Coordinate>,
    playback: Mutex<Playback>,
    navigator: Mutex<Navigator>,
    leg_routes: Mutex<HashMap<Leg, Route>>,
}

impl VoyageSession {
    pub fn new(
        id: String,
        samples: Vec<TrackPoint>,
        endpoints: RouteEndpoints,
        schedule: Option<LegSchedule>,
        corridor: &CorridorSynthesizer,
        config: &Config,
        now: DateTime<Utc>,
    ) -> Self {
        let track = normalize(samples);
        let schedule = schedule.unwrap_or_default();

        let historic_path: Vec<Coordinate> =
            track.historic().iter().map(|p| p.coordinate).collect();
        let predicted: Vec<Coordinate> = track.predicted().iter().map(|p| p.coordinate).collect();

        let forward_start = track
            .latest()
            .map(|latest| latest.coordinate)
            .unwrap_or(endpoints.origin);
        let forward_path = corridor.synthesize(forward_start, endpoints.destination, &predicted);

        let mut journey = Vec::with_capacity(historic_path.len() + forward_path.len() + 1);
        if historic_path.first() != Some(&endpoints.origin) {
            journey.push(endpoints.origin);
        }
        journey.extend(historic_path.iter().copied());
        journey.extend(forward_path.points().iter().copied());
        let journey = dedupe_coordinates(journey);

        let mut playback = Playback::new(config.playback_percent_per_second);
        let initial = match track.latest() {
            Some(latest) => progress_along(&journey, &latest.coordinate),
            None => Progress::new(estimate_schedule(&schedule, now)),
        };
        playback.scrub(initial.value());

        tracing::info!(
            voyage = %id,
            historic = track.historic().len(),
            predicted = track.predicted().len(),
            journey = journey.len(),
            "Created voyage session"
        );

        Self {
            id,
            track,
            endpoints,
            schedule,
            historic_path,
            forward_path,
            journey,
            playback: Mutex::new(playback),
            navigator: Mutex::new(Navigator::new(config.navigation)),
            leg_routes: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoints(&self) -> &RouteEndpoints {
        &self.endpoints
    }

    pub fn journey(&self) -> &[Coordinate] {
        &self.journey
    }

    pub fn forward_path(&self) -> &Route {
        &self.forward_path
    }

    pub fn progress_at(&self, now: DateTime<Utc>) -> Progress {
        match self.track.latest() {
            Some(latest) => progress_along(&self.journey, &latest.coordinate),
            None => Progress::new(estimate_schedule(&self.schedule, now)),
        }
    }

    pub fn current_position(&self, now: DateTime<Utc>) -> Option<Coordinate> {
        interpolate::current_position(&self.track, &self.journey, self.progress_at(now))
    }

    pub fn position_at_progress(&self, pct: f64) -> Option<Coordinate> {
        interpolate::position_at_progress(&self.journey, pct)
    }

    pub fn position_at_time(&self, at: DateTime<Utc>) -> Option<Coordinate> {
        if self.track.is_empty() {
            let progress = estimate_schedule(&self.schedule, at);
            return interpolate::position_at_progress(&self.journey, progress);
        }
        interpolate::position_at_time(&merged_points(&self.track), at)
    }

    pub fn playback(&self) -> Playback {
        *self.lock_playback()
    }

    pub fn advance_playback(&self, delta: Duration) -> (Progress, Option<Coordinate>) {
        let progress = self.lock_playback().advance(delta);
        (progress, self.position_at_progress(progress.value()))
    }

    pub fn scrub(&self, pct: f64) -> (Progress, Option<Coordinate>) {
        let progress = self.lock_playback().scrub(pct);
        (progress, self.position_at_progress(progress.value()))
    }

    pub fn set_playing(&self, playing: bool) -> Playback {
        let mut playback = self.lock_playback();
        playback.set_playing(playing);
        *playback
    }

    pub fn summary(&self, now: DateTime<Utc>) -> VoyageSummary {
        let (mode, pending_leg) = {
            let navigator = self.lock_navigator();
            (navigator.mode(), navigator.pending_leg())
        };
        VoyageSummary {
            voyage_id: self.id.clone(),
            historic_points: self.track.historic().len(),
            predicted_points: self.track.predicted().len(),
            progress: self.progress_at(now),
            position: self.current_position(now),
            mode,
            pending_leg,
            playback: self.playback(),
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.lock_navigator().mode()
    }

    pub async fn open_leg(&self, leg: Leg, trigger: Trigger, resolver: &Resolver) -> LegOutcome {
        let requested = self.lock_navigator().request_leg(leg, trigger);
        match requested {
            Ok(ticket) => self.finish_leg(ticket, resolver).await,
            Err(reason) => LegOutcome::Rejected { reason },
        }
    }

    /// Resolves the route for an already requested transition. The resolved
    /// route is kept even when the transition has gone stale.
    pub async fn finish_leg(&self, ticket: TransitionTicket, resolver: &Resolver) -> LegOutcome {
        let leg = ticket.leg();
        let Some((from, to)) = self.leg_endpoints(leg, resolver).await else {
            self.lock_navigator().abandon(&ticket);
            return LegOutcome::Unavailable;
        };

        let route = resolver.resolve_route(from, to).await;
        self.lock_leg_routes().insert(leg, route.clone());

        match self.lock_navigator().complete_leg(&ticket, route) {
            Completion::Applied(commands) => LegOutcome::Entered { commands },
            Completion::Stale => LegOutcome::Stale,
        }
    }

    /// Runs automatic leg detection for a viewport update. When the view
    /// qualifies for a leg, the transition is requested here and the returned
    /// ticket must be driven with [`VoyageSession::finish_leg`].
    pub fn observe_viewport(&self, viewport: &Viewport) -> Option<TransitionTicket> {
        let anchors = self.leg_anchors();
        let mut navigator = self.lock_navigator();
        let leg = navigator.observe_viewport(viewport, &anchors)?;
        navigator.request_leg(leg, Trigger::Viewport).ok()
    }

    pub fn close(&self, now: DateTime<Utc>) -> Vec<RenderCommand> {
        let bounds = self.overview_bounds(now);
        self.lock_navigator().close(bounds)
    }

    pub fn set_3d(&self, enabled: bool) -> Vec<RenderCommand> {
        self.lock_navigator().set_3d(enabled)
    }

    pub fn advance_leg_cursor(&self, delta: Duration) -> Option<Coordinate> {
        self.lock_navigator().advance(delta)
    }

    pub fn leg_cursor_progress(&self) -> Option<Progress> {
        self.lock_navigator().cursor_progress()
    }

    pub fn scene(&self, now: DateTime<Utc>) -> Scene {
        let leg_routes = self.lock_leg_routes().clone();
        let inputs = self.scene_inputs(&leg_routes, now);
        self.lock_navigator().scene(&inputs)
    }

    fn scene_inputs<'a>(
        &'a self,
        leg_routes: &'a HashMap<Leg, Route>,
        now: DateTime<Utc>,
    ) -> SceneInputs<'a> {
        SceneInputs {
            historic: &self.historic_path,
            predicted: self.forward_path.points(),
            pickup_leg: leg_routes.get(&Leg::Pickup),
            delivery_leg: leg_routes.get(&Leg::Delivery),
            pickup: self.endpoints.pickup.as_ref().and_then(ResolvedAddress::coordinate),
            origin: Some(self.endpoints.origin),
            vessel: self.current_position(now),
            destination: Some(self.endpoints.destination),
            delivery: self
                .endpoints
                .delivery
                .as_ref()
                .and_then(ResolvedAddress::coordinate),
        }
    }

    fn overview_bounds(&self, now: DateTime<Utc>) -> Option<Bounds> {
        let leg_routes = self.lock_leg_routes().clone();
        let inputs = self.scene_inputs(&leg_routes, now);
        visible_bounds(&inputs.layers(NavigationMode::Overview), &inputs.markers())
    }

    fn leg_anchors(&self) -> LegAnchors {
        let anchors = |address: &Option<ResolvedAddress>, port: Coordinate| match address {
            Some(address) => {
                let mut points = vec![port];
                points.extend(address.coordinate());
                points
            }
            None => Vec::new(),
        };
        LegAnchors {
            pickup: anchors(&self.endpoints.pickup, self.endpoints.origin),
            delivery: anchors(&self.endpoints.delivery, self.endpoints.destination),
        }
    }

    async fn leg_endpoints(&self, leg: Leg, resolver: &Resolver) -> Option<(Coordinate, Coordinate)> {
        let address = match leg {
            Leg::Pickup => self.endpoints.pickup.as_ref()?,
            Leg::Delivery => self.endpoints.delivery.as_ref()?,
        };

        let coordinate = match address.coordinate() {
            Some(coordinate) => coordinate,
            None => {
                let resolved = resolver.resolve_address(address.raw_text()).await?;
                address.resolve(resolved)
            }
        };

        Some(match leg {
            Leg::Pickup => (coordinate, self.endpoints.origin),
            Leg::Delivery => (self.endpoints.destination, coordinate),
        })
    }

    fn lock_navigator(&self) -> MutexGuard<'_, Navigator> {
        self.navigator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_playback(&self) -> MutexGuard<'_, Playback> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_leg_routes(&self) -> MutexGuard<'_, HashMap<Leg, Route>> {
        self.leg_routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
