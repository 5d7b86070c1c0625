//! Route-service contract and client-side navigation session.
//!
//! # Responsibility
//! - Define the plain request/response contract the core hands to an
//!   external routing provider.
//! - Manage the overlay lifecycle during navigation: replace-then-draw,
//!   in-flight guard, stale-response handling, explicit stop.
//!
//! # Invariants
//! - Route computation itself is external; this module never suspends.
//!   The host issues the request and feeds the outcome back.
//! - At most one calculation is in flight; at most one overlay exists.
//! - A response arriving after `stop` is dropped, never drawn.

use crate::model::point::Coordinate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coordinate pair handed to the routing provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Computed path returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Polyline vertices from origin to destination.
    pub points: Vec<Coordinate>,
    pub distance_meters: f64,
}

/// Provider-side route failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Provider could be reached but found no path.
    NoRoute,
    /// Provider unavailable; carries the provider's message.
    Unavailable(String),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRoute => write!(f, "no route between the requested coordinates"),
            Self::Unavailable(message) => write!(f, "route service unavailable: {message}"),
        }
    }
}

impl Error for RouteError {}

/// External routing capability.
///
/// Plain request/response seam: coordinates in, path-or-failure out.
/// Hosts adapt their mapping provider behind this trait; an async host
/// instead drives [`NavigationSession`] directly via `begin_*`/`complete`.
pub trait RouteService {
    fn plan_route(&self, request: &RouteRequest) -> Result<RoutePlan, RouteError>;
}

/// Client-side navigation state: destination, current overlay, and the
/// guard that keeps overlapping calculations from racing each other.
#[derive(Debug, Default)]
pub struct NavigationSession {
    destination: Option<Coordinate>,
    overlay: Option<RoutePlan>,
    in_flight: bool,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins navigating toward `to`, replacing any previous session.
    ///
    /// The old overlay is cleared immediately so a provider failure never
    /// leaves a stale path on screen. Returns the request the host must
    /// hand to its provider, to be answered via [`Self::complete`].
    pub fn begin_navigation(&mut self, from: Coordinate, to: Coordinate) -> RouteRequest {
        self.stop();
        self.destination = Some(to);
        self.in_flight = true;
        info!(
            "event=navigation_start module=route status=ok dest_lat={} dest_lon={}",
            to.latitude, to.longitude
        );
        RouteRequest { from, to }
    }

    /// Requests a re-plan from a new position toward the stored
    /// destination.
    ///
    /// Returns `None` when not navigating, or when a calculation is
    /// already in flight (overlapping requests are dropped, keeping the
    /// single-overlay contract).
    pub fn begin_refresh(&mut self, from: Coordinate) -> Option<RouteRequest> {
        let to = self.destination?;
        if self.in_flight {
            warn!("event=route_plan module=route status=skipped error_code=already_in_flight");
            return None;
        }
        self.in_flight = true;
        Some(RouteRequest { from, to })
    }

    /// Applies the provider's answer to the in-flight request.
    ///
    /// Success replaces the overlay; failure clears it. An answer with no
    /// request in flight (e.g. arriving after `stop`) is dropped.
    pub fn complete(&mut self, result: Result<RoutePlan, RouteError>) {
        if !self.in_flight {
            warn!("event=route_plan module=route status=dropped error_code=stale_response");
            return;
        }
        self.in_flight = false;

        match result {
            Ok(plan) => {
                info!(
                    "event=route_plan module=route status=ok distance_m={} vertices={}",
                    plan.distance_meters,
                    plan.points.len()
                );
                self.overlay = Some(plan);
            }
            Err(err) => {
                warn!("event=route_plan module=route status=error error={err}");
                self.overlay = None;
            }
        }
    }

    /// Synchronous convenience for hosts with a blocking provider:
    /// begin, call the service, complete.
    pub fn start(
        &mut self,
        service: &dyn RouteService,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<(), RouteError> {
        let request = self.begin_navigation(from, to);
        let result = service.plan_route(&request);
        self.complete(result.clone());
        result.map(|_| ())
    }

    /// Synchronous counterpart of [`Self::begin_refresh`].
    pub fn refresh(
        &mut self,
        service: &dyn RouteService,
        from: Coordinate,
    ) -> Result<(), RouteError> {
        let Some(request) = self.begin_refresh(from) else {
            return Ok(());
        };
        let result = service.plan_route(&request);
        self.complete(result.clone());
        result.map(|_| ())
    }

    /// Ends navigation, clears the overlay and invalidates any response
    /// still in flight.
    pub fn stop(&mut self) {
        if self.destination.is_some() {
            info!("event=navigation_stop module=route status=ok");
        }
        self.destination = None;
        self.overlay = None;
        self.in_flight = false;
    }

    /// Currently drawn route, if any.
    pub fn overlay(&self) -> Option<&RoutePlan> {
        self.overlay.as_ref()
    }

    pub fn is_navigating(&self) -> bool {
        self.destination.is_some()
    }
}
