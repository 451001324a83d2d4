use crate::geo::{self, Coordinate};
use crate::route::Route;

/// Smoothing factor applied to the raw segment bearing on every tick. Raw
/// bearings jump at every vertex; blending a fraction of the turn per tick
/// keeps the marker rotation from looking jittery.
pub const DEFAULT_HEADING_BLEND: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// Everything the map needs to reflect one animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerUpdate {
    pub position: Coordinate,
    pub heading: f64,
    pub index: usize,
    /// True exactly when this step lands on the route's pickup waypoint.
    pub at_pickup: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not running; the tick source should stop.
    Idle,
    Advanced(MarkerUpdate),
    /// The marker reached the last point; the tick source should stop.
    Completed(MarkerUpdate),
}

/// Advances a marker along a route, one point per tick, with exponentially
/// smoothed heading. Purely synchronous; the recurring timer lives in the
/// driver (see `app`), which captures `generation()` so ticks from a replaced
/// run can never touch the marker.
pub struct RouteAnimator {
    route: Option<Route>,
    index: usize,
    heading: f64,
    phase: Phase,
    generation: u64,
    heading_blend: f64,
}

impl RouteAnimator {
    pub fn new() -> Self {
        RouteAnimator {
            route: None,
            index: 0,
            heading: 0.0,
            phase: Phase::Idle,
            generation: 0,
            heading_blend: DEFAULT_HEADING_BLEND,
        }
    }

    pub fn with_heading_blend(heading_blend: f64) -> Self {
        RouteAnimator {
            heading_blend,
            ..RouteAnimator::new()
        }
    }

    /// Begin animating `route` from its first point. Any running animation is
    /// cancelled first: the generation bump invalidates its tick source, so at
    /// most one driver ever mutates the marker.
    pub fn start(&mut self, route: Route) -> u64 {
        self.route = Some(route);
        self.index = 0;
        self.heading = 0.0;
        self.phase = Phase::Running;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Stop and discard the current animation. Idempotent.
    pub fn cancel(&mut self) {
        if self.phase != Phase::Idle {
            self.route = None;
            self.index = 0;
            self.phase = Phase::Idle;
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick(&mut self) -> TickOutcome {
        let route = match (&self.phase, &self.route) {
            (Phase::Running, Some(route)) => route,
            _ => return TickOutcome::Idle,
        };

        let current = route.point(self.index);
        let next = route.point(self.index + 1);
        // Route construction dedups adjacent points, but a degenerate segment
        // is still a no-op turn rather than a crash.
        if current != next {
            let raw = geo::bearing(&current, &next);
            let turn = geo::shortest_turn(self.heading, raw);
            self.heading = geo::normalize_degrees(self.heading + turn * self.heading_blend);
        }

        self.index += 1;
        let update = MarkerUpdate {
            position: next,
            heading: self.heading,
            index: self.index,
            at_pickup: self.index == route.pickup_index(),
        };
        if self.index + 1 >= route.len() {
            self.phase = Phase::Completed;
            TickOutcome::Completed(update)
        } else {
            TickOutcome::Advanced(update)
        }
    }
}

impl Default for RouteAnimator {
    fn default() -> Self {
        RouteAnimator::new()
    }
}
