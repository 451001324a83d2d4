use anyhow::Result;
use itertools::Itertools;

use crate::geo::{self, Coordinate};

/// An ordered sequence of at least two coordinates with no degenerate
/// (zero-length) segments. Built from a trip submission response and discarded
/// when the next trip replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    /// Adjacent duplicates are dropped on construction so every remaining
    /// segment has a well-defined bearing.
    pub fn new(points: Vec<Coordinate>) -> Result<Self> {
        let points: Vec<Coordinate> = points.into_iter().dedup().collect();
        if points.len() < 2 {
            bail!(
                "route needs at least 2 distinct points, got {}",
                points.len()
            );
        }
        Ok(Route { points })
    }

    /// Road snapping can move the routed start away from the hospital. When
    /// the gap exceeds `max_gap_meters`, prepend the anchor so the animated
    /// marker always departs from the hospital itself.
    pub fn with_anchored_start(
        mut points: Vec<Coordinate>,
        anchor: Coordinate,
        max_gap_meters: f64,
    ) -> Result<Self> {
        if let Some(first) = points.first().copied() {
            let gap = geo::planar_distance_meters(&first, &anchor);
            if gap > max_gap_meters {
                info!("route start is {:.0}m from the anchor, prepending it", gap);
                points.insert(0, anchor);
            }
        }
        Route::new(points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, index: usize) -> Coordinate {
        self.points[index]
    }

    pub fn last(&self) -> Coordinate {
        *self.points.last().unwrap()
    }

    /// The designated waypoint for the pickup popup: the route goes
    /// hospital -> pickup -> hospital, so the midpoint is the pickup.
    pub fn pickup_index(&self) -> usize {
        self.points.len() / 2
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::of(&self.points).unwrap()
    }
}

/// Axis-aligned lat/lng rectangle for viewport fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn of(points: &[Coordinate]) -> Option<Bounds> {
        let first = points.first()?;
        let mut bounds = Bounds {
            south: first.latitude,
            west: first.longitude,
            north: first.latitude,
            east: first.longitude,
        };
        for point in &points[1..] {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: &Coordinate) {
        self.south = self.south.min(point.latitude);
        self.west = self.west.min(point.longitude);
        self.north = self.north.max(point.latitude);
        self.east = self.east.max(point.longitude);
    }

    pub fn merge(&mut self, other: &Bounds) {
        self.south = self.south.min(other.south);
        self.west = self.west.min(other.west);
        self.north = self.north.max(other.north);
        self.east = self.east.max(other.east);
    }

    /// Larger of the two degree spans, used for the degenerate-zoom guard.
    pub fn span(&self) -> f64 {
        (self.north - self.south).max(self.east - self.west)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    #[test]
    fn rejects_short_routes() {
        assert!(Route::new(vec![]).is_err());
        assert!(Route::new(vec![c(1.0, 1.0)]).is_err());
        // all duplicates collapse to a single point
        assert!(Route::new(vec![c(1.0, 1.0), c(1.0, 1.0)]).is_err());
    }

    #[test]
    fn dedups_adjacent_points() {
        let route =
            Route::new(vec![c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0), c(0.0, 1.0)]).unwrap();
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn anchored_start_prepends_when_far() {
        let anchor = c(19.1309507, 72.9146062);
        // ~1 km north of the anchor
        let far = c(19.14, 72.9146062);
        let route =
            Route::with_anchored_start(vec![far, c(19.15, 72.92)], anchor, 50.0).unwrap();
        assert_eq!(route.len(), 3);
        assert_eq!(route.point(0), anchor);

        // a start within the gap is left alone
        let near = c(19.13097, 72.91461);
        let route =
            Route::with_anchored_start(vec![near, c(19.15, 72.92)], anchor, 50.0).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.point(0), near);
    }

    #[test]
    fn pickup_index_is_midpoint() {
        let route = Route::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(0.0, 2.0)]).unwrap();
        assert_eq!(route.pickup_index(), 1);
        let route =
            Route::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(0.0, 2.0), c(0.0, 3.0)]).unwrap();
        assert_eq!(route.pickup_index(), 2);
    }

    #[test]
    fn bounds_cover_all_points() {
        let route = Route::new(vec![c(1.0, 5.0), c(-2.0, 7.0), c(0.5, 6.0)]).unwrap();
        let bounds = route.bounds();
        assert_eq!(bounds.south, -2.0);
        assert_eq!(bounds.north, 1.0);
        assert_eq!(bounds.west, 5.0);
        assert_eq!(bounds.east, 7.0);
        assert_eq!(bounds.span(), 3.0);
    }
}
