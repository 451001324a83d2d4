use std::collections::HashMap;

use strum_macros::Display;

use crate::geo::Coordinate;
use crate::layer_styler::Style;
use crate::route::Bounds;

/// Named replaceable overlay layers on the analysis map. Each refresh
/// replaces its layer wholesale; nothing is ever appended to a stale layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OverlayKind {
    Isochrones,
    Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Hospital,
    Start,
    Pickup,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub popup: String,
}

/// The single moving marker. `set_route` recreates it at the route start;
/// ticks only ever move and rotate it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedMarker {
    pub position: Coordinate,
    pub heading: f64,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Line(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
}

impl FeatureGeometry {
    pub fn extend_bounds(&self, bounds: &mut Option<Bounds>) {
        let points: Box<dyn Iterator<Item = &Coordinate>> = match self {
            FeatureGeometry::Line(line) => Box::new(line.iter()),
            FeatureGeometry::Polygon(rings) => Box::new(rings.iter().flatten()),
        };
        for point in points {
            match bounds {
                None => *bounds = Bounds::of(std::slice::from_ref(point)),
                Some(b) => b.extend(point),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFeature {
    pub geometry: FeatureGeometry,
    pub style: Style,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    /// When set, the shell fits these bounds (with `padding_px`) instead of
    /// using `center`.
    pub fitted_bounds: Option<Bounds>,
    pub padding_px: u32,
}

/// Declarative, versioned map state. The rendering shell polls
/// `changed_since` and redraws from the getters instead of receiving push
/// updates.
pub struct MapView {
    hospital_name: String,
    viewport: Viewport,
    route: Vec<Coordinate>,
    markers: Vec<Marker>,
    ambulance: Option<AnimatedMarker>,
    overlays: HashMap<OverlayKind, Vec<OverlayFeature>>,
    version: u64,
    min_bound_span: f64,
}

/// Below this degree span, fitting would zoom onto a single point.
pub const DEFAULT_MIN_BOUND_SPAN: f64 = 0.001;

pub const ROUTE_COLOR: &str = "#0066ff";

impl MapView {
    pub fn new(hospital: Coordinate, hospital_name: &str, padding_px: u32) -> Self {
        let hospital_marker = Marker {
            kind: MarkerKind::Hospital,
            position: hospital,
            popup: hospital_name.to_string(),
        };
        MapView {
            hospital_name: hospital_name.to_string(),
            viewport: Viewport {
                center: hospital,
                fitted_bounds: None,
                padding_px,
            },
            route: Vec::new(),
            markers: vec![hospital_marker],
            ambulance: None,
            overlays: HashMap::new(),
            version: 0,
            min_bound_span: DEFAULT_MIN_BOUND_SPAN,
        }
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Replace the route polyline and its transient markers. The previous
    /// route's start/pickup/end markers and animated marker are always
    /// cleared first; an invalid route is logged and changes nothing.
    pub fn set_route(&mut self, latlngs: &[Coordinate]) {
        if latlngs.len() < 2 {
            warn!("ignoring route with fewer than 2 points");
            return;
        }
        self.clear_route();

        self.route = latlngs.to_vec();
        let start = latlngs[0];
        let pickup = latlngs[latlngs.len() / 2];
        let end = latlngs[latlngs.len() - 1];
        self.markers.push(Marker {
            kind: MarkerKind::Start,
            position: start,
            popup: format!("{} (Start)", self.hospital_name),
        });
        self.markers.push(Marker {
            kind: MarkerKind::Pickup,
            position: pickup,
            popup: "Pickup Location".to_string(),
        });
        self.markers.push(Marker {
            kind: MarkerKind::End,
            position: end,
            popup: format!("{} (Return)", self.hospital_name),
        });
        self.ambulance = Some(AnimatedMarker {
            position: start,
            heading: 0.0,
            popup: None,
        });

        if let Some(bounds) = Bounds::of(latlngs) {
            self.fit_to_bounds(bounds);
        }
        self.bump();
    }

    /// Drop the route polyline and every marker tied to it. The hospital
    /// marker stays.
    pub fn clear_route(&mut self) {
        self.route.clear();
        self.markers.retain(|m| m.kind == MarkerKind::Hospital);
        self.ambulance = None;
        self.bump();
    }

    /// Move and rotate the single animated marker. Never creates a second
    /// one; ignored when no route is shown.
    pub fn update_animated_marker(&mut self, position: Coordinate, heading: f64) {
        match &mut self.ambulance {
            None => warn!("animated marker update with no route on display"),
            Some(marker) => {
                marker.position = position;
                marker.heading = heading;
            }
        }
        self.bump();
    }

    pub fn set_ambulance_popup(&mut self, text: &str) {
        if let Some(marker) = &mut self.ambulance {
            marker.popup = Some(text.to_string());
            self.bump();
        }
    }

    /// Wholesale replacement of a named overlay. An empty feature list clears
    /// the layer; there is nothing to draw and no error to report.
    pub fn set_overlay(&mut self, kind: OverlayKind, features: Vec<OverlayFeature>) {
        if features.is_empty() {
            if self.overlays.remove(&kind).is_some() {
                info!("cleared empty {kind} overlay");
            }
        } else {
            self.overlays.insert(kind, features);
        }
        self.bump();
    }

    /// Adjust the viewport to the given bounds, unless the span is so small
    /// that fitting would degenerate into a zoom-to-point.
    pub fn fit_to_bounds(&mut self, bounds: Bounds) {
        if bounds.span() < self.min_bound_span {
            return;
        }
        self.viewport.center = bounds.center();
        self.viewport.fitted_bounds = Some(bounds);
        self.bump();
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn changed_since(&self, client_version: Option<u64>) -> bool {
        client_version != Some(self.version)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    pub fn route_style(&self) -> Style {
        Style {
            color: ROUTE_COLOR,
            fill_color: None,
            fill_opacity: 0.0,
            weight: 5,
            opacity: 0.7,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn ambulance(&self) -> Option<&AnimatedMarker> {
        self.ambulance.as_ref()
    }

    pub fn overlay(&self, kind: OverlayKind) -> Option<&[OverlayFeature]> {
        self.overlays.get(&kind).map(|f| f.as_slice())
    }
}
