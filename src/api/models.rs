//! Wire shapes for the trip/analysis backend. Two generations of the backend
//! are in the field with diverging field names and envelope shapes, so every
//! response type here is the superset of both, with accessors that normalize
//! into the crate's own types. All wire geometry is `[lng, lat]`; the
//! inversion to `Coordinate` happens in these accessors and nowhere else.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LocationsPayload {
    /// `{"locations": [{"name": ..., "lat": ..., "lon": ...}]}`
    Named(Vec<NamedLocation>),
    /// `{"locations": {"Gulmohar Park": [72.9118, 19.1342], ...}}` — pairs
    /// are `[lng, lat]`.
    Table(HashMap<String, [f64; 2]>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsResponse {
    locations: LocationsPayload,
}

impl LocationsResponse {
    pub fn into_locations(self) -> Vec<NamedLocation> {
        match self.locations {
            LocationsPayload::Named(list) => list,
            LocationsPayload::Table(table) => {
                let mut list: Vec<NamedLocation> = table
                    .into_iter()
                    .map(|(name, lng_lat)| NamedLocation {
                        name,
                        lat: lng_lat[1],
                        lon: lng_lat[0],
                    })
                    .collect();
                // hash order is not stable, the form wants a stable dropdown
                list.sort_by(|a, b| a.name.cmp(&b.name));
                list
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastTrip {
    #[serde(default)]
    pub next_odometer: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastTripResponse {
    #[serde(default)]
    pub last: Option<LastTrip>,
}

/// Submission body. Both backend generations read their own subset; the
/// duplicated location fields are intentional.
#[derive(Debug, Clone, Serialize)]
pub struct TripRequest {
    pub location_name: String,
    pub pickup_location: String,
    pub patient_name: String,
    pub driver_name: String,
    pub purpose: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub range: Option<f64>,
    #[serde(default)]
    pub count: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub geometry: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripDetails {
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub km_reading_start: Option<f64>,
    #[serde(default)]
    pub km_reading_end: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub total_distance: Option<f64>,
    /// Whole seconds in the newer backend…
    #[serde(default)]
    pub route_seconds: Option<u64>,
    /// …fractional minutes in the older one.
    #[serde(default)]
    pub total_duration: Option<f64>,
    #[serde(default)]
    pub start_odometer: Option<f64>,
    #[serde(default)]
    pub next_odometer: Option<f64>,
    #[serde(default)]
    pub geojson: Option<FeatureCollection>,
    #[serde(default)]
    pub route1: Option<RouteLeg>,
    #[serde(default)]
    pub route2: Option<RouteLeg>,
    #[serde(default)]
    pub trip: Option<TripDetails>,
}

/// Duration as the backend reported it; formatting differs per shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripDuration {
    Seconds(u64),
    FractionalMinutes(f64),
}

impl TripResponse {
    /// The body can carry `success: false` with a 200 status.
    pub fn error_message(&self) -> Option<&str> {
        if self.success == Some(false) || self.error.is_some() {
            Some(self.error.as_deref().unwrap_or("unknown backend error"))
        } else {
            None
        }
    }

    /// Route geometry from whichever shape is present: the single-feature
    /// GeoJSON LineString, or the two legs concatenated. Empty when neither
    /// is there.
    pub fn route_coordinates(&self) -> Vec<Coordinate> {
        if let Some(collection) = &self.geojson {
            for feature in &collection.features {
                if let Geometry::LineString { coordinates } = &feature.geometry {
                    return coordinates
                        .iter()
                        .map(|pair| Coordinate::from_lng_lat(*pair))
                        .collect();
                }
            }
        }
        let mut coordinates = Vec::new();
        for leg in [&self.route1, &self.route2].into_iter().flatten() {
            coordinates.extend(leg.geometry.iter().map(|pair| Coordinate::from_lng_lat(*pair)));
        }
        coordinates
    }

    pub fn duration(&self) -> Option<TripDuration> {
        if let Some(seconds) = self.route_seconds {
            return Some(TripDuration::Seconds(seconds));
        }
        self.total_duration.map(TripDuration::FractionalMinutes)
    }

    pub fn distance_km_value(&self) -> Option<f64> {
        self.distance_km.or(self.total_distance)
    }

    pub fn start_odometer_value(&self) -> Option<f64> {
        self.start_odometer
            .or_else(|| self.trip.as_ref().and_then(|t| t.km_reading_start))
    }

    pub fn next_odometer_value(&self) -> Option<f64> {
        self.next_odometer
            .or_else(|| self.trip.as_ref().and_then(|t| t.km_reading_end))
    }

    pub fn departure_text_raw(&self) -> Option<&str> {
        self.departure_time
            .as_deref()
            .or_else(|| self.trip.as_ref().and_then(|t| t.departure_time.as_deref()))
    }

    pub fn arrival_text_raw(&self) -> Option<&str> {
        self.arrival_time
            .as_deref()
            .or_else(|| self.trip.as_ref().and_then(|t| t.arrival_time.as_deref()))
    }
}

/// One reachable-time band, normalized from either wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneBand {
    pub seconds: u32,
    pub rings: Vec<Vec<Coordinate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleIsochrone {
    pub minutes: u32,
    pub geometry: Vec<[f64; 2]>,
}

// `Simple` is listed first: a bare `FeatureCollection` would match anything
// since all of its fields default.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IsochronesResponse {
    Simple {
        success: bool,
        #[serde(default)]
        isochrones: Vec<SimpleIsochrone>,
        #[serde(default)]
        error: Option<String>,
    },
    Geo(FeatureCollection),
}

impl IsochronesResponse {
    pub fn into_bands(self) -> Vec<IsochroneBand> {
        match self {
            IsochronesResponse::Geo(collection) => collection
                .features
                .into_iter()
                .filter_map(|feature| {
                    let seconds =
                        feature.properties.value.or(feature.properties.range)? as u32;
                    match feature.geometry {
                        Geometry::Polygon { coordinates } => Some(IsochroneBand {
                            seconds,
                            rings: coordinates.into_iter().map(invert_ring).collect(),
                        }),
                        Geometry::LineString { .. } => None,
                    }
                })
                .collect(),
            IsochronesResponse::Simple {
                success,
                isochrones,
                error,
            } => {
                if !success {
                    // optional analytics, absence is not an error
                    info!(
                        "isochrones unavailable: {}",
                        error.as_deref().unwrap_or("no detail")
                    );
                    return Vec::new();
                }
                isochrones
                    .into_iter()
                    .map(|iso| IsochroneBand {
                        seconds: iso.minutes * 60,
                        rings: vec![invert_ring(iso.geometry)],
                    })
                    .collect()
            }
        }
    }
}

/// One route segment with its usage count, normalized from either wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySegment {
    pub line: Vec<Coordinate>,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleFrequencySegment {
    pub coordinates: Vec<[f64; 2]>,
    pub frequency: u64,
    #[serde(default)]
    pub normalized_frequency: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FrequencyResponse {
    Simple {
        success: bool,
        #[serde(default)]
        segments: Vec<SimpleFrequencySegment>,
    },
    Geo(FeatureCollection),
}

impl FrequencyResponse {
    pub fn into_segments(self) -> Vec<FrequencySegment> {
        match self {
            FrequencyResponse::Geo(collection) => collection
                .features
                .into_iter()
                .filter_map(|feature| match feature.geometry {
                    Geometry::LineString { coordinates } => Some(FrequencySegment {
                        line: invert_ring(coordinates),
                        count: feature.properties.count.unwrap_or(0.0).round() as u64,
                    }),
                    Geometry::Polygon { .. } => None,
                })
                .collect(),
            FrequencyResponse::Simple { success, segments } => {
                if !success {
                    return Vec::new();
                }
                segments
                    .into_iter()
                    .map(|segment| FrequencySegment {
                        line: invert_ring(segment.coordinates),
                        count: segment.frequency,
                    })
                    .collect()
            }
        }
    }
}

fn invert_ring(pairs: Vec<[f64; 2]>) -> Vec<Coordinate> {
    pairs.into_iter().map(Coordinate::from_lng_lat).collect()
}
