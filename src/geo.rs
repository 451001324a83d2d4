/// A WGS84 position in degrees. Immutable value, cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// GeoJSON and the routing service order pairs as `[lng, lat]`. Every
    /// wire geometry goes through here so the inversion happens exactly once.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Coordinate {
            latitude: pair[1],
            longitude: pair[0],
        }
    }
}

// Rough meters per degree of latitude, same scale the proximity checks in the
// web frontend used. Good enough for the short-range gating this is for.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Initial great-circle bearing from `from` to `to`, degrees in `[0, 360)`.
/// Undefined for equal points; callers guard (the animator skips degenerate
/// segments).
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let d_lon = (to.longitude - from.longitude).to_radians();
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Equirectangular distance approximation, longitude scaled by cos(lat).
/// Only valid for short ranges (<5 km); trip distances come from the backend.
pub fn planar_distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (a.latitude - b.latitude) * METERS_PER_DEGREE;
    let d_lng =
        (a.longitude - b.longitude) * METERS_PER_DEGREE * a.latitude.to_radians().cos();
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}

pub fn normalize_degrees(deg: f64) -> f64 {
    let normalized = deg % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

/// Signed smallest rotation from `from` to `to`, in `(-180, 180]`.
pub fn shortest_turn(from: f64, to: f64) -> f64 {
    let mut diff = to - from;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_f64_near;

    #[test]
    fn bearing_sign_convention() {
        let origin = Coordinate::new(0.0, 0.0);
        let east = Coordinate::new(0.0, 1.0);
        let north = Coordinate::new(1.0, 0.0);
        assert_f64_near!(bearing(&origin, &east), 90.0);
        assert_f64_near!(bearing(&origin, &north), 0.0);
        assert_f64_near!(bearing(&east, &origin), 270.0);
        assert_f64_near!(bearing(&north, &origin), 180.0);
    }

    #[test]
    fn bearing_is_normalized() {
        let a = Coordinate::new(19.1309507, 72.9146062);
        let b = Coordinate::new(19.1342, 72.9118);
        let result = bearing(&a, &b);
        assert!((0.0..360.0).contains(&result));
    }

    #[test]
    fn planar_distance_scale() {
        // One degree of latitude is about 111 km.
        let a = Coordinate::new(19.0, 72.9);
        let b = Coordinate::new(20.0, 72.9);
        let d = planar_distance_meters(&a, &b);
        assert!((d - 111_000.0).abs() < 1.0);

        let same = planar_distance_meters(&a, &a);
        assert_f64_near!(same, 0.0);
    }

    #[test]
    fn shortest_turn_wraps() {
        assert_f64_near!(shortest_turn(350.0, 10.0), 20.0);
        assert_f64_near!(shortest_turn(10.0, 350.0), -20.0);
        assert_f64_near!(shortest_turn(0.0, 180.0), 180.0);
    }

    #[test]
    fn from_lng_lat_inverts() {
        let c = Coordinate::from_lng_lat([72.9146062, 19.1309507]);
        assert_f64_near!(c.latitude, 19.1309507);
        assert_f64_near!(c.longitude, 72.9146062);
    }
}
