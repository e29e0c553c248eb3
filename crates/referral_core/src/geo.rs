//! Geographic primitives: geocoded graph nodes and Haversine distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Which side of the referral problem a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Patient,
    Hospital,
}

/// A geocoded node of the proximity graph.
///
/// Ids are unique across both kinds; the loader is responsible for that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub kind: NodeKind,
}

impl GeoPoint {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            kind,
        }
    }

    pub fn patient(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self::new(id, lat, lon, NodeKind::Patient)
    }

    pub fn hospital(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self::new(id, lat, lon, NodeKind::Hospital)
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great-circle distance in kilometres between two lat/lon pairs (degrees).
///
/// Coordinates are not range-checked.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1) = (lat1.to_radians(), lon1.to_radians());
    let (lat2, lon2) = (lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lima_to_callao_is_about_eight_km() {
        // Plaza Mayor de Lima -> Callao port
        let d = haversine_km(-12.0464, -77.0428, -12.0566, -77.1181);
        assert!((d - 8.2).abs() < 0.5, "unexpected distance {d}");
    }

    #[test]
    fn symmetric_and_zero_on_same_point() {
        let a = GeoPoint::patient("P1", -12.05, -77.04);
        let b = GeoPoint::hospital("H1", -16.40, -71.54);
        assert_eq!(a.distance_km(&b), b.distance_km(&a));
        assert_eq!(a.distance_km(&a), 0.0);
        assert!(a.distance_km(&b) > 700.0);
    }

    #[test]
    fn out_of_range_coordinates_are_accepted() {
        let d = haversine_km(95.0, 200.0, -95.0, -200.0);
        assert!(d.is_finite());
        assert!(d >= 0.0);
    }
}
