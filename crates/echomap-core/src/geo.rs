//! Geographic centroid and the Roaming mode classifier.
//!
//! The centroid of a place is the arithmetic mean of the positions of all
//! records eligible under the context filter. A user farther than the
//! threshold from it is "homesick" and gets everyday-life sounds; a user at
//! or within it is an "explorer" and gets landmark sounds. With no eligible
//! records there is no centroid and the mode defaults to explorer.

use serde::{Deserialize, Serialize};

use crate::defaults::EARTH_RADIUS_METERS;
use crate::keywords::{KeywordSet, KeywordSets};
use crate::models::GeoPoint;

/// Arithmetic mean of a set of positions (mean latitude, mean longitude).
///
/// Returns `None` for an empty set.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    for p in points {
        count += 1;
        lat_sum += p.latitude;
        lon_sum += p.longitude;
    }
    if count == 0 {
        return None;
    }
    Some(GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64))
}

/// Great-circle distance in meters on a sphere (haversine).
pub fn great_circle_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Which keyword set the Roaming strategy ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoamingMode {
    /// Far from the place: domestic, everyday-life sounds.
    Homesick,
    /// At or near the place, or no reference point: landmark sounds.
    Explorer,
}

impl RoamingMode {
    /// Classify by distance; a distance equal to the threshold is explorer.
    pub fn from_distance(distance_m: f64, threshold_m: f64) -> Self {
        if distance_m > threshold_m {
            Self::Homesick
        } else {
            Self::Explorer
        }
    }

    /// The keyword set this mode ranks by.
    pub fn keyword_set<'a>(&self, sets: &'a KeywordSets) -> &'a KeywordSet {
        match self {
            Self::Homesick => &sets.homesick,
            Self::Explorer => &sets.explorer,
        }
    }
}

impl std::fmt::Display for RoamingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Homesick => write!(f, "homesick"),
            Self::Explorer => write!(f, "explorer"),
        }
    }
}

/// Outcome of classifying a user against an eligible set's centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoamingClassification {
    pub mode: RoamingMode,
    pub centroid: Option<GeoPoint>,
    /// Distance to the centroid, `None` when the centroid is undefined.
    pub distance_m: Option<f64>,
}

/// Classify a user position relative to a (possibly undefined) centroid.
pub fn classify(
    centroid: Option<GeoPoint>,
    user: &GeoPoint,
    threshold_m: f64,
) -> RoamingClassification {
    match centroid {
        None => RoamingClassification {
            mode: RoamingMode::Explorer,
            centroid: None,
            distance_m: None,
        },
        Some(c) => {
            let distance = great_circle_distance_m(user, &c);
            RoamingClassification {
                mode: RoamingMode::from_distance(distance, threshold_m),
                centroid: Some(c),
                distance_m: Some(distance),
            }
        }
    }
}
