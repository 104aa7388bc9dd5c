use crate::models::{BoundingBox, GeoPoint};

/// Earth's mean radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per statute mile
const KM_PER_MILE: f64 = 1.60934;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

impl GeoPoint {
    /// Great-circle distance to `other`, or None if either point has a
    /// non-finite component
    pub fn distance_km(&self, other: &GeoPoint) -> Option<f64> {
        if !self.is_finite() || !other.is_finite() {
            return None;
        }

        Some(haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ))
    }
}

#[inline]
pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

/// Slack on each side of the box so points on the boundary survive rounding
const BOX_MARGIN_DEG: f64 = 1e-9;

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used to reject clearly distant candidates before
/// the exact check. The box circumscribes the spherical cap of `radius_km`:
/// latitude reach is the angular radius `d = r / R`, longitude reach is
/// `asin(sin d / cos lat)`. When that has no solution the cap covers a pole
/// and the box spans every longitude, which [`BoundingBox::wraps`] reports.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees() + BOX_MARGIN_DEG;

    let reach = angular.sin() / lat.to_radians().cos().abs();
    let lon_delta = if angular < std::f64::consts::FRAC_PI_2 && reach < 1.0 {
        reach.asin().to_degrees() + BOX_MARGIN_DEG
    } else {
        180.0
    };

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

impl BoundingBox {
    /// The box crosses a pole or the antimeridian, so plain min/max
    /// comparison would reject points that are actually inside the radius
    pub fn wraps(&self) -> bool {
        !(self.min_lat > -90.0
            && self.max_lat < 90.0
            && self.min_lon >= -180.0
            && self.max_lon <= 180.0)
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}
