//! Off-nominal roll from commanded attitude.

use crate::states::StatesTable;
use crate::time::SECONDS_PER_DAY;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// CXC seconds at J2000.0 (2000-01-01T12:00:00 TT).
const J2000_SECS: f64 = 63_115_200.0;

/// Unit vector to the Sun in ECI (mean equator of date), from the
/// low-precision solar ephemeris. Good to about 0.01 deg.
pub fn sun_eci(time: f64) -> Vector3<f64> {
    let n = (time - J2000_SECS) / SECONDS_PER_DAY;
    let mean_longitude = (280.460 + 0.985_647_4 * n).to_radians();
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let ecliptic_longitude = mean_longitude
        + (1.915_f64.to_radians()) * mean_anomaly.sin()
        + (0.020_f64.to_radians()) * (2.0 * mean_anomaly).sin();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    Vector3::new(
        ecliptic_longitude.cos(),
        obliquity.cos() * ecliptic_longitude.sin(),
        obliquity.sin() * ecliptic_longitude.sin(),
    )
}

/// Body-to-ECI attitude of a scalar-last quaternion. A zero quaternion
/// maps to the identity.
pub fn attitude(q: [f64; 4]) -> UnitQuaternion<f64> {
    let [x, y, z, w] = q;
    UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f64::EPSILON).unwrap_or_else(UnitQuaternion::identity)
}

/// Roll of the Sun about the body X axis away from the nominal (Sun in the
/// body X-Z half plane), degrees in `(-180, 180]`.
pub fn off_nominal_roll(q: [f64; 4], time: f64) -> f64 {
    let sun = attitude(q).inverse_transform_vector(&sun_eci(time));
    sun.y.atan2(sun.z).to_degrees()
}

/// Off-nominal roll of every state, evaluated at the state mid time.
pub fn calc_off_nom_rolls(states: &StatesTable) -> Vec<f64> {
    states
        .records()
        .iter()
        .map(|record| off_nominal_roll(record.quaternion(), record.midpoint()))
        .collect()
}
