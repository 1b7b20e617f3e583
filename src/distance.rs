//! Great-circle distance and the startup self-test that guards axis order and units.

use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::models::GeoCoord;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Canonical pair checked at startup: two points ~100 m apart in Enseada do Suá
pub const SELF_TEST_FROM: (f64, f64) = (-20.315146, -40.288799);
pub const SELF_TEST_TO: (f64, f64) = (-20.314758, -40.289660);
pub const SELF_TEST_EXPECTED_M: f64 = 99.6116927217669;
pub const SELF_TEST_TOLERANCE_M: f64 = 0.01;

/// Haversine distance in meters
pub fn haversine_distance(a: &GeoCoord, b: &GeoCoord) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let delta_phi = (b.lat() - a.lat()).to_radians();
    let delta_lambda = (b.lon() - a.lon()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push antipodal pairs just past 1
    let h = h.min(1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Verify the distance calculation against the canonical reference pair
pub fn self_test() -> Result<()> {
    let from = GeoCoord::new(SELF_TEST_FROM.0, SELF_TEST_FROM.1)?;
    let to = GeoCoord::new(SELF_TEST_TO.0, SELF_TEST_TO.1)?;
    let actual = haversine_distance(&from, &to);

    if (actual - SELF_TEST_EXPECTED_M).abs() > SELF_TEST_TOLERANCE_M {
        error!("Distance self-test failed: {} m", actual);
        return Err(Error::SelfTestFailed {
            expected: SELF_TEST_EXPECTED_M,
            actual,
            tolerance: SELF_TEST_TOLERANCE_M,
        });
    }

    debug!("Distance self-test passed: {} m", actual);
    Ok(())
}
