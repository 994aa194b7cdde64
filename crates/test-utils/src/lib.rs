//! Shared test utilities for the streetview-harvester workspace.
//!
//! Provides:
//! - Approximate float/coordinate assertions
//! - Region, metadata and config fixtures
//! - Temporary output directories
//!
//! The crate deliberately has no dependency on workspace crates so it can be
//! used as a dev-dependency by all of them.

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of a point's `lat`/`lon` fields against a pair.
///
/// ```ignore
/// use test_utils::assert_point_approx_eq;
///
/// assert_point_approx_eq!(points[3], (37.5, -122.25), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_point_approx_eq {
    ($point:expr, ($lat:expr, $lon:expr), $epsilon:expr) => {{
        let point = $point;
        $crate::assert_approx_eq!(point.lat, $lat, $epsilon);
        $crate::assert_approx_eq!(point.lon, $lon, $epsilon);
    }};
}

/// Tolerance used for degree comparisons in tests.
pub const DEGREE_EPSILON: f64 = 1e-9;

#[cfg(test)]
mod tests {
    struct P {
        lat: f64,
        lon: f64,
    }

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-122.4, -122.400000001, 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_point_approx_eq() {
        let p = P {
            lat: 37.0000000001,
            lon: -122.0,
        };
        assert_point_approx_eq!(p, (37.0, -122.0), super::DEGREE_EPSILON);
    }
}
