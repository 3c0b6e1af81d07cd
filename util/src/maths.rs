//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// The mapping is linear and not clamped, values beyond the source range map beyond the
/// target range.
pub fn lin_map<T: Float>(source_range: (T, T), target_range: (T, T), value: T) -> T {
    let (x0, x1) = source_range;
    let (y0, y1) = target_range;

    y0 + (value - x0) * (y1 - y0) / (x1 - x0)
}

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T: Float>(value: &T, min: &T, max: &T) -> T {
    if *value > *max {
        return *max;
    }

    if *value < *min {
        return *min;
    }

    *value
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 10f64), 0.5f64), 5f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 0f64), 0.5f64);
        assert_eq!(lin_map((0.05f64, 1f64), (0f64, 1f64), 1f64), 1f64);

        // Mapping is linear beyond the source range too
        assert_eq!(lin_map((0f64, 1f64), (0f64, 2f64), 2f64), 4f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-2f64, &-1f64, &1f64), -1f64);
        assert_eq!(clamp(&0.3f64, &-1f64, &1f64), 0.3f64);
    }
}
