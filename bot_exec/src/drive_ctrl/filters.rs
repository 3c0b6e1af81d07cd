//! # Input conditioning filters
//!
//! Provides the filters used by DriveCtrl to condition wheel speed demands:
//!
//! - [`SlewLimiter`] - an asymmetric rate limiter bounding how fast a demand may change.
//! - [`MedianFilter`] - a windowed median used to knock single sample spikes off the raw
//!   stick axes.
//!
//! Both filters are driven with an explicit time value rather than reading a clock themselves,
//! so the executable's cycle clock stays the single source of time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Standard
use std::collections::VecDeque;

// External
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rate limiter with independent limits for each direction of change.
///
/// On each [`SlewLimiter::calculate`] call the change from the previously output value is
/// clamped to `limit * elapsed`, where `elapsed` is the time since the last call (negative
/// elapsed times are treated as zero).
///
/// Caution: the accel limit bounds *falling* demands and the decel limit *rising* ones. The
/// pairing reads inverted for a forward-positive signal but is kept this way so existing drive
/// tuning values keep their meaning. Do not swap the limits silently.
#[derive(Debug, Clone)]
pub struct SlewLimiter {
    /// Limit applied when the demand is falling.
    ///
    /// Units: units/second
    accel_limit_units_s: f64,

    /// Limit applied when the demand is rising.
    ///
    /// Units: units/second
    decel_limit_units_s: f64,

    /// The value output by the previous `calculate` (or set by the previous `reset`).
    prev_value: f64,

    /// The time passed to the previous `calculate` or `reset` call.
    ///
    /// Units: seconds in the caller's monotonic timeline
    prev_time_s: f64,
}

/// A median filter over a fixed window of samples.
///
/// Until the window is full the median is taken over the samples seen so far. A window of 1
/// makes the filter a pass-through.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    /// Maximum number of samples the window holds.
    window: usize,

    /// The samples currently in the window, oldest first.
    samples: VecDeque<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when constructing a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Slew limits must be positive and finite (got accel {0}, decel {1})")]
    NonPositiveSlewLimit(f64, f64),

    #[error("Median filter window must be at least 1 (got {0})")]
    WindowTooSmall(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SlewLimiter {
    /// Create a new limiter holding `initial_value` at `time_s`.
    ///
    /// Fails if either limit is non-positive or non-finite. A zero limit would pin the output
    /// forever.
    pub fn new(
        accel_limit_units_s: f64,
        decel_limit_units_s: f64,
        initial_value: f64,
        time_s: f64,
    ) -> Result<Self, FilterError> {
        if !(accel_limit_units_s > 0.0)
            || !(decel_limit_units_s > 0.0)
            || !accel_limit_units_s.is_finite()
            || !decel_limit_units_s.is_finite()
        {
            return Err(FilterError::NonPositiveSlewLimit(
                accel_limit_units_s,
                decel_limit_units_s,
            ));
        }

        Ok(Self {
            accel_limit_units_s,
            decel_limit_units_s,
            prev_value: initial_value,
            prev_time_s: time_s,
        })
    }

    /// Limit the rate of change of `input` and return the new output value.
    ///
    /// `time_s` is the caller's monotonic run time. A call with the same time as the previous
    /// one allows no change at all. There is no upper bound on the elapsed time, after a long
    /// stall the allowed step is correspondingly large.
    pub fn calculate(&mut self, input: f64, time_s: f64) -> f64 {
        // A backwards step in time allows no change, same as no time at all
        let elapsed_s = (time_s - self.prev_time_s).max(0.0);

        let delta = input - self.prev_value;

        // Select the active limit, falling demands use the accel limit (see the struct docs)
        let limit = if delta < 0.0 {
            self.accel_limit_units_s
        }
        else {
            self.decel_limit_units_s
        };

        let max_delta = limit * elapsed_s;

        self.prev_value += delta.max(-max_delta).min(max_delta);
        self.prev_time_s = time_s;

        self.prev_value
    }

    /// Force the output to `value` immediately, bypassing the rate limit.
    ///
    /// Used when the state of the controlled mechanism changes outside the limiter's control,
    /// for example on a stop command.
    pub fn reset(&mut self, value: f64, time_s: f64) {
        self.prev_value = value;
        self.prev_time_s = time_s;
    }
}

impl MedianFilter {
    /// Create a new filter with the given window length.
    pub fn new(window: usize) -> Result<Self, FilterError> {
        if window < 1 {
            return Err(FilterError::WindowTooSmall(window));
        }

        Ok(Self {
            window,
            samples: VecDeque::with_capacity(window),
        })
    }

    /// Push a sample into the window and return the median of the samples held.
    ///
    /// For an even number of samples the mean of the two middle values is returned.
    pub fn calculate(&mut self, input: f64) -> f64 {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(input);

        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let num_samples = sorted.len();

        if num_samples % 2 == 1 {
            sorted[num_samples / 2]
        }
        else {
            0.5 * (sorted[num_samples / 2 - 1] + sorted[num_samples / 2])
        }
    }

    /// Forget all held samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_slew_limiter_bounds() {
        let mut limiter = SlewLimiter::new(2.0, 4.0, 0.0, 0.0).unwrap();

        // Rising demands are bounded by the decel limit
        assert_eq!(limiter.calculate(10.0, 1.0), 4.0);

        // and keep converging while the demand holds
        assert_eq!(limiter.calculate(10.0, 2.0), 8.0);
        assert_eq!(limiter.calculate(10.0, 3.0), 10.0);

        // Falling demands are bounded by the accel limit
        assert_eq!(limiter.calculate(0.0, 4.0), 8.0);

        // An in-bounds change passes through unmodified
        assert_eq!(limiter.calculate(7.5, 5.0), 7.5);
    }

    #[test]
    fn test_slew_limiter_time_handling() {
        let mut limiter = SlewLimiter::new(1.0, 1.0, 0.0, 0.0).unwrap();

        // Zero elapsed time allows no change
        assert_eq!(limiter.calculate(1.0, 0.0), 0.0);

        // A backwards time step also allows no change, but moves the baseline, so the
        // following sample sees one second of elapsed time
        assert_eq!(limiter.calculate(1.0, -5.0), 0.0);
        assert_eq!(limiter.calculate(1.0, -4.0), 1.0);

        // A long stall widens the allowed step, there is no cap on elapsed time
        let mut limiter = SlewLimiter::new(1.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(limiter.calculate(5.0, 10.0), 5.0);
    }

    #[test]
    fn test_slew_limiter_reset() {
        let mut limiter = SlewLimiter::new(0.5, 0.5, 0.0, 0.0).unwrap();

        assert_eq!(limiter.calculate(1.0, 1.0), 0.5);

        // Reset moves the output instantly, the following sample ramps from the reset value
        limiter.reset(-3.0, 1.0);
        assert_eq!(limiter.calculate(-3.0, 2.0), -3.0);
        assert_eq!(limiter.calculate(0.0, 3.0), -2.5);
    }

    #[test]
    fn test_slew_limiter_bad_limits() {
        assert!(SlewLimiter::new(0.0, 1.0, 0.0, 0.0).is_err());
        assert!(SlewLimiter::new(1.0, -2.0, 0.0, 0.0).is_err());
        assert!(SlewLimiter::new(f64::NAN, 1.0, 0.0, 0.0).is_err());
        assert!(SlewLimiter::new(1.0, f64::INFINITY, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_median_filter() {
        // A window of 1 is a pass-through
        let mut filter = MedianFilter::new(1).unwrap();
        assert_eq!(filter.calculate(3.0), 3.0);
        assert_eq!(filter.calculate(-7.0), -7.0);

        // A window of 3 rejects a single sample spike
        let mut filter = MedianFilter::new(3).unwrap();
        assert_eq!(filter.calculate(0.0), 0.0);
        assert_eq!(filter.calculate(0.0), 0.0);
        assert_eq!(filter.calculate(10.0), 0.0);

        // but follows a sustained change
        assert_eq!(filter.calculate(10.0), 10.0);

        // Reset forgets the history
        filter.reset();
        assert_eq!(filter.calculate(-5.0), -5.0);

        // Even windows return the mean of the middle pair
        let mut filter = MedianFilter::new(4).unwrap();
        filter.calculate(1.0);
        filter.calculate(2.0);
        filter.calculate(3.0);
        assert_eq!(filter.calculate(4.0), 2.5);

        // Zero length windows are rejected
        assert!(MedianFilter::new(0).is_err());
    }
}
