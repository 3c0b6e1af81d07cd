//! # Wheel velocity controllers
//!
//! Provides the feedforward model and PID controller used by MotDriver to turn a wheel
//! velocity demand and measurement into a motor voltage. Both are driven with an explicit
//! time value so the executable's cycle clock stays the single source of time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// The time passed to the previous `get` call, or `None` before the first call.
    ///
    /// Units: seconds in the caller's monotonic timeline
    prev_time_s: Option<f64>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// A simple motor feedforward model, a static term overcoming friction plus a term
/// proportional to the demanded velocity.
#[derive(Debug, Serialize, Clone)]
pub struct MotorFeedforward {
    /// Static gain, the voltage needed to overcome static friction.
    ///
    /// Units: volts
    ks_v: f64,

    /// Velocity gain.
    ///
    /// Units: volts per meter/second
    kv_v_per_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            prev_time_s: None,
            k_p,
            k_i,
            k_d,
            prev_error: None,
            integral: 0f64,
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `time_s` is the caller's monotonic run time, used to compute the step length for the
    /// integral and derivative terms. The first call after construction or a reset produces a
    /// purely proportional output since no step length is known yet.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // Step length since the last call, `None` on the first call or if time went backwards
        let dt_s = match self.prev_time_s {
            Some(t) if time_s > t => Some(time_s - t),
            _ => None,
        };

        // Accumulate the integral term. If there's no step length there is nothing to
        // accumulate over.
        self.integral += match dt_s {
            Some(dt) => error * dt,
            None => 0f64,
        };

        // Calculate the derivative of the error
        let derivative = match (self.prev_error, dt_s) {
            (Some(prev_error), Some(dt)) => (error - prev_error) / dt,
            _ => 0f64,
        };

        let out = self.k_p * error + self.k_i * self.integral + self.k_d * derivative;

        self.prev_error = Some(error);
        self.prev_time_s = Some(time_s);

        out
    }

    /// Clear the accumulated state, as used when the loop is reopened over a safe period.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
        self.prev_time_s = None;
    }
}

impl MotorFeedforward {
    /// Create a new feedforward model with the given gains.
    pub fn new(ks_v: f64, kv_v_per_ms: f64) -> Self {
        Self { ks_v, kv_v_per_ms }
    }

    /// Calculate the feedforward voltage for a velocity demand.
    ///
    /// A zero demand produces exactly zero volts, the static term only acts once a direction
    /// is commanded.
    pub fn calculate(&self, vel_ms: f64) -> f64 {
        if vel_ms == 0.0 {
            0.0
        }
        else {
            self.ks_v * vel_ms.signum() + self.kv_v_per_ms * vel_ms
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_pid_proportional() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);

        // First call has no step length, so only the proportional term acts
        assert_eq!(pid.get(1.5, 0.0), 3.0);
        assert_eq!(pid.get(-0.5, 1.0), -1.0);
    }

    #[test]
    fn test_pid_integral() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        // No accumulation on the first call
        assert_eq!(pid.get(2.0, 0.0), 0.0);

        // then the error integrates over each step
        assert_eq!(pid.get(2.0, 1.0), 2.0);
        assert_eq!(pid.get(2.0, 2.0), 4.0);

        // Reset clears the accumulation
        pid.reset();
        assert_eq!(pid.get(2.0, 3.0), 0.0);
    }

    #[test]
    fn test_pid_derivative() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);

        assert_eq!(pid.get(1.0, 0.0), 0.0);

        // Error rose by 2 over 1 second
        assert_eq!(pid.get(3.0, 1.0), 2.0);

        // Constant error has zero derivative
        assert_eq!(pid.get(3.0, 2.0), 0.0);
    }

    #[test]
    fn test_pid_time_going_backwards() {
        let mut pid = PidController::new(0.0, 1.0, 1.0);

        pid.get(1.0, 5.0);

        // A sample from the past must not integrate or differentiate over a negative step
        assert_eq!(pid.get(1.0, 4.0), 0.0);
    }

    #[test]
    fn test_feedforward() {
        let ff = MotorFeedforward::new(0.5, 2.0);

        // Zero demand gives exactly zero volts
        assert_eq!(ff.calculate(0.0), 0.0);

        // The static term follows the demand direction
        assert_eq!(ff.calculate(1.0), 2.5);
        assert_eq!(ff.calculate(-1.0), -2.5);
        assert_eq!(ff.calculate(0.25), 1.0);
    }
}
