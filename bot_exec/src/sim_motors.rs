//! # Simulated drive base
//!
//! Provides a first order model of the drive base so the executable can run without hardware.
//! Each side's wheel velocity lags towards the steady state speed for the applied voltage,
//! and the modelled velocities are fed back as the measured wheel velocities.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use thiserror::Error;

// Internal
use cmd_if::eqpt::{MotorVolts, WheelVels};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drive base parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Steady state wheel speed per applied volt.
    ///
    /// Units: meters/second per volt
    pub gain_ms_per_v: f64,

    /// Time constant of the wheel speed response.
    ///
    /// Units: seconds
    pub tau_s: f64,
}

/// Simulated drive base state.
pub struct SimMotors {
    params: Params,

    /// The modelled wheel velocities.
    vels: WheelVels,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when setting up the simulated drive base.
#[derive(Debug, Error)]
pub enum SimMotorsError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("The time constant must be positive and finite (got {0})")]
    NonPositiveTau(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimMotors {
    /// Create a new simulated drive base from the given parameter file.
    pub fn new(param_file_name: &str) -> Result<Self, SimMotorsError> {
        let params: Params = params::load(param_file_name).map_err(SimMotorsError::ParamLoadError)?;

        Self::with_params(params)
    }

    /// Create a new simulated drive base directly from a parameter struct.
    pub fn with_params(params: Params) -> Result<Self, SimMotorsError> {
        if !(params.tau_s > 0.0) || !params.tau_s.is_finite() {
            return Err(SimMotorsError::NonPositiveTau(params.tau_s));
        }

        Ok(Self {
            params,
            vels: WheelVels::default(),
        })
    }

    /// Advance the model by `dt_s` seconds with the given applied voltages.
    pub fn step(&mut self, volts: &MotorVolts, dt_s: f64) {
        // First order lag towards the steady state speed, with the step fraction clamped so
        // an oversized dt cannot overshoot the steady state
        let alpha = (dt_s / self.params.tau_s).max(0.0).min(1.0);

        self.vels.left_ms += (volts.left_v * self.params.gain_ms_per_v - self.vels.left_ms) * alpha;
        self.vels.right_ms +=
            (volts.right_v * self.params.gain_ms_per_v - self.vels.right_ms) * alpha;
    }

    /// The current wheel velocities, as the encoders would report them.
    pub fn wheel_vels(&self) -> WheelVels {
        self.vels
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    fn test_params() -> Params {
        Params {
            gain_ms_per_v: 0.25,
            tau_s: 0.25,
        }
    }

    #[test]
    fn test_converges_to_steady_state() {
        let mut sim = SimMotors::with_params(test_params()).unwrap();

        let volts = MotorVolts {
            left_v: 4.0,
            right_v: -4.0,
        };

        // 4 V at 0.25 (m/s)/V is 1 m/s steady state
        let mut prev_left = 0.0;
        for _ in 0..100 {
            sim.step(&volts, 0.02);

            let vels = sim.wheel_vels();
            assert!(vels.left_ms >= prev_left);
            assert!(vels.left_ms <= 1.0);
            prev_left = vels.left_ms;
        }

        let vels = sim.wheel_vels();
        assert!((vels.left_ms - 1.0).abs() < 1e-3);
        assert!((vels.right_ms + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_decays_with_no_volts() {
        let mut sim = SimMotors::with_params(test_params()).unwrap();

        sim.step(&MotorVolts { left_v: 12.0, right_v: 12.0 }, 1.0);
        assert!(sim.wheel_vels().left_ms > 0.0);

        for _ in 0..100 {
            sim.step(&MotorVolts::default(), 0.02);
        }
        assert!(sim.wheel_vels().left_ms.abs() < 1e-3);
    }

    #[test]
    fn test_oversized_step_is_stable() {
        let mut sim = SimMotors::with_params(test_params()).unwrap();

        // A dt much larger than tau jumps straight to the steady state, never past it
        sim.step(&MotorVolts { left_v: 4.0, right_v: 4.0 }, 100.0);
        assert_eq!(sim.wheel_vels().left_ms, 1.0);
    }

    #[test]
    fn test_bad_tau_rejected() {
        let params = Params {
            gain_ms_per_v: 0.25,
            tau_s: 0.0,
        };
        assert!(SimMotors::with_params(params).is_err());
    }
}
