//! # Motor driver parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motor driver parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- FEEDFORWARD ----
    /// Static feedforward gain, the voltage needed to overcome static friction.
    ///
    /// Units: volts
    pub ks_v: f64,

    /// Velocity feedforward gain.
    ///
    /// Units: volts per meter/second
    pub kv_v_per_ms: f64,

    // ---- FEEDBACK ----
    /// Proportional gain on the wheel velocity error.
    ///
    /// Units: volts per meter/second
    pub k_p: f64,

    /// Integral gain on the wheel velocity error.
    ///
    /// Units: volts per meter
    pub k_i: f64,

    /// Derivative gain on the wheel velocity error.
    ///
    /// Units: volts per meter/second^2
    pub k_d: f64,

    // ---- OUTPUT STAGE ----
    /// Magnitude the output voltage is clamped to.
    ///
    /// Units: volts
    pub max_volts: f64,

    /// If true the left output sign is flipped to match the motor controller wiring.
    pub invert_left: bool,

    /// If true the right output sign is flipped to match the motor controller wiring.
    pub invert_right: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which indicate an invalid parameter file.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Maximum voltage must be positive and finite (got {0})")]
    NonPositiveMaxVolts(f64),

    #[error("Feedforward and feedback gains must be finite and non-negative")]
    InvalidGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Determines if the parameters are valid.
    ///
    /// If valid `Ok(())` is returned, otherwise the offending parameter's error is given.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if !(self.max_volts > 0.0) || !self.max_volts.is_finite() {
            return Err(ParamsError::NonPositiveMaxVolts(self.max_volts));
        }

        let gains = [self.ks_v, self.kv_v_per_ms, self.k_p, self.k_i, self.k_d];

        if gains.iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(ParamsError::InvalidGains);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    fn valid_params() -> Params {
        Params {
            ks_v: 0.22,
            kv_v_per_ms: 1.98,
            k_p: 8.5,
            k_i: 0.0,
            k_d: 0.0,
            max_volts: 12.0,
            invert_left: false,
            invert_right: false,
        }
    }

    #[test]
    fn test_are_valid() {
        assert!(valid_params().are_valid().is_ok());

        let mut params = valid_params();
        params.max_volts = 0.0;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.k_p = f64::NAN;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.ks_v = -0.1;
        assert!(params.are_valid().is_err());
    }
}
