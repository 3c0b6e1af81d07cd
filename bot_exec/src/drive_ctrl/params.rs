//! # Drive control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- STICK CONDITIONING ----
    /// Stick values with magnitude at or below this are treated as zero.
    ///
    /// Units: normalised stick fraction (0 to 1)
    pub deadband: f64,

    /// If true the stick axes are squared (keeping sign) ahead of mixing, giving finer control
    /// near the centre of the stick.
    pub square_inputs: bool,

    /// Window length of the median filter on the raw stick axes. A window of 1 disables the
    /// filter.
    pub median_filter_window: usize,

    // ---- CAPABILITIES ----
    /// The speed of the wheels at a full scale demand.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Slew limit applied to falling wheel speed demands (see `SlewLimiter` for the pairing).
    ///
    /// Units: normalised wheel speed fraction per second
    pub slew_accel_limit_s: f64,

    /// Slew limit applied to rising wheel speed demands.
    ///
    /// Units: normalised wheel speed fraction per second
    pub slew_decel_limit_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which indicate an invalid parameter file.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Slew rate limits must be positive and finite (got accel {0}, decel {1})")]
    NonPositiveSlewLimit(f64, f64),

    #[error("Maximum speed must be positive and finite (got {0})")]
    NonPositiveMaxSpeed(f64),

    #[error("Deadband must be in [0, 1) (got {0})")]
    DeadbandOutOfRange(f64),

    #[error("Median filter window must be at least 1 (got {0})")]
    MedianWindowTooSmall(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Determines if the parameters are valid.
    ///
    /// If valid `Ok(())` is returned, otherwise the offending parameter's error is given.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if !(self.slew_accel_limit_s > 0.0)
            || !(self.slew_decel_limit_s > 0.0)
            || !self.slew_accel_limit_s.is_finite()
            || !self.slew_decel_limit_s.is_finite()
        {
            return Err(ParamsError::NonPositiveSlewLimit(
                self.slew_accel_limit_s,
                self.slew_decel_limit_s,
            ));
        }

        if !(self.max_speed_ms > 0.0) || !self.max_speed_ms.is_finite() {
            return Err(ParamsError::NonPositiveMaxSpeed(self.max_speed_ms));
        }

        if !(self.deadband >= 0.0) || !(self.deadband < 1.0) {
            return Err(ParamsError::DeadbandOutOfRange(self.deadband));
        }

        if self.median_filter_window < 1 {
            return Err(ParamsError::MedianWindowTooSmall(self.median_filter_window));
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
            deadband: 0.05,
            square_inputs: true,
            median_filter_window: 1,
            max_speed_ms: 3.0,
            slew_accel_limit_s: 5.0,
            slew_decel_limit_s: 5.0,
        }
    }

    #[test]
    fn test_are_valid() {
        assert!(valid_params().are_valid().is_ok());

        let mut params = valid_params();
        params.slew_accel_limit_s = 0.0;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.slew_decel_limit_s = f64::NAN;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.max_speed_ms = -1.0;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.deadband = 1.0;
        assert!(params.are_valid().is_err());

        let mut params = valid_params();
        params.median_filter_window = 0;
        assert!(params.are_valid().is_err());
    }
}
