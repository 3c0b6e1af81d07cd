//! # Arcade drive calculations
//!
//! Provides the pure arcade mixing arithmetic ([`mix`] and [`apply_deadband`]) and the
//! [`DriveCtrl::calc_arcade`] pipeline step which strings the input filters, deadband and mix
//! together.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use util::maths::clamp;

use super::{DriveCtrl, DriveCtrlError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Left and right wheel speed fractions produced by the arcade mix.
///
/// Units: normalised fraction of full speed (-1 to +1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix a forward speed and a rotation rate into left and right wheel fractions.
///
/// Positive `forward` drives the robot forwards, positive `rotation` turns it anticlockwise
/// (left wheel faster). Both inputs are clamped to [-1, 1] before mixing. With `square_inputs`
/// set the inputs are squared keeping their sign, which gives finer control near the centre of
/// the stick at the cost of top-end resolution.
///
/// The mix guarantees neither output exceeds full scale, saturated combinations are scaled
/// down together so the turn ratio is preserved.
pub fn mix(forward: f64, rotation: f64, square_inputs: bool) -> WheelSpeeds {
    let mut forward = clamp(&forward, &-1.0, &1.0);
    let mut rotation = clamp(&rotation, &-1.0, &1.0);

    if square_inputs {
        forward = forward.abs() * forward;
        rotation = rotation.abs() * rotation;
    }

    // The dominant input sets the speed of the faster wheel, signed by the forward direction
    let max_input = forward.abs().max(rotation.abs()).copysign(forward);

    let mut left;
    let mut right;

    if forward >= 0.0 {
        if rotation >= 0.0 {
            left = max_input;
            right = forward - rotation;
        }
        else {
            left = forward + rotation;
            right = max_input;
        }
    }
    else if rotation >= 0.0 {
        left = forward + rotation;
        right = max_input;
    }
    else {
        left = max_input;
        right = forward - rotation;
    }

    // Scale both wheels down together if either exceeds full scale
    let max_magnitude = left.abs().max(right.abs());
    if max_magnitude > 1.0 {
        left /= max_magnitude;
        right /= max_magnitude;
    }

    WheelSpeeds { left, right }
}

/// Zero `value` if its magnitude is at or below `deadband`, otherwise rescale the remaining
/// range linearly onto the full range, keeping the sign.
///
/// The rescale means the output is continuous at the deadband edge rather than jumping, a
/// stick just outside the band commands a speed just above zero.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() <= deadband {
        return 0.0;
    }

    if value > 0.0 {
        util::maths::lin_map((deadband, 1.0), (0.0, 1.0), value)
    }
    else {
        util::maths::lin_map((-deadband, -1.0), (0.0, -1.0), value)
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtrl {
    /// Perform the arcade command calculations.
    ///
    /// The stick axes are median filtered (when enabled), deadbanded, mixed into wheel
    /// fractions and rate limited per wheel. The caller's run time drives the slew limiters.
    pub(crate) fn calc_arcade(
        &mut self,
        forward: f64,
        rotation: f64,
        time_s: f64,
    ) -> Result<WheelSpeeds, DriveCtrlError> {
        let params = &self.params;
        let filters = match self.filters.as_mut() {
            Some(f) => f,
            None => return Err(DriveCtrlError::NotInitialised),
        };

        // Knock single sample spikes off the raw axes before any shaping
        let (forward, rotation) = if params.median_filter_window > 1 {
            (
                filters.fwd_median.calculate(forward),
                filters.rot_median.calculate(rotation),
            )
        }
        else {
            (forward, rotation)
        };

        // Reject stick noise around the centre
        let forward = apply_deadband(forward, params.deadband);
        let rotation = apply_deadband(rotation, params.deadband);

        self.report.fwd_in_deadband = forward == 0.0;
        self.report.rot_in_deadband = rotation == 0.0;

        // A positive stick rotation is a clockwise turn, the mix wants anticlockwise
        let speeds = mix(forward, -rotation, params.square_inputs);

        // Rate limit each wheel fraction with its own limiter
        let left = filters.left_slew.calculate(speeds.left, time_s);
        let right = filters.right_slew.calculate(speeds.right, time_s);

        self.report.left_slew_limited = (left - speeds.left).abs() > 1e-9;
        self.report.right_slew_limited = (right - speeds.right).abs() > 1e-9;

        Ok(WheelSpeeds { left, right })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
