//! # Equipment data
//!
//! This module defines the data structures exchanged with the drive base equipment: velocity
//! demands going towards the motors and velocity readings coming back from the wheel encoders.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Wheel velocity demands for the drive base.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveDems {
    /// Demanded left wheel velocity.
    ///
    /// Units: meters/second
    pub left_ms: f64,

    /// Demanded right wheel velocity.
    ///
    /// Units: meters/second
    pub right_ms: f64,
}

/// Voltage demands for the drive base motor controllers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorVolts {
    /// Voltage to apply to the left side motors.
    ///
    /// Units: volts
    pub left_v: f64,

    /// Voltage to apply to the right side motors.
    ///
    /// Units: volts
    pub right_v: f64,
}

/// Measured wheel velocities from the drive base encoders.
///
/// Passed into the control modules each cycle, there is no global sensor object to read from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelVels {
    /// Measured left wheel velocity.
    ///
    /// Units: meters/second
    pub left_ms: f64,

    /// Measured right wheel velocity.
    ///
    /// Units: meters/second
    pub right_ms: f64,
}
