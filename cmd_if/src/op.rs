//! # Operator commands
//!
//! An operator command is a single instruction to the robot, either sampled from the driver
//! station sticks or replayed from a drive script. Commands are serialised as JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be issued to the robot by the operator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpCmd {
    /// An arcade drive command.
    ///
    /// Mixes a single forward/backward axis and a single turn axis into independent left and
    /// right wheel speeds.
    Arcade {
        /// The forward axis value, in the range [-1, +1].
        ///
        /// Positive values drive the robot forwards, negative values backwards. Values outside
        /// the range are clamped by the drive module.
        forward: f64,

        /// The rotation axis value, in the range [-1, +1].
        ///
        /// Positive values turn the robot clockwise when viewed from above. Values outside the
        /// range are clamped by the drive module.
        rotation: f64,
    },

    /// A tank drive command, setting each side of the drive base directly.
    Tank {
        /// The left wheel speed as a fraction of the maximum speed, in the range [-1, +1].
        left: f64,

        /// The right wheel speed as a fraction of the maximum speed, in the range [-1, +1].
        right: f64,
    },

    /// Stop the robot by setting both wheel demands to zero.
    ///
    /// Stop is immediate and is not rate limited.
    Stop,

    /// Put the software into safe mode, zeroing all actuator demands.
    MakeSafe,

    /// Take the software out of safe mode.
    MakeUnsafe,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum OpCmdParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Command contains a non-finite axis value: {0:?}")]
    NonFiniteValue(OpCmd),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl OpCmd {
    /// Parse a new command from a JSON string.
    ///
    /// Commands with non-finite axis values are rejected here rather than being allowed to
    /// reach the drive modules.
    pub fn from_json(json_str: &str) -> Result<Self, OpCmdParseError> {
        let cmd: OpCmd = serde_json::from_str(json_str)?;

        if cmd.is_valid() {
            Ok(cmd)
        }
        else {
            Err(OpCmdParseError::NonFiniteValue(cmd))
        }
    }

    /// Returns true if all axis values in the command are finite.
    ///
    /// Range is not checked, out of range axes are clamped at the point of use.
    pub fn is_valid(&self) -> bool {
        match self {
            OpCmd::Arcade { forward, rotation } =>
                forward.is_finite() && rotation.is_finite(),
            OpCmd::Tank { left, right } =>
                left.is_finite() && right.is_finite(),
            OpCmd::Stop
            | OpCmd::MakeSafe
            | OpCmd::MakeUnsafe => true,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let cmd = OpCmd::from_json(
            r#"{"Arcade": {"forward": 0.5, "rotation": -0.25}}"#
        ).unwrap();

        assert_eq!(cmd, OpCmd::Arcade { forward: 0.5, rotation: -0.25 });

        let cmd = OpCmd::from_json(r#""Stop""#).unwrap();
        assert_eq!(cmd, OpCmd::Stop);

        // Malformed JSON must be rejected
        assert!(OpCmd::from_json(r#"{"Arcade": {"forward": 0.5}}"#).is_err());
        assert!(OpCmd::from_json("not json").is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        // Overflowing literals must not get through, whichever stage catches them
        assert!(OpCmd::from_json(
            r#"{"Arcade": {"forward": 1e999, "rotation": 0.0}}"#
        ).is_err());

        assert!(!OpCmd::Tank { left: f64::NAN, right: 0.0 }.is_valid());
        assert!(!OpCmd::Arcade { forward: f64::INFINITY, rotation: 0.0 }.is_valid());
        assert!(OpCmd::MakeSafe.is_valid());
    }
}
