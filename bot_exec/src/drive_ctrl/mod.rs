//! # Drive control module
//!
//! The drive control module (DriveCtrl) converts operator drive commands into individual wheel
//! velocity demands. It conditions the raw stick axes (median filter and deadband), mixes them
//! into per-wheel fractions and rate limits each wheel before scaling by the drive base's
//! maximum speed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_arcade;
mod filters;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use cmd_if::op::OpCmd;

// Exports
pub use calc_arcade::*;
pub use filters::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during DriveCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("The module has not been initialised")]
    NotInitialised,

    #[error("Recieved an invalid drive command: {0:#?}")]
    InvalidDriveCmd(OpCmd),

    #[error("Recieved a command which is not a drive command: {0:#?}")]
    NotADriveCmd(OpCmd),
}
