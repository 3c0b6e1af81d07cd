//! # Motor driver module
//!
//! The motor driver module (MotDriver) converts wheel velocity demands from DriveCtrl into
//! motor voltages. Each side runs a feedforward model plus a PID loop closed on the measured
//! wheel velocity, with the summed voltage clamped to the output stage's limit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Exports
pub use controllers::*;
pub use params::*;
pub use state::*;
