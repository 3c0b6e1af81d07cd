//! # Command interface crate.
//!
//! Provides the command and equipment data definitions shared across the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Operator command definitions
pub mod op;

/// Equipment data definitions (demands and sensor readings)
pub mod eqpt;
