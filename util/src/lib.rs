//! # Utility library for Lynx Robot Software
//!
//! Infrastructure shared by the executables: session directory management,
//! logging, parameter loading, the module framework, cyclic data archiving
//! and the drive script interpreter. Everything in here is robot agnostic,
//! drive behaviour itself lives in `bot_exec`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod script_interpreter;
pub mod session;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use cmd_if;
