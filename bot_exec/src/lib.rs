//! # Robot library
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items
//! defined inside the robot executable.

/// Central data store shared by the executable's modules
pub mod data_store;

/// Drive control module - converts operator drive commands into wheel velocity demands
pub mod drive_ctrl;

/// Motor driver module - converts wheel velocity demands into motor voltages
pub mod mot_driver;

/// Simulated drive base - provides wheel velocity feedback without hardware
#[cfg(feature = "sim")]
pub mod sim_motors;
