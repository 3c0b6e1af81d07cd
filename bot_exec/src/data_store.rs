//! # Data store
//!
//! The data store holds all data shared between modules in the executable. Modules themselves
//! live in the store along with their per-cycle inputs, outputs and status reports, so the
//! main loop is the only place data flows between them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use cmd_if::eqpt::{DriveDems, MotorVolts, WheelVels};

use crate::{drive_ctrl, mot_driver};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    /// A MakeSafe command was recieved
    MakeSafeCmd,

    /// The consecutive cycle overrun limit was exceeded
    CycleOverrunLimit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // ---- CYCLE MANAGEMENT ----
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a one second boundary
    pub is_1_hz_cycle: bool,

    /// The run time at the start of the current cycle.
    ///
    /// Units: seconds since the exec started, monotonic
    pub cycle_time_s: f64,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    // ---- SAFE MODE ----
    /// Determines if the robot is in safe mode
    pub safe: bool,

    /// Gives the root cause of the robot being in safe mode
    pub safe_cause: Option<SafeModeCause>,

    // ---- SENSORS ----
    /// Measured wheel velocities for this cycle
    pub wheel_vels: WheelVels,

    // ---- DRIVE CONTROL ----
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: DriveDems,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // ---- MOTOR DRIVER ----
    pub mot_driver: mot_driver::MotDriver,
    pub mot_driver_output: MotorVolts,
    pub mot_driver_status_rpt: mot_driver::StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Put the robot into safe mode.
    ///
    /// In safe mode all motor outputs are zeroed and only the MakeUnsafe command is accepted.
    /// The first cause to engage safe mode is kept as the root cause, repeated calls do not
    /// overwrite it.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested: {:?}", cause);
        }

        self.safe = true;

        if self.safe_cause.is_none() {
            self.safe_cause = Some(cause);
        }

        self.drive_ctrl.make_safe();
    }

    /// Take the robot out of safe mode.
    ///
    /// Only succeeds if `cause` matches the root cause that engaged safe mode, so a MakeUnsafe
    /// command cannot clear a safe mode entered over a fault the operator may not know about.
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(c) if c == cause => {
                self.safe = false;
                self.safe_cause = None;
                info!("Now leaving safe mode ({:?} cleared)", cause);
                Ok(())
            }
            _ => Err(()),
        }
    }

    /// Perform cycle start updates.
    ///
    /// Items which must be refreshed every cycle, such as module inputs, outputs and status
    /// reports, are returned to their default values here so stale data cannot leak across
    /// cycle boundaries.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, time_s: f64) {
        // Determine if this is a 1 Hz cycle
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.cycle_time_s = time_s;

        // Clear cyclic items
        self.drive_ctrl_input = drive_ctrl::InputData::default();
        self.drive_ctrl_output = DriveDems::default();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();
        self.mot_driver_output = MotorVolts::default();
        self.mot_driver_status_rpt = mot_driver::StatusReport::default();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_safe_mode_root_cause() {
        let mut ds = DataStore::default();

        // Not safe to begin with, and clearing an unengaged safe mode is a no-op
        assert!(!ds.safe);
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeCmd).is_ok());

        // The first cause is kept as the root cause
        ds.make_safe(SafeModeCause::CycleOverrunLimit);
        ds.make_safe(SafeModeCause::MakeSafeCmd);
        assert!(ds.safe);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::CycleOverrunLimit));

        // Clearing with the wrong cause is rejected
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeCmd).is_err());
        assert!(ds.safe);

        // Clearing with the root cause succeeds
        assert!(ds.make_unsafe(SafeModeCause::CycleOverrunLimit).is_ok());
        assert!(!ds.safe);
        assert_eq!(ds.safe_cause, None);
    }

    #[test]
    fn test_cycle_start_clears_cyclics() {
        let mut ds = DataStore::default();

        ds.drive_ctrl_output = DriveDems {
            left_ms: 1.0,
            right_ms: 1.0,
        };
        ds.drive_ctrl_input.cmd = Some(cmd_if::op::OpCmd::Stop);

        ds.cycle_start(50.0, 0.02);

        assert_eq!(ds.drive_ctrl_output.left_ms, 0.0);
        assert!(ds.drive_ctrl_input.cmd.is_none());
        assert_eq!(ds.cycle_time_s, 0.02);

        // Cycle 0 is a 1 Hz cycle, cycle 1 is not
        assert!(ds.is_1_hz_cycle);
        ds.num_cycles += 1;
        ds.cycle_start(50.0, 0.04);
        assert!(!ds.is_1_hz_cycle);
    }
}
