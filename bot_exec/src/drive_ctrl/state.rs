//! # Drive control state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use cmd_if::eqpt::DriveDems;
use cmd_if::op::OpCmd;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::Session,
};

use super::{
    DriveCtrlError, FilterError, MedianFilter, Params, ParamsError, SlewLimiter, WheelSpeeds,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The drive command currently being executed, `None` until the first command arrives.
    current_cmd: Option<OpCmd>,

    /// Input filter instances, built from the parameters at init.
    pub(crate) filters: Option<Filters>,

    /// The wheel velocity demands output on the previous cycle.
    output: Option<DriveDems>,

    arch_report: Archiver,
    arch_output: Archiver,
}

/// The input conditioning filter instances owned by the module.
pub(crate) struct Filters {
    pub(crate) left_slew: SlewLimiter,
    pub(crate) right_slew: SlewLimiter,
    pub(crate) fwd_median: MedianFilter,
    pub(crate) rot_median: MedianFilter,
}

/// Input data to drive control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// The drive command to execute, or `None` if no new command arrived this cycle.
    pub cmd: Option<OpCmd>,

    /// The run time at the start of this cycle.
    ///
    /// Units: seconds in the exec's monotonic timeline
    pub time_s: f64,
}

/// Status report detailing what happened during a drive control cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// True if the forward axis was inside the deadband.
    pub fwd_in_deadband: bool,

    /// True if the rotation axis was inside the deadband.
    pub rot_in_deadband: bool,

    /// True if the left wheel demand was slew limited this cycle.
    pub left_slew_limited: bool,

    /// True if the right wheel demand was slew limited this cycle.
    pub right_slew_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during DriveCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(ParamsError),

    #[error("Failed to construct the input filters: {0}")]
    FilterInitError(FilterError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = InitError;
    type InputData = InputData;
    type OutputData = DriveDems;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the drive control module.
    ///
    /// Expected init data is the name of the parameter file within the params directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), InitError> {
        // Load the parameters
        let params: Params = params::load(init_data).map_err(InitError::ParamLoadError)?;

        *self = Self::with_params(params, 0.0)?;

        // Create the arch folder for drive_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of drive control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), DriveCtrlError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            match cmd {
                OpCmd::Arcade { .. } | OpCmd::Tank { .. } | OpCmd::Stop => {
                    if !cmd.is_valid() {
                        return Err(DriveCtrlError::InvalidDriveCmd(cmd));
                    }

                    // Update the module's copy of the command
                    self.current_cmd = Some(cmd);
                }
                _ => return Err(DriveCtrlError::NotADriveCmd(cmd)),
            }
        }

        // Produce wheel fractions from the held command, or stay at zero before the first
        // command arrives
        let speeds = match self.current_cmd {
            Some(OpCmd::Arcade { forward, rotation }) => {
                self.calc_arcade(forward, rotation, input_data.time_s)?
            }
            Some(OpCmd::Tank { left, right }) => {
                self.calc_tank(left, right, input_data.time_s)?
            }
            Some(OpCmd::Stop) => self.calc_stop(input_data.time_s),
            Some(cmd) => return Err(DriveCtrlError::NotADriveCmd(cmd)),
            None => WheelSpeeds {
                left: 0.0,
                right: 0.0,
            },
        };

        // Scale the wheel fractions by the drive base's maximum speed
        let output = DriveDems {
            left_ms: speeds.left * self.params.max_speed_ms,
            right_ms: speeds.right * self.params.max_speed_ms,
        };

        trace!(
            "DriveCtrl output: left {:.3} m/s, right {:.3} m/s",
            output.left_ms,
            output.right_ms
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output.unwrap_or_default())?;
        Ok(())
    }
}

impl DriveCtrl {
    /// Build the module directly from a parameter struct.
    ///
    /// The slew limiters start holding zero at `time_s`. No archivers are set up, that only
    /// happens in `init`.
    pub fn with_params(params: Params, time_s: f64) -> Result<Self, InitError> {
        params.are_valid().map_err(InitError::ParamsInvalid)?;

        let filters = Filters::from_params(&params, time_s).map_err(InitError::FilterInitError)?;

        Ok(Self {
            params,
            filters: Some(filters),
            ..Default::default()
        })
    }

    /// Force the module into the stopped state, as used when entering safe mode.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(OpCmd::Stop);
    }

    /// Perform the tank command calculations.
    ///
    /// Each side is commanded directly, clamped to full scale and rate limited by the same
    /// per-wheel limiters the arcade path uses.
    fn calc_tank(
        &mut self,
        left: f64,
        right: f64,
        time_s: f64,
    ) -> Result<WheelSpeeds, DriveCtrlError> {
        let filters = match self.filters.as_mut() {
            Some(f) => f,
            None => return Err(DriveCtrlError::NotInitialised),
        };

        let left = clamp(&left, &-1.0, &1.0);
        let right = clamp(&right, &-1.0, &1.0);

        let left_limited = filters.left_slew.calculate(left, time_s);
        let right_limited = filters.right_slew.calculate(right, time_s);

        self.report.left_slew_limited = (left_limited - left).abs() > 1e-9;
        self.report.right_slew_limited = (right_limited - right).abs() > 1e-9;

        Ok(WheelSpeeds {
            left: left_limited,
            right: right_limited,
        })
    }

    /// Perform the stop command calculations.
    ///
    /// Stop must always succeed in bringing the wheels to zero demand immediately, so the slew
    /// limiters are reset rather than ramped down and the median history is cleared.
    fn calc_stop(&mut self, time_s: f64) -> WheelSpeeds {
        if let Some(ref mut filters) = self.filters {
            filters.left_slew.reset(0.0, time_s);
            filters.right_slew.reset(0.0, time_s);
            filters.fwd_median.reset();
            filters.rot_median.reset();
        }

        WheelSpeeds {
            left: 0.0,
            right: 0.0,
        }
    }
}

impl Filters {
    fn from_params(params: &Params, time_s: f64) -> Result<Self, FilterError> {
        Ok(Self {
            left_slew: SlewLimiter::new(
                params.slew_accel_limit_s,
                params.slew_decel_limit_s,
                0.0,
                time_s,
            )?,
            right_slew: SlewLimiter::new(
                params.slew_accel_limit_s,
                params.slew_decel_limit_s,
                0.0,
                time_s,
            )?,
            fwd_median: MedianFilter::new(params.median_filter_window)?,
            rot_median: MedianFilter::new(params.median_filter_window)?,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    /// Parameters with wide open slew limits so most tests see the unfiltered pipeline.
    fn open_params() -> Params {
        Params {
            deadband: 0.05,
            square_inputs: false,
            median_filter_window: 1,
            max_speed_ms: 3.0,
            slew_accel_limit_s: 100.0,
            slew_decel_limit_s: 100.0,
        }
    }

    #[test]
    fn test_arcade_pipeline() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        // Full forward commands both wheels at max speed
        let (output, report) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 1.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 3.0);
        assert_eq!(output.right_ms, 3.0);
        assert!(!report.left_slew_limited);
        assert!(!report.fwd_in_deadband);

        // The command is held between samples
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 2.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 3.0);
        assert_eq!(output.right_ms, 3.0);
    }

    #[test]
    fn test_no_cmd_no_output() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 1.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);
        assert_eq!(output.right_ms, 0.0);
    }

    #[test]
    fn test_deadband_zeroes_sticks() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        let (output, report) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 0.04,
                    rotation: -0.03,
                }),
                time_s: 1.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);
        assert_eq!(output.right_ms, 0.0);
        assert!(report.fwd_in_deadband);
        assert!(report.rot_in_deadband);
    }

    #[test]
    fn test_squared_inputs_scale() {
        // Zero deadband so the squaring is checked on its own
        let mut params = open_params();
        params.square_inputs = true;
        params.deadband = 0.0;
        let mut drive_ctrl = DriveCtrl::with_params(params, 0.0).unwrap();

        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 0.5,
                    rotation: 0.0,
                }),
                time_s: 1.0,
            })
            .unwrap();
        assert!((output.left_ms - 0.75).abs() < 1e-9);
        assert!((output.right_ms - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_slew_limits_step_demands() {
        let mut params = open_params();
        params.slew_accel_limit_s = 2.0;
        params.slew_decel_limit_s = 2.0;
        params.max_speed_ms = 1.0;
        let mut drive_ctrl = DriveCtrl::with_params(params, 0.0).unwrap();

        // A full step at 0.1 s is limited to 0.2 of full scale
        let (output, report) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 0.1,
            })
            .unwrap();
        assert!((output.left_ms - 0.2).abs() < 1e-9);
        assert!((output.right_ms - 0.2).abs() < 1e-9);
        assert!(report.left_slew_limited);
        assert!(report.right_slew_limited);

        // The held command keeps ramping
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 0.2,
            })
            .unwrap();
        assert!((output.left_ms - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_stop_is_immediate() {
        let mut params = open_params();
        params.slew_accel_limit_s = 0.5;
        params.slew_decel_limit_s = 0.5;
        let mut drive_ctrl = DriveCtrl::with_params(params, 0.0).unwrap();

        drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 1.0,
            })
            .unwrap();

        // Stop zeroes the demands at once, no ramp down
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Stop),
                time_s: 1.1,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);
        assert_eq!(output.right_ms, 0.0);

        // and the following command ramps from zero, not from the pre-stop value
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 2.1,
            })
            .unwrap();
        assert!((output.left_ms - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_tank_drives_sides_independently() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Tank {
                    left: 0.5,
                    right: -0.5,
                }),
                time_s: 1.0,
            })
            .unwrap();
        assert!((output.left_ms - 1.5).abs() < 1e-9);
        assert!((output.right_ms + 1.5).abs() < 1e-9);

        // Out of range sides are clamped to full scale
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Tank {
                    left: 4.0,
                    right: 4.0,
                }),
                time_s: 2.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 3.0);
        assert_eq!(output.right_ms, 3.0);
    }

    #[test]
    fn test_median_filter_rejects_spikes() {
        let mut params = open_params();
        params.median_filter_window = 3;
        let mut drive_ctrl = DriveCtrl::with_params(params, 0.0).unwrap();

        // Two cycles at rest fill the window with zeros
        for i in 1..=2 {
            drive_ctrl
                .proc(&InputData {
                    cmd: Some(OpCmd::Arcade {
                        forward: 0.0,
                        rotation: 0.0,
                    }),
                    time_s: f64::from(i),
                })
                .unwrap();
        }

        // A single full deflection sample is rejected
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 3.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);

        // but a sustained one gets through
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 4.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 3.0);
    }

    #[test]
    fn test_rejects_bad_commands() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        // Non-drive commands are rejected
        let result = drive_ctrl.proc(&InputData {
            cmd: Some(OpCmd::MakeSafe),
            time_s: 1.0,
        });
        assert!(matches!(result, Err(DriveCtrlError::NotADriveCmd(_))));

        // Non-finite stick values are rejected
        let result = drive_ctrl.proc(&InputData {
            cmd: Some(OpCmd::Arcade {
                forward: f64::NAN,
                rotation: 0.0,
            }),
            time_s: 2.0,
        });
        assert!(matches!(result, Err(DriveCtrlError::InvalidDriveCmd(_))));

        // and neither replaces the held command
        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 3.0,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);
    }

    #[test]
    fn test_make_safe_stops() {
        let mut drive_ctrl = DriveCtrl::with_params(open_params(), 0.0).unwrap();

        drive_ctrl
            .proc(&InputData {
                cmd: Some(OpCmd::Arcade {
                    forward: 1.0,
                    rotation: 0.0,
                }),
                time_s: 1.0,
            })
            .unwrap();

        drive_ctrl.make_safe();

        let (output, _) = drive_ctrl
            .proc(&InputData {
                cmd: None,
                time_s: 1.02,
            })
            .unwrap();
        assert_eq!(output.left_ms, 0.0);
        assert_eq!(output.right_ms, 0.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = open_params();
        params.slew_accel_limit_s = 0.0;
        assert!(matches!(
            DriveCtrl::with_params(params, 0.0),
            Err(InitError::ParamsInvalid(_))
        ));
    }
}
