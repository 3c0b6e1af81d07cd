//! # Motor driver state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use cmd_if::eqpt::{DriveDems, MotorVolts, WheelVels};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::Session,
};

use super::{MotorFeedforward, Params, ParamsError, PidController};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motor driver module state.
#[derive(Default)]
pub struct MotDriver {
    pub(crate) params: Params,

    report: StatusReport,

    /// Controller instances, built from the parameters at init.
    controllers: Option<Controllers>,

    /// The voltages output on the previous cycle.
    output: Option<MotorVolts>,

    arch_report: Archiver,
    arch_output: Archiver,
}

/// The per-side controller instances owned by the module.
struct Controllers {
    left_ff: MotorFeedforward,
    right_ff: MotorFeedforward,
    left_pid: PidController,
    right_pid: PidController,
}

/// Input data to the motor driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// True if the software is in safe mode, in which case all outputs are zeroed.
    pub safe_mode: bool,

    /// Wheel velocity demands from drive control.
    pub dems: DriveDems,

    /// Measured wheel velocities.
    pub meas: WheelVels,

    /// The run time at the start of this cycle.
    ///
    /// Units: seconds in the exec's monotonic timeline
    pub time_s: f64,
}

/// Status report detailing what happened during a motor driver cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// True if the left output was clamped to the voltage limit this cycle.
    pub left_volts_limited: bool,

    /// True if the right output was clamped to the voltage limit this cycle.
    pub right_volts_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during MotDriver initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(ParamsError),
}

/// Errors which can occur during MotDriver processing.
#[derive(Debug, thiserror::Error)]
pub enum MotDriverError {
    #[error("The module has not been initialised")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for MotDriver {
    type InitData = &'static str;
    type InitError = InitError;
    type InputData = InputData;
    type OutputData = MotorVolts;
    type StatusReport = StatusReport;
    type ProcError = MotDriverError;

    /// Initialise the motor driver module.
    ///
    /// Expected init data is the name of the parameter file within the params directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), InitError> {
        // Load the parameters
        let params: Params = params::load(init_data).map_err(InitError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        // Create the arch folder for mot_driver
        let mut arch_path = session.arch_root.clone();
        arch_path.push("mot_driver");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "mot_driver/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "mot_driver/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of the motor driver.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), MotDriverError> {
        // Clear the status report
        self.report = StatusReport::default();

        let controllers = match self.controllers.as_mut() {
            Some(c) => c,
            None => return Err(MotDriverError::NotInitialised),
        };

        let output = if input_data.safe_mode {
            // No driving in safe mode. The PIDs are reset so no wound up integral acts when
            // leaving it.
            controllers.left_pid.reset();
            controllers.right_pid.reset();

            MotorVolts::default()
        }
        else {
            // Feedforward plus feedback on the velocity error for each side
            let left_raw_v = controllers.left_ff.calculate(input_data.dems.left_ms)
                + controllers.left_pid.get(
                    input_data.dems.left_ms - input_data.meas.left_ms,
                    input_data.time_s,
                );
            let right_raw_v = controllers.right_ff.calculate(input_data.dems.right_ms)
                + controllers.right_pid.get(
                    input_data.dems.right_ms - input_data.meas.right_ms,
                    input_data.time_s,
                );

            // Clamp to the output stage's limit
            let left_v = clamp(&left_raw_v, &-self.params.max_volts, &self.params.max_volts);
            let right_v = clamp(&right_raw_v, &-self.params.max_volts, &self.params.max_volts);

            self.report.left_volts_limited = left_v != left_raw_v;
            self.report.right_volts_limited = right_v != right_raw_v;

            // Apply the wiring inversions last so all control happens in the robot frame
            MotorVolts {
                left_v: if self.params.invert_left { -left_v } else { left_v },
                right_v: if self.params.invert_right { -right_v } else { right_v },
            }
        };

        trace!(
            "MotDriver output: left {:.2} V, right {:.2} V",
            output.left_v,
            output.right_v
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for MotDriver {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output.unwrap_or_default())?;
        Ok(())
    }
}

impl MotDriver {
    /// Build the module directly from a parameter struct.
    ///
    /// No archivers are set up, that only happens in `init`.
    pub fn with_params(params: Params) -> Result<Self, InitError> {
        params.are_valid().map_err(InitError::ParamsInvalid)?;

        let controllers = Controllers::from_params(&params);

        Ok(Self {
            params,
            controllers: Some(controllers),
            ..Default::default()
        })
    }
}

impl Controllers {
    fn from_params(params: &Params) -> Self {
        Self {
            left_ff: MotorFeedforward::new(params.ks_v, params.kv_v_per_ms),
            right_ff: MotorFeedforward::new(params.ks_v, params.kv_v_per_ms),
            left_pid: PidController::new(params.k_p, params.k_i, params.k_d),
            right_pid: PidController::new(params.k_p, params.k_i, params.k_d),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
