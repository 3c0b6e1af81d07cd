//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The executable initialises all modules and then runs a fixed rate main
//! loop. Each cycle:
//!
//!     - acquires system inputs (wheel velocity sensing)
//!     - processes pending operator commands
//!     - steps drive control
//!     - steps the motor driver
//!     - outputs to the equipment
//!
//! # Modules
//!
//! Each processing stage (e.g. `drive_ctrl`) exposes a public struct
//! implementing the `util::module::State` trait, and is stepped through that
//! trait alone.

// ---------------------------------------------------------------------------
// LIBRARY MODULES
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use sim_motors::SimMotors;
use bot_lib::{*, data_store::{DataStore, SafeModeCause}};

mod cmd_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use serde::Serialize;
use std::env;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use cmd_if::op::OpCmd;
use util::{
    archive::Archived,
    module::State,
    logger::{logger_init, LevelFilter},
    session::{self, Session},
    script_interpreter::{ScriptInterpreter, PendingCmds},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Length of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Main loop rate in cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Limit on the number of consecutive cycle overruns before safe mode is engaged.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 50;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Entry point for `bot_exec`.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // The session must exist before the logger since the logger writes into
    // the session directory
    let session = Session::new("bot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Lynx Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE COMMAND SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // The drive script path is the single expected argument
    let mut script = if args.len() == 2 {

        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1])
            .wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} commands\n",
            si.get_duration(),
            si.get_num_cmds()
        );

        si
    }
    else {
        return Err(eyre!(
            "Expected the drive script path as the only argument, found {} arguments",
            args.len() - 1)
        );
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.drive_ctrl.init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    ds.mot_driver.init("mot_driver.toml", &session)
        .wrap_err("Failed to initialise MotDriver")?;
    info!("MotDriver init complete");

    #[cfg(feature = "sim")]
    let mut sim_motors = {
        let s = SimMotors::new("sim_motors.toml")
            .wrap_err("Failed to initialise SimMotors")?;
        info!("SimMotors init complete");
        s
    };

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    // Epoch for the monotonic run time which drives all time dependent control. Wall clock
    // time is only used for session naming and logging.
    let run_epoch = Instant::now();
    let mut last_cycle_time_s = 0f64;

    loop {

        let cycle_start_instant = Instant::now();
        let cycle_time_s = (cycle_start_instant - run_epoch).as_secs_f64();

        // Wipe the cyclic items left over from the previous cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ, cycle_time_s);

        // ---- DATA INPUT ----

        // Get wheel velocities from the simulated drive base
        #[cfg(feature = "sim")]
        {
            ds.wheel_vels = sim_motors.wheel_vels();
        }

        // ---- COMMAND PROCESSING ----

        match script.get_pending_cmds(cycle_time_s) {
            PendingCmds::None => (),
            PendingCmds::Some(cmd_vec) => {
                for cmd in cmd_vec.iter() {
                    // In safe mode only the MakeUnsafe command is processed
                    if ds.safe && *cmd != OpCmd::MakeUnsafe {
                        warn!("In safe mode, dropping command {:?}", cmd);
                        continue;
                    }

                    cmd_processor::exec(&mut ds, cmd);
                }
            }
            // Exit if end of script reached
            PendingCmds::EndOfScript => {
                info!("End of drive script reached, stopping");
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.drive_ctrl_input.time_s = cycle_time_s;

        // DriveCtrl processing
        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((o, r)) => {
                ds.drive_ctrl_output = o;
                ds.drive_ctrl_status_rpt = r;
            },
            Err(e) => {
                // DriveCtrl errors usually just mean a wrong command was sent, so issue the
                // warning and continue on the zero demands set at cycle start.
                warn!("Error during DriveCtrl processing: {}", e)
            }
        };

        // MotDriver processing
        let mot_driver_input = mot_driver::InputData {
            safe_mode: ds.safe,
            dems: ds.drive_ctrl_output,
            meas: ds.wheel_vels,
            time_s: cycle_time_s,
        };

        match ds.mot_driver.proc(&mot_driver_input) {
            Ok((o, r)) => {
                ds.mot_driver_output = o;
                ds.mot_driver_status_rpt = r;
            },
            Err(e) => warn!("Error during MotDriver processing: {}", e)
        };

        // ---- EQUIPMENT ----

        // Apply the voltages to the simulated drive base, stepping it over the time elapsed
        // since the previous cycle
        #[cfg(feature = "sim")]
        {
            sim_motors.step(&ds.mot_driver_output, cycle_time_s - last_cycle_time_s);
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.drive_ctrl.write() {
            warn!("Could not write DriveCtrl archives: {}", e);
        }
        if let Err(e) = ds.mot_driver.write() {
            warn!("Could not write MotDriver archives: {}", e);
        }

        // ---- PERIODIC ACTIVITIES ----

        if ds.is_1_hz_cycle {
            debug!(
                "Cycle {}: dems [{:.2}, {:.2}] m/s, meas [{:.2}, {:.2}] m/s, volts [{:.2}, {:.2}] V",
                ds.num_cycles,
                ds.drive_ctrl_output.left_ms,
                ds.drive_ctrl_output.right_ms,
                ds.wheel_vels.left_ms,
                ds.wheel_vels.right_ms,
                ds.mot_driver_output.left_v,
                ds.mot_driver_output.right_v
            );
        }

        // ---- CYCLE MANAGEMENT ----

        // Sleep off whatever is left of the cycle period, or handle the
        // overrun if nothing is left
        let elapsed = cycle_start_instant.elapsed();

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(elapsed) {
            Some(remaining) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(remaining);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    elapsed.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                // Past the overrun limit the cycle timing can no longer be
                // trusted, so engage safe mode
                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    if !ds.safe {
                        error!(
                            "More than {} consecutive cycle overruns",
                            MAX_CONSEC_CYCLE_OVERRUNS
                        );
                    }
                    ds.make_safe(SafeModeCause::CycleOverrunLimit);
                }
            }
        }

        last_cycle_time_s = cycle_time_s;

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Write the run summary into the session directory
    let summary = RunSummary {
        session_epoch: session::get_epoch().to_rfc3339(),
        num_cycles: ds.num_cycles as u64,
        duration_s: ds.cycle_time_s,
        num_consec_cycle_overruns: ds.num_consec_cycle_overruns,
        ended_safe: ds.safe,
        safe_cause: ds.safe_cause.map(|c| format!("{:?}", c)),
    };

    let summary_path = session.file_path("run_summary.json");

    let summary_file = std::fs::File::create(&summary_path)
        .wrap_err("Failed to create the run summary file")?;
    serde_json::to_writer_pretty(summary_file, &summary)
        .wrap_err("Failed to write the run summary")?;

    info!("Run summary written to {:?}", summary_path);

    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of an execution, written into the session directory at shutdown.
#[derive(Serialize)]
struct RunSummary {
    /// Wall clock time the session started at
    session_epoch: String,

    /// Number of cycles executed
    num_cycles: u64,

    /// Run time at the start of the final cycle.
    ///
    /// Units: seconds
    duration_s: f64,

    /// Number of consecutive cycle overruns at shutdown
    num_consec_cycle_overruns: u64,

    /// True if the robot was in safe mode at shutdown
    ended_safe: bool,

    /// The safe mode root cause at shutdown, if any
    safe_cause: Option<String>,
}
