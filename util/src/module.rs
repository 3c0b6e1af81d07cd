//! Module framework
//!
//! Every processing stage in `bot_exec` (drive control, the motor driver) is a module
//! implementing [`State`]. A module is initialised once from its parameter file and then
//! stepped by the main loop every cycle, consuming a typed input and producing a typed
//! output plus a status report.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The state of a processing module and its cyclic step.
pub trait State {
    /// Data handed to [`State::init`], for example the name of a parameter file.
    type InitData;

    /// Error the module can raise while initialising.
    type InitError;

    /// Data consumed by one processing cycle.
    type InputData;

    /// Data produced by one processing cycle.
    type OutputData;

    /// A report of what happened during one processing cycle.
    type StatusReport;

    /// Error the module can raise while processing a cycle.
    type ProcError;

    /// Prepare the module for the main loop.
    ///
    /// Called once before the main loop starts. The session is available for setting up
    /// archivers and other session scoped resources.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Step the module over one processing cycle.
    ///
    /// Returns the cycle's output data and status report together, or the module's error if
    /// the cycle could not be processed.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
