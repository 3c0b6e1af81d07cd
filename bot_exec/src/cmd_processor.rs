//! # Command processor
//!
//! The command processor routes operator commands to the modules which execute them. Drive
//! commands land in the drive control input, safe mode commands act on the data store
//! directly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use bot_lib::data_store::{DataStore, SafeModeCause};
use cmd_if::op::OpCmd;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute an operator command.
///
/// Mutates the data store to pass commands to the modules responsible for them.
pub(crate) fn exec(ds: &mut DataStore, cmd: &OpCmd) {
    match cmd {
        OpCmd::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeCmd);
        }
        OpCmd::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            if ds.make_unsafe(SafeModeCause::MakeSafeCmd).is_err() {
                warn!("MakeUnsafe rejected, safe mode was not caused by a MakeSafe command");
            }
        }
        OpCmd::Arcade { .. } | OpCmd::Tank { .. } | OpCmd::Stop => {
            ds.drive_ctrl_input.cmd = Some(*cmd);
        }
    }
}
