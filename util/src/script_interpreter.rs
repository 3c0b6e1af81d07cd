//! # Drive script interpreter module
//!
//! This module provides an interpreter for drive scripts, allowing operator
//! commands to be replayed from a file instead of a driver station.
//!
//! A script is a sequence of lines in the format
//!
//! ```text
//! <exec_time_s>: <json payload>;
//! ```
//!
//! for example
//!
//! ```text
//! 0.5: {"Arcade": {"forward": 0.5, "rotation": 0.0}};
//! 4.0: "Stop";
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Any other line which
//! does not match the format is an error, a broken script is rejected as a
//! whole rather than partially executed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use regex::Regex;
use thiserror::Error;

// Internal
use cmd_if::op::{OpCmd, OpCmdParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: OpCmd
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script contains no commands")]
    ScriptEmpty,

    #[error("Line {0} of the script is not a command, a comment or blank")]
    UnrecognisedLine(usize),

    #[error("Line {0} of the script has an invalid timestamp")]
    InvalidTimestamp(usize),

    #[error("Line {0} of the script has an invalid command: {1}")]
    InvalidCmd(usize, OpCmdParseError)
}

pub enum PendingCmds {
    None,
    Some(Vec<OpCmd>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    ///
    /// The whole script is parsed and validated here, a script containing a
    /// bad command never starts executing.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        // Load the script into a string
        let script = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ScriptError::ScriptNotFound(path.to_string_lossy().to_string())
            }
            _ => ScriptError::ScriptLoadError(e)
        })?;

        // Command lines look like `<exec_time_s>: <json payload>;`
        let line_re = Regex::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .unwrap();

        let mut cmds: VecDeque<Command> = VecDeque::new();

        for (line_idx, line) in script.lines().enumerate() {
            let line_num = line_idx + 1;

            // Skip blank lines and comments
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let caps = match line_re.captures(line) {
                Some(c) => c,
                None => return Err(ScriptError::UnrecognisedLine(line_num))
            };

            // Parse the exec time. The regex only passes digit strings but
            // an oversized one parses to infinity, which would never execute.
            let exec_time_s: f64 = caps[1]
                .parse()
                .map_err(|_| ScriptError::InvalidTimestamp(line_num))?;

            if !exec_time_s.is_finite() {
                return Err(ScriptError::InvalidTimestamp(line_num));
            }

            // Parse the command from the payload. The scripts contain JSON
            // only.
            let cmd = OpCmd::from_json(&caps[3])
                .map_err(|e| ScriptError::InvalidCmd(line_num, e))?;

            cmds.push_back(Command { exec_time_s, cmd });
        }

        if cmds.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    ///
    /// `current_time_s` is the caller's run time, commands are pending once
    /// their exec time is behind it.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds {

        // An exhausted queue means the script is over
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<OpCmd> = vec![];

        // Pop commands off the front of the queue while their exec times are
        // behind the current time
        while matches!(
            self.cmds.front(),
            Some(c) if c.exec_time_s < current_time_s
        ) {
            if let Some(command) = self.cmds.pop_front() {
                cmd_vec.push(command.cmd);
            }
        }

        if !cmd_vec.is_empty() {
            PendingCmds::Some(cmd_vec)
        }
        else {
            PendingCmds::None
        }
    }

    /// Get the number of commands left in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.cmds.back().map_or(0f64, |c| c.exec_time_s)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
