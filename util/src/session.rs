//! # Execution sessions
//!
//! A session is a single run of one of the executables. Each session gets a
//! timestamped directory under the software root's `sessions` directory,
//! which collects the log file and any archives written during the run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Wall clock time at which the session started. Set once by [`Session::new`].
static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Timestamp format used in session directory names, for example `20260822_142251`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paths associated with the current session.
#[derive(Clone)]
pub struct Session {
    /// Directory collecting everything this session produces
    pub session_root: PathBuf,

    /// Directory the cyclic archives are written into
    pub arch_root: PathBuf,

    /// File the log output is mirrored to
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when creating a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (LYNX_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create a session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("The session epoch is already set, only one session may exist per process ({0})")]
    EpochAlreadySet(conquer_once::TryInitError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Create the session directory tree and fix the session epoch.
    ///
    /// The directory is named `{exec_name}_{timestamp}` and lives under `sessions_dir` in
    /// the software root, with an `arch` subdirectory for archives. Fixing the epoch here
    /// means only one session can be created per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::EpochAlreadySet)?;

        let timestamp = get_epoch().format(TIMESTAMP_FORMAT);

        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        let session_root = root
            .join(sessions_dir)
            .join(format!("{}_{}", exec_name, timestamp));
        let arch_root = session_root.join("arch");

        // Creating the archive directory creates the session root along with it
        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = session_root.join(format!("{}.log", exec_name));

        Ok(Session {
            session_root,
            arch_root,
            log_file_path,
        })
    }

    /// The full path of a file with the given name in the session directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.session_root.join(file_name)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds of wall clock time since the session epoch.
///
/// # Panics
/// Panics if called before any session exists.
pub fn get_elapsed_seconds() -> f64 {
    match (Utc::now() - *get_epoch()).num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => f64::NAN,
    }
}

/// The wall clock time the session started at.
///
/// # Panics
/// Panics if called before any session exists.
pub fn get_epoch() -> &'static DateTime<Utc> {
    SESSION_EPOCH
        .get()
        .expect("No session has been created yet!")
}
