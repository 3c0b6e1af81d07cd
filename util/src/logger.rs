//! Logger setup
//!
//! All executables log through the `log` macros, dispatched by `fern` to stdout and to the
//! session's log file. Each record is tagged with the seconds elapsed since the session
//! epoch, so log lines line up with the cycle times in the archives.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::info;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised during logger setup.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Could not create the log file: {0}")]
    LogFileError(std::io::Error),

    #[error("An error occured while setting the logger: {0}")]
    SetLoggerError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Set up logging for this execution.
///
/// Records at or above `min_level` go to stdout and the session's log file. Debug and trace
/// records are also tagged with the module they came from.
///
/// Must only be called once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    let log_file = fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            let elapsed_s = session::get_elapsed_seconds();
            let tag = level_tag(record.level());

            if record.level() >= log::Level::Debug {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    elapsed_s,
                    tag,
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, tag, message))
            }
        })
        .level(min_level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::SetLoggerError)?;

    info!(
        "Logging initialised at level {}, writing to {:?}",
        min_level, session.log_file_path
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The coloured three letter tag for a log level.
fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}
