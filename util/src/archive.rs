//! Cyclic data archiving
//!
//! Modules archive their per cycle outputs and status reports as CSV files under the
//! session's `arch` directory. A struct which owns archives implements [`Archived`], holding
//! one [`Archiver`] per file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes records into one CSV archive file.
///
/// A default constructed archiver has no backing file and cannot be written, it exists so
/// module structs can derive `Default`. Usable archivers come from [`Archiver::from_path`].
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Could not create the archive file: {0}")]
    FileError(std::io::Error),

    #[error("Could not write the record: {0}")]
    WriteError(csv::Error),

    #[error("The archiver has no backing file, was it initialised?")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A struct which archives data as CSV files in the session directory.
///
/// Implementors hold an [`Archiver`] member for each file they write, set up during their
/// `init`, and serialise the cycle's records in `write`.
pub trait Archived {
    /// Write this cycle's records into the archives.
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver writing to the given path relative to the session's archive
    /// root.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let file = File::create(session.arch_root.join(path)).map_err(ArchiveError::FileError)?;

        let writer = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Serialise a record as one row of the archive.
    ///
    /// Records must be flat structs, the csv writer cannot handle nesting. Rows are flushed
    /// as they are written.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        let writer = match self.writer {
            Some(ref mut w) => w,
            None => return Err(ArchiveError::NotInitialised),
        };

        writer.serialize(record).map_err(ArchiveError::WriteError)?;
        writer.flush().map_err(ArchiveError::FileError)?;

        Ok(())
    }
}
