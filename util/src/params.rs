//! Parameter file loading
//!
//! Parameters live as TOML files under the software root's `params` directory and are
//! deserialised straight into each module's `Params` struct.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (LYNX_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot parse the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file into a deserialisable struct.
///
/// `param_file_name` is relative to the software root's `params` directory.
pub fn load<P: DeserializeOwned>(param_file_name: &str) -> Result<P, LoadError> {
    let path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?
        .join("params")
        .join(param_file_name);

    let params_str =
        fs::read_to_string(&path).map_err(|e| LoadError::FileLoadError(path.clone(), e))?;

    toml::from_str(&params_str).map_err(|e| LoadError::DeserialiseError(path, e))
}
