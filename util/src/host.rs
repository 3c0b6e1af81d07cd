//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use thiserror::Error;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "LYNX_SW_ROOT";

/// Possible errors when querying the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable (LYNX_SW_ROOT) is not set")]
    SwRootNotSet
}

/// Get the software root directory from the environment.
///
/// The root holds the `params` and `sessions` directories and is pointed at
/// by the `LYNX_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, HostError> {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => Err(HostError::SwRootNotSet)
    }
}
