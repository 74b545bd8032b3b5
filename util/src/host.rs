//! Host platform (linux for example) utility functions

use std::{env, path::PathBuf};

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "ARM_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the arm software, as given by `ARM_SW_ROOT`.
///
/// Parameter files and session directories are all resolved relative to this root.
pub fn get_arm_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
