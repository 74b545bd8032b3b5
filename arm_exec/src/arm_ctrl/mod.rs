//! Arm control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod angle_corr;
mod cycle;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use angle_corr::*;
pub use cycle::*;
pub use params::*;

use crate::config_store::ConfigStoreError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Could not persist the servo limits: {0}")]
    PersistFailed(ConfigStoreError),
}
