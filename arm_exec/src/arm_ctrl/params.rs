//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- JOYSTICK ----
    /// Stick deflections from the calibrated centre at or below this are ignored.
    ///
    /// Units: raw analog counts
    pub deadband: i32,

    /// Time between the two reads of the quick open button.
    ///
    /// Units: milliseconds
    pub debounce_ms: u32,

    // ---- MOTION ----
    /// Size of the step a motor makes each cycle its stick is deflected.
    ///
    /// Units: degrees
    pub step_deg: i32,

    /// Delay at the end of every cycle.
    ///
    /// Units: milliseconds
    pub cycle_delay_ms: u32,

    // ---- GEOMETRY ----
    /// Coupling between the height and reach motors.
    pub coupling: CouplingParams,
}

/// Linear coupling between the height and reach motors.
///
/// The height floor for a given reach angle is `reach * slope + offset`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingParams {
    /// Units: degrees/degree
    pub slope: f64,

    /// Units: degrees
    pub offset: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            deadband: 200,
            debounce_ms: 20,
            step_deg: 5,
            cycle_delay_ms: 20,
            coupling: CouplingParams::default(),
        }
    }
}

impl Default for CouplingParams {
    fn default() -> Self {
        Self {
            slope: -0.75,
            offset: 165.0,
        }
    }
}
