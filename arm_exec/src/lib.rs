//! # Arm library.
//!
//! This library holds the control core of the arm: joystick sampling, bounded servos, the
//! height/reach angle coupling, the persisted limit store and the per-cycle control loop. The
//! `arm_exec` executable wires these up to hardware (or the simulated equivalents in [`hal`] and
//! [`servo_ctrl::sim`]).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware capability interfaces consumed by the core
pub mod hal;

/// Joystick sampling and centre calibration
pub mod joystick;

/// Bounded servos - every angle written is clamped into the servo's travel limits
pub mod servo_ctrl;

/// Non-volatile storage of the servo travel limits
pub mod config_store;

/// Arm control module - converts joystick deflection into servo steps each cycle
pub mod arm_ctrl;

/// Process-wide arm state shared by the control loop and the telecommand processor
pub mod data_store;

/// Telecommand processor - executes commands from the operator's text stream
pub mod tc_processor;

/// Parameters for the arm executable
pub mod params;
