//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::NUM_MOTORS;
use serde::{Deserialize, Serialize};

use crate::{arm_ctrl, hal::ChannelId};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmExecParams {
    /// Minimum level to log at, one of `"info"`, `"debug"` or `"trace"`
    pub log_level: String,

    /// Path of the limit store image, relative to the software root
    pub store_path: String,

    /// Offset of the limit layout within the store.
    ///
    /// Units: bytes
    pub store_offset: usize,

    /// If true limit edits made with `<` and `>` are written to the store immediately
    #[serde(default)]
    pub persist_limit_edits: bool,

    /// If true the executable exits once its command input is closed
    #[serde(default = "default_exit_on_eof")]
    pub exit_on_eof: bool,

    /// Value the simulated sticks read at rest.
    ///
    /// Units: raw analog counts
    pub sim_rest_value: u16,

    /// Hardware channel assignments
    pub channels: ChannelParams,

    /// Control loop parameters
    #[serde(default)]
    pub arm_ctrl: arm_ctrl::Params,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelParams {
    // ---- LEFT STICK ----
    pub left_x: ChannelId,
    pub left_y: ChannelId,
    pub left_button: Option<ChannelId>,

    // ---- RIGHT STICK ----
    pub right_x: ChannelId,
    pub right_y: ChannelId,
    pub right_button: Option<ChannelId>,

    // ---- SERVOS ----
    /// PWM output for each servo, in base, reach, height, claw order
    pub servos: [ChannelId; NUM_MOTORS],
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_exit_on_eof() -> bool {
    true
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = r#"
        log_level = "debug"
        store_path = "data/arm_limits.bin"
        store_offset = 0
        sim_rest_value = 512

        [channels]
        left_x = 0
        left_y = 1
        right_x = 2
        right_y = 3
        right_button = 4
        servos = [9, 10, 11, 12]

        [arm_ctrl]
        deadband = 150

        [arm_ctrl.coupling]
        offset = 160.0
    "#;

    #[test]
    fn test_parse() {
        let p: ArmExecParams = util::params::parse(PARAMS).unwrap();

        assert_eq!(p.log_level, "debug");
        assert!(!p.persist_limit_edits);
        assert!(p.exit_on_eof);
        assert_eq!(p.channels.left_button, None);
        assert_eq!(p.channels.right_button, Some(ChannelId(4)));
        assert_eq!(p.channels.servos[2], ChannelId(11));

        // Unset control parameters keep their defaults
        assert_eq!(p.arm_ctrl.deadband, 150);
        assert_eq!(p.arm_ctrl.step_deg, 5);
        assert_eq!(p.arm_ctrl.coupling.slope, -0.75);
        assert_eq!(p.arm_ctrl.coupling.offset, 160.0);
    }

    #[test]
    fn test_missing_channels_rejected() {
        assert!(util::params::parse::<ArmExecParams>("log_level = \"info\"").is_err());
    }
}
