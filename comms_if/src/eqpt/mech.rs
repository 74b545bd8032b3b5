//! # Mechanisms Equipment Identifiers

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of motors on the arm.
pub const NUM_MOTORS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all motors on the arm.
///
/// The discriminant is the motor's ordinal, which indexes both the actuator arena and the
/// persisted limit slots.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum MotorId {
    Base = 0,
    Reach = 1,
    Height = 2,
    Claw = 3,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl MotorId {
    /// All motors in ordinal order.
    pub const ALL: [MotorId; NUM_MOTORS] = [
        MotorId::Base,
        MotorId::Reach,
        MotorId::Height,
        MotorId::Claw,
    ];

    /// The ordinal of this motor.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the motor with the given ordinal, if there is one.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human readable name of the motor.
    pub fn name(self) -> &'static str {
        match self {
            MotorId::Base => "base",
            MotorId::Reach => "reach",
            MotorId::Height => "height",
            MotorId::Claw => "claw",
        }
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
