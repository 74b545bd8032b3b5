//! [`AngleActuator`] implementation for a simulated servo

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::{cell::RefCell, rc::Rc};

use super::AngleActuator;
use crate::hal::ChannelId;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Angle a servo reports before it has ever been written.
const POWER_ON_ANGLE: i32 = 90;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A simulated servo which only remembers what it was told.
///
/// Clones share the same state so the servo can be observed after it has been handed to a
/// [`BoundedActuator`](super::BoundedActuator).
#[derive(Clone, Default)]
pub struct SimServo {
    state: Rc<RefCell<SimServoState>>,
}

struct SimServoState {
    channel: Option<ChannelId>,
    angle: i32,
    num_writes: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimServoState {
    fn default() -> Self {
        Self {
            channel: None,
            angle: POWER_ON_ANGLE,
            num_writes: 0,
        }
    }
}

impl SimServo {
    /// The current angle of the servo.
    pub fn angle(&self) -> i32 {
        self.state.borrow().angle
    }

    /// The channel the servo was attached on, if it has been.
    pub fn channel(&self) -> Option<ChannelId> {
        self.state.borrow().channel
    }

    /// Number of angle commands the servo has received.
    pub fn num_writes(&self) -> usize {
        self.state.borrow().num_writes
    }
}

impl AngleActuator for SimServo {
    fn attach(&mut self, channel: ChannelId) -> bool {
        self.state.borrow_mut().channel = Some(channel);
        true
    }

    fn write_angle(&mut self, angle: i32) {
        let mut state = self.state.borrow_mut();
        trace!("Sim servo {:?} -> {}", state.channel, angle);
        state.angle = angle;
        state.num_writes += 1;
    }

    fn read_angle(&self) -> i32 {
        self.state.borrow().angle
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().channel.is_some()
    }
}
