//! # Hardware Capabilities
//!
//! The core never touches hardware registers directly. It reads analog and digital lines through
//! the narrow traits defined here and waits using `embedded-hal`'s [`DelayMs`]. The simulated
//! implementations in this module back the host executable and the unit tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::delay::DelayMs;
use serde::{Deserialize, Serialize};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
    thread,
    time::Duration,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Highest value an analog read can return (10 bit converter).
pub const ANALOG_MAX: u16 = 1023;

/// Value a simulated analog channel reads when nothing has been set on it.
pub const DEFAULT_REST_VALUE: u16 = 512;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifies a hardware channel (an analog input, digital pin or PWM output).
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(transparent)]
pub struct ChannelId(pub u8);

/// Simulated input panel providing both analog and digital lines.
///
/// Clones share the same underlying state, so a test (or the executable) can keep a handle and
/// move the "sticks" while the joysticks own their own copies.
#[derive(Clone)]
pub struct SimPanel {
    state: Rc<RefCell<PanelState>>,
}

/// Blocking delay using the host's thread sleep.
#[derive(Debug, Default, Copy, Clone)]
pub struct StdDelay;

/// Delay which doesn't wait, only accumulating the total requested time.
///
/// Clones share the same total.
#[derive(Debug, Default, Clone)]
pub struct SimDelay {
    total_ms: Rc<Cell<u64>>,
}

struct PanelState {
    rest_value: u16,
    analog: HashMap<ChannelId, u16>,
    digital: HashMap<ChannelId, Level>,
    analog_read_counts: HashMap<ChannelId, usize>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Logic level of a digital line.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Level {
    High,
    Low,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Reads a raw analog channel.
pub trait AnalogInput {
    /// Sample the channel, returning a value in `0..=ANALOG_MAX`.
    fn read_analog(&mut self, channel: ChannelId) -> u16;
}

/// Reads a digital line. Lines are configured with their pull-up enabled.
pub trait DigitalInput {
    fn read_digital(&mut self, channel: ChannelId) -> Level;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Level {
    /// The raw bit value of the level, as a digital read would return it.
    pub fn as_bit(self) -> u8 {
        match self {
            Level::High => 1,
            Level::Low => 0,
        }
    }
}

impl SimPanel {
    /// Create a new panel where every analog channel rests at `rest_value`.
    pub fn new(rest_value: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(PanelState {
                rest_value: rest_value.min(ANALOG_MAX),
                analog: HashMap::new(),
                digital: HashMap::new(),
                analog_read_counts: HashMap::new(),
            })),
        }
    }

    /// Set the value read back from an analog channel.
    pub fn set_analog(&self, channel: ChannelId, value: u16) {
        self.state.borrow_mut().analog.insert(channel, value.min(ANALOG_MAX));
    }

    /// Return an analog channel to the rest value.
    pub fn release_analog(&self, channel: ChannelId) {
        self.state.borrow_mut().analog.remove(&channel);
    }

    /// Set the level of a digital line.
    pub fn set_digital(&self, channel: ChannelId, level: Level) {
        self.state.borrow_mut().digital.insert(channel, level);
    }

    /// Number of times the given analog channel has been sampled.
    pub fn analog_read_count(&self, channel: ChannelId) -> usize {
        self.state
            .borrow()
            .analog_read_counts
            .get(&channel)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for SimPanel {
    fn default() -> Self {
        Self::new(DEFAULT_REST_VALUE)
    }
}

impl AnalogInput for SimPanel {
    fn read_analog(&mut self, channel: ChannelId) -> u16 {
        let mut state = self.state.borrow_mut();
        *state.analog_read_counts.entry(channel).or_insert(0) += 1;

        match state.analog.get(&channel) {
            Some(v) => *v,
            None => state.rest_value,
        }
    }
}

impl DigitalInput for SimPanel {
    fn read_digital(&mut self, channel: ChannelId) -> Level {
        // Unconnected lines are pulled up
        self.state
            .borrow()
            .digital
            .get(&channel)
            .copied()
            .unwrap_or(Level::High)
    }
}

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

impl SimDelay {
    /// Total time requested from this delay (and all its clones) so far.
    pub fn total_ms(&self) -> u64 {
        self.total_ms.get()
    }
}

impl DelayMs<u32> for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms.set(self.total_ms.get() + ms as u64);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_panel() {
        let panel = SimPanel::new(500);
        let mut reader = panel.clone();

        assert_eq!(reader.read_analog(ChannelId(0)), 500);
        panel.set_analog(ChannelId(0), 2000);
        assert_eq!(reader.read_analog(ChannelId(0)), ANALOG_MAX);
        panel.release_analog(ChannelId(0));
        assert_eq!(reader.read_analog(ChannelId(0)), 500);
        assert_eq!(panel.analog_read_count(ChannelId(0)), 3);
        assert_eq!(panel.analog_read_count(ChannelId(1)), 0);

        assert_eq!(reader.read_digital(ChannelId(4)), Level::High);
        panel.set_digital(ChannelId(4), Level::Low);
        assert_eq!(reader.read_digital(ChannelId(4)), Level::Low);
    }

    #[test]
    fn test_sim_delay() {
        let delay = SimDelay::default();
        let mut other = delay.clone();

        other.delay_ms(5);
        other.delay_ms(20);
        assert_eq!(delay.total_ms(), 25);
    }
}
