//! # Joystick
//!
//! A dual axis joystick with an optional push button. Each axis has a calibrated centre ("mean")
//! which the control loop subtracts from the raw reading to get the stick deflection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::delay::DelayMs;
use log::debug;
use std::fmt::Write;

use crate::hal::{AnalogInput, ChannelId, DigitalInput, Level};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Centre value used before the joystick has been calibrated.
pub const DEFAULT_MEAN: i32 = 500;

/// Number of samples averaged per axis during calibration.
pub const CALIBRATION_ITERATIONS: i32 = 10;

/// Time given to the sample-and-hold circuit after the multiplexer switches channel.
///
/// Units: milliseconds
pub const SETTLE_DELAY_MS: u32 = 5;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A dual axis joystick.
pub struct Joystick<R, D> {
    reader: R,
    delay: D,

    x_channel: ChannelId,
    y_channel: ChannelId,
    button_channel: Option<ChannelId>,

    mean_x: i32,
    mean_y: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R, D> Joystick<R, D>
where
    R: AnalogInput + DigitalInput,
    D: DelayMs<u32>,
{
    /// Create a new joystick on the given channels.
    ///
    /// The centres start at [`DEFAULT_MEAN`] and must be calibrated before the deflection can be
    /// trusted.
    pub fn new(
        reader: R,
        delay: D,
        x_channel: ChannelId,
        y_channel: ChannelId,
        button_channel: Option<ChannelId>,
    ) -> Self {
        Self {
            reader,
            delay,
            x_channel,
            y_channel,
            button_channel,
            mean_x: DEFAULT_MEAN,
            mean_y: DEFAULT_MEAN,
        }
    }

    /// Calibrate the centre of both axes by averaging [`CALIBRATION_ITERATIONS`] samples of each.
    ///
    /// The stick must be at rest while this runs. Progress is written to `diag` if one is given.
    pub fn calibrate(&mut self, mut diag: Option<&mut dyn Write>) {
        if let Some(d) = diag.as_mut() {
            writeln!(
                d,
                "calibrating joystick x{} y{} ({} samples)",
                self.x_channel, self.y_channel, CALIBRATION_ITERATIONS
            )
            .ok();
        }

        let x_channel = self.x_channel;
        let y_channel = self.y_channel;
        self.mean_x = self.average(x_channel);
        self.mean_y = self.average(y_channel);

        debug!(
            "Joystick x{} y{} calibrated, means: x = {}, y = {}",
            self.x_channel, self.y_channel, self.mean_x, self.mean_y
        );

        if let Some(d) = diag.as_mut() {
            writeln!(d, "mean x: {} mean y: {}", self.mean_x, self.mean_y).ok();
        }
    }

    /// Read the raw X axis value.
    pub fn read_x(&mut self) -> i32 {
        let channel = self.x_channel;
        self.read_axis(channel)
    }

    /// Read the raw Y axis value.
    pub fn read_y(&mut self) -> i32 {
        let channel = self.y_channel;
        self.read_axis(channel)
    }

    /// Read the raw button level, or `None` if the joystick has no button.
    pub fn read_button(&mut self) -> Option<Level> {
        match self.button_channel {
            Some(c) => Some(self.reader.read_digital(c)),
            None => None,
        }
    }

    /// True if the button is held down (the line is active low).
    pub fn is_pressed(&mut self) -> bool {
        self.read_button() == Some(Level::Low)
    }

    /// The calibrated X centre.
    pub fn mean_x(&self) -> i32 {
        self.mean_x
    }

    /// The calibrated Y centre.
    pub fn mean_y(&self) -> i32 {
        self.mean_y
    }

    /// Produce the diagnostic dump, `x{ raw ; mean } y{ raw ; mean } b{ raw }`.
    ///
    /// The button segment is only present if the joystick has a button.
    pub fn dump(&mut self) -> String {
        let x = self.read_x();
        let y = self.read_y();

        let mut s = format!(
            "x{{ {} ; {} }} y{{ {} ; {} }}",
            x, self.mean_x, y, self.mean_y
        );

        if let Some(level) = self.read_button() {
            // Writing to a String can't fail
            write!(s, " b{{ {} }}", level.as_bit()).ok();
        }

        s
    }

    /// Sample an axis.
    ///
    /// The first conversion after the multiplexer switches channel is unreliable, so it is thrown
    /// away and the channel sampled again once the sample-and-hold has settled.
    fn read_axis(&mut self, channel: ChannelId) -> i32 {
        self.reader.read_analog(channel);
        self.delay.delay_ms(SETTLE_DELAY_MS);
        self.reader.read_analog(channel) as i32
    }

    fn average(&mut self, channel: ChannelId) -> i32 {
        let mut sum = 0;
        for _ in 0..CALIBRATION_ITERATIONS {
            sum += self.read_axis(channel);
        }
        sum / CALIBRATION_ITERATIONS
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::{SimDelay, SimPanel};

    const X: ChannelId = ChannelId(0);
    const Y: ChannelId = ChannelId(1);
    const BTN: ChannelId = ChannelId(7);

    fn joystick(button: Option<ChannelId>) -> (SimPanel, SimDelay, Joystick<SimPanel, SimDelay>) {
        let panel = SimPanel::new(512);
        let delay = SimDelay::default();
        let joy = Joystick::new(panel.clone(), delay.clone(), X, Y, button);
        (panel, delay, joy)
    }

    #[test]
    fn test_calibration_converges() {
        let (panel, _, mut joy) = joystick(None);

        assert_eq!(joy.mean_x(), DEFAULT_MEAN);
        assert_eq!(joy.mean_y(), DEFAULT_MEAN);

        panel.set_analog(X, 731);
        panel.set_analog(Y, 731);
        joy.calibrate(None);

        assert_eq!(joy.mean_x(), 731);
        assert_eq!(joy.mean_y(), 731);
    }

    #[test]
    fn test_calibration_diagnostics() {
        let (panel, _, mut joy) = joystick(None);
        panel.set_analog(X, 498);
        panel.set_analog(Y, 530);

        let mut diag = String::new();
        joy.calibrate(Some(&mut diag as &mut dyn Write));

        assert!(diag.starts_with("calibrating joystick x0 y1"));
        assert!(diag.contains("mean x: 498 mean y: 530"));
    }

    #[test]
    fn test_read_discards_first_sample() {
        let (panel, delay, mut joy) = joystick(None);
        panel.set_analog(X, 100);

        assert_eq!(joy.read_x(), 100);
        assert_eq!(panel.analog_read_count(X), 2);
        assert_eq!(panel.analog_read_count(Y), 0);
        assert_eq!(delay.total_ms(), SETTLE_DELAY_MS as u64);
    }

    #[test]
    fn test_mean_unchanged_by_sampling() {
        let (panel, _, mut joy) = joystick(None);
        joy.calibrate(None);

        panel.set_analog(X, 1000);
        panel.set_analog(Y, 3);
        joy.read_x();
        joy.read_y();

        assert_eq!(joy.mean_x(), 512);
        assert_eq!(joy.mean_y(), 512);
    }

    #[test]
    fn test_button() {
        let (panel, delay, mut joy) = joystick(Some(BTN));

        assert_eq!(joy.read_button(), Some(Level::High));
        assert!(!joy.is_pressed());

        panel.set_digital(BTN, Level::Low);
        assert!(joy.is_pressed());

        // Button reads don't wait
        assert_eq!(delay.total_ms(), 0);

        let (_, _, mut no_button) = joystick(None);
        assert_eq!(no_button.read_button(), None);
        assert!(!no_button.is_pressed());
    }

    #[test]
    fn test_dump() {
        let (panel, _, mut joy) = joystick(Some(BTN));
        joy.calibrate(None);
        panel.set_analog(X, 900);
        panel.set_analog(Y, 20);

        assert_eq!(joy.dump(), "x{ 900 ; 512 } y{ 20 ; 512 } b{ 1 }");

        let (_, _, mut no_button) = joystick(None);
        assert_eq!(no_button.dump(), "x{ 512 ; 500 } y{ 512 ; 500 }");
    }
}
