//! # Servo Controller Module
//!
//! This module provides the bounded servo abstraction. A [`BoundedActuator`] wraps any driver
//! implementing [`AngleActuator`] and restricts it to a configurable sub-range of its travel.
//! Every angle written goes through the clamp, there is no way to command the driver around it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`AngleActuator`] implementation for a simulated servo.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{MotorId, NUM_MOTORS};
use log::{debug, warn};
use std::{
    fmt,
    ops::{Index, IndexMut},
};

use crate::hal::ChannelId;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Lowest angle a servo can physically reach.
///
/// Units: degrees
pub const ANGLE_MIN: i32 = 0;

/// Highest angle a servo can physically reach.
///
/// Units: degrees
pub const ANGLE_MAX: i32 = 180;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing angle commanded servo drivers.
pub trait AngleActuator {

    /// Activate the driver's output on the given channel. Returns `true` on success.
    fn attach(&mut self, channel: ChannelId) -> bool;

    /// Command the servo to an angle in degrees.
    fn write_angle(&mut self, angle: i32);

    /// The last angle commanded.
    fn read_angle(&self) -> i32;

    /// True if the driver's output is active.
    fn is_attached(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A servo whose commanded angle is always kept within `[min, max]`.
///
/// The limits are kept as the last requested minimum and maximum. The effective limits are the
/// smaller and larger of the two, so `min() <= max()` holds whatever order they are set in.
pub struct BoundedActuator<S> {
    actuator: S,
    channel: ChannelId,

    requested_min: i32,
    requested_max: i32,
}

/// The arm's servos, one per [`MotorId`].
pub struct Servos<S>([BoundedActuator<S>; NUM_MOTORS]);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S: AngleActuator> BoundedActuator<S> {
    /// Wrap a driver which will be attached on `channel`. The limits start at the full travel.
    pub fn new(actuator: S, channel: ChannelId) -> Self {
        Self {
            actuator,
            channel,
            requested_min: ANGLE_MIN,
            requested_max: ANGLE_MAX,
        }
    }

    /// Attach the driver and move the servo to the middle of its limits as a safe rest position.
    ///
    /// Must be called once before the servo is written.
    pub fn attach(&mut self) -> bool {
        let attached = self.actuator.attach(self.channel);

        if !attached {
            warn!("Could not attach servo on channel {}", self.channel);
        }

        let rest = (self.min() + self.max()) / 2;
        debug!("Servo on channel {} attached, resting at {}", self.channel, rest);
        self.actuator.write_angle(rest);

        attached
    }

    /// The last angle commanded.
    pub fn read(&self) -> i32 {
        self.actuator.read_angle()
    }

    /// Command the servo to `angle`, clamped into the limits.
    pub fn write(&mut self, angle: i32) {
        let clamped = angle.clamp(self.min(), self.max());
        self.actuator.write_angle(clamped);
    }

    /// Set the minimum limit, clamped into the physical travel.
    pub fn set_min(&mut self, value: i32) {
        self.requested_min = value.clamp(ANGLE_MIN, ANGLE_MAX);
    }

    /// Set the maximum limit, clamped into the physical travel.
    pub fn set_max(&mut self, value: i32) {
        self.requested_max = value.clamp(ANGLE_MIN, ANGLE_MAX);
    }

    /// The minimum limit.
    pub fn min(&self) -> i32 {
        self.requested_min.min(self.requested_max)
    }

    /// The maximum limit.
    pub fn max(&self) -> i32 {
        self.requested_min.max(self.requested_max)
    }

    /// True if the underlying driver is attached.
    pub fn is_attached(&self) -> bool {
        self.actuator.is_attached()
    }

    /// The channel the servo is attached on.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }
}

/// Diagnostic dump, `attached { min ; current ; max }`.
impl<S: AngleActuator> fmt::Display for BoundedActuator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ {} ; {} ; {} }}",
            self.is_attached() as u8,
            self.min(),
            self.read(),
            self.max()
        )
    }
}

impl<S: AngleActuator> Servos<S> {
    /// Build the set from one servo per motor, in [`MotorId`] ordinal order.
    pub fn new(servos: [BoundedActuator<S>; NUM_MOTORS]) -> Self {
        Self(servos)
    }

    /// Attach every servo, returning the motors which failed to attach.
    pub fn attach_all(&mut self) -> Vec<MotorId> {
        let mut failed = Vec::new();

        for motor in MotorId::ALL.iter() {
            if !self[*motor].attach() {
                failed.push(*motor);
            }
        }

        failed
    }

    /// Iterate over the servos along with their motor.
    pub fn iter(&self) -> impl Iterator<Item = (MotorId, &BoundedActuator<S>)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, servo)| (MotorId::ALL[i], servo))
    }
}

impl<S> Index<MotorId> for Servos<S> {
    type Output = BoundedActuator<S>;

    fn index(&self, motor: MotorId) -> &Self::Output {
        &self.0[motor.index()]
    }
}

impl<S> IndexMut<MotorId> for Servos<S> {
    fn index_mut(&mut self, motor: MotorId) -> &mut Self::Output {
        &mut self.0[motor.index()]
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use sim::SimServo;

    fn servo(min: i32, max: i32) -> (SimServo, BoundedActuator<SimServo>) {
        let sim = SimServo::default();
        let mut s = BoundedActuator::new(sim.clone(), ChannelId(9));
        s.set_min(min);
        s.set_max(max);
        (sim, s)
    }

    #[test]
    fn test_write_clamps() {
        let (sim, mut s) = servo(60, 170);

        for angle in -400..400 {
            s.write(angle);
            assert_eq!(s.read(), angle.clamp(60, 170));
            assert_eq!(sim.angle(), angle.clamp(60, 170));
        }
    }

    #[test]
    fn test_attach_rests_at_midpoint() {
        let (sim, mut s) = servo(10, 171);

        assert!(!s.is_attached());
        assert!(s.attach());
        assert!(s.is_attached());
        assert_eq!(sim.channel(), Some(ChannelId(9)));
        assert_eq!(s.read(), 90);
    }

    #[test]
    fn test_limits_clamped_to_travel() {
        let (_, s) = servo(-20, 400);
        assert_eq!(s.min(), ANGLE_MIN);
        assert_eq!(s.max(), ANGLE_MAX);
    }

    #[test]
    fn test_limit_ordering() {
        let (_, mut s) = servo(10, 170);

        // Min above max swaps the pair
        s.set_min(175);
        assert_eq!((s.min(), s.max()), (170, 175));

        // And the last requested values decide the final pair
        s.set_max(100);
        assert_eq!((s.min(), s.max()), (100, 175));

        let sequence = [(0, 180), (90, 45), (200, -5), (33, 33), (120, 60)];
        for &(v1, v2) in sequence.iter() {
            s.set_min(v1);
            assert!(s.min() <= s.max());
            s.set_max(v2);
            assert!(s.min() <= s.max());

            let v1 = v1.clamp(ANGLE_MIN, ANGLE_MAX);
            let v2 = v2.clamp(ANGLE_MIN, ANGLE_MAX);
            assert_eq!(s.min(), v1.min(v2));
            assert_eq!(s.max(), v1.max(v2));
        }
    }

    #[test]
    fn test_display() {
        let (_, mut s) = servo(10, 170);
        assert_eq!(format!("{}", s), "0 { 10 ; 90 ; 170 }");

        s.attach();
        s.write(200);
        assert_eq!(format!("{}", s), "1 { 10 ; 170 ; 170 }");
    }

    #[test]
    fn test_servos_index() {
        let mut servos = Servos::new([
            BoundedActuator::new(SimServo::default(), ChannelId(9)),
            BoundedActuator::new(SimServo::default(), ChannelId(10)),
            BoundedActuator::new(SimServo::default(), ChannelId(11)),
            BoundedActuator::new(SimServo::default(), ChannelId(12)),
        ]);

        servos[MotorId::Height].set_min(60);
        assert_eq!(servos[MotorId::Height].channel(), ChannelId(11));
        assert_eq!(servos[MotorId::Height].min(), 60);
        assert_eq!(servos[MotorId::Reach].min(), ANGLE_MIN);

        assert!(servos.attach_all().is_empty());
        let motors: Vec<MotorId> = servos.iter().map(|(m, _)| m).collect();
        assert_eq!(motors, MotorId::ALL.to_vec());
    }
}
