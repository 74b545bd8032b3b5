//! Height/reach angle correction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::MotorId;
use log::trace;

// Internal imports
use super::CouplingParams;
use crate::servo_ctrl::{AngleActuator, Servos};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Correct a proposed angle for `motor` so that it respects the arm geometry and the motor's own
/// limits.
///
/// Height and reach share the arm's reach envelope. The further out the reach motor is, the lower
/// the floor on the height motor (`reach * slope + offset`), and the reach motor has the
/// equivalent floor derived from the height motor's angle. A proposed angle below the floor is
/// raised to it. The result is then clamped into the motor's `[min, max]`.
///
/// The partner motor's angle is read every call since it moves between cycles.
pub fn correct<S: AngleActuator>(
    motor: MotorId,
    proposed_deg: i32,
    servos: &Servos<S>,
    coupling: &CouplingParams,
) -> i32 {
    let mut angle = proposed_deg;

    let floor = match motor {
        MotorId::Height => {
            let reach = servos[MotorId::Reach].read() as f64;
            Some(reach * coupling.slope + coupling.offset)
        }
        MotorId::Reach => {
            let height = servos[MotorId::Height].read() as f64;
            Some((height - coupling.offset) / coupling.slope)
        }
        MotorId::Base | MotorId::Claw => None,
    };

    if let Some(floor) = floor {
        if (angle as f64) < floor {
            trace!("{} {} raised to coupling floor {:.2}", motor, angle, floor);
            angle = floor as i32;
        }
    }

    angle.clamp(servos[motor].min(), servos[motor].max())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        hal::ChannelId,
        servo_ctrl::{sim::SimServo, BoundedActuator},
    };

    /// Servos with the default limits, attached, at the given reach and height angles.
    fn servos(reach: i32, height: i32) -> Servos<SimServo> {
        let limits = [(10, 170), (60, 170), (60, 170), (100, 170)];
        let mut servos = Servos::new([
            BoundedActuator::new(SimServo::default(), ChannelId(9)),
            BoundedActuator::new(SimServo::default(), ChannelId(10)),
            BoundedActuator::new(SimServo::default(), ChannelId(11)),
            BoundedActuator::new(SimServo::default(), ChannelId(12)),
        ]);

        for (motor, (min, max)) in MotorId::ALL.iter().zip(limits.iter()) {
            servos[*motor].set_min(*min);
            servos[*motor].set_max(*max);
        }
        servos.attach_all();

        servos[MotorId::Reach].write(reach);
        servos[MotorId::Height].write(height);
        servos
    }

    #[test]
    fn test_height_floor() {
        let servos = servos(60, 120);
        let coupling = CouplingParams::default();

        // 60 * -0.75 + 165
        assert_eq!(correct(MotorId::Height, 0, &servos, &coupling), 120);
        assert_eq!(correct(MotorId::Height, 119, &servos, &coupling), 120);

        // Above the floor only the limits apply
        assert_eq!(correct(MotorId::Height, 150, &servos, &coupling), 150);
        assert_eq!(correct(MotorId::Height, 400, &servos, &coupling), 170);
    }

    #[test]
    fn test_height_floor_clamped_to_limits() {
        // Reach at its lowest gives a floor above the height max
        let mut servos = servos(60, 120);
        servos[MotorId::Height].set_max(110);

        let coupling = CouplingParams::default();
        assert_eq!(correct(MotorId::Height, 0, &servos, &coupling), 110);
    }

    #[test]
    fn test_reach_floor() {
        let servos = servos(90, 120);
        let coupling = CouplingParams::default();

        // (120 - 165) / -0.75
        assert_eq!(correct(MotorId::Reach, 0, &servos, &coupling), 60);
        assert_eq!(correct(MotorId::Reach, 100, &servos, &coupling), 100);

        // Height at 90 puts the reach floor at 100
        let servos = self::servos(90, 90);
        assert_eq!(correct(MotorId::Reach, 70, &servos, &coupling), 100);
    }

    #[test]
    fn test_floor_truncates() {
        // 61 * -0.75 + 165 = 119.25
        let servos = servos(61, 120);
        let coupling = CouplingParams::default();
        assert_eq!(correct(MotorId::Height, 100, &servos, &coupling), 119);
    }

    #[test]
    fn test_uncoupled_motors() {
        let servos = servos(60, 60);
        let coupling = CouplingParams::default();

        assert_eq!(correct(MotorId::Base, 0, &servos, &coupling), 10);
        assert_eq!(correct(MotorId::Base, 95, &servos, &coupling), 95);
        assert_eq!(correct(MotorId::Claw, 50, &servos, &coupling), 100);
        assert_eq!(correct(MotorId::Claw, 175, &servos, &coupling), 170);
    }
}
