//! Cyclic processing of arm control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::mech::{MotorId, NUM_MOTORS};
use embedded_hal::blocking::delay::DelayMs;
use log::{info, trace};
use serde::Serialize;

// Internal
use super::correct;
use crate::{
    config_store::ByteStore,
    data_store::ArmState,
    hal::{AnalogInput, DigitalInput},
    servo_ctrl::AngleActuator,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Which stick axis drives each motor, in the order they are evaluated each cycle.
///
/// A positive deflection moves the motor by `polarity * step`.
pub const AXIS_BINDINGS: [AxisBinding; NUM_MOTORS] = [
    AxisBinding {
        motor: MotorId::Height,
        stick: Stick::Left,
        axis: Axis::X,
        polarity: -1,
    },
    AxisBinding {
        motor: MotorId::Base,
        stick: Stick::Left,
        axis: Axis::Y,
        polarity: 1,
    },
    AxisBinding {
        motor: MotorId::Reach,
        stick: Stick::Right,
        axis: Axis::X,
        polarity: -1,
    },
    AxisBinding {
        motor: MotorId::Claw,
        stick: Stick::Right,
        axis: Axis::Y,
        polarity: 1,
    },
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Binds a motor to the joystick axis which drives it.
#[derive(Clone, Copy, Debug)]
pub struct AxisBinding {
    pub motor: MotorId,
    pub stick: Stick,
    pub axis: Axis,
    pub polarity: i32,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Angle written to each motor this cycle, indexed by [`MotorId`] ordinal. `None` if the
    /// motor's stick was inside the deadband.
    pub commanded_deg: [Option<i32>; NUM_MOTORS],

    /// True if the claw was snapped open this cycle.
    pub quick_open: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Stick {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Axis {
    X,
    Y,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Perform one control cycle.
///
/// Each motor whose stick is deflected past the deadband is stepped, in [`AXIS_BINDINGS`] order,
/// each step fully written before the next motor is evaluated. The claw is then snapped open if
/// the right stick's button is held, and the cycle ends with the fixed inter-cycle delay.
pub fn proc<R, S, B, D>(state: &mut ArmState<R, S, B, D>) -> StatusReport
where
    R: AnalogInput + DigitalInput,
    S: AngleActuator,
    B: ByteStore,
    D: DelayMs<u32>,
{
    let mut report = StatusReport::default();

    for binding in AXIS_BINDINGS.iter() {
        let delta = axis_delta(state, binding.stick, binding.axis);

        if let Some(direction) = step_direction(delta, state.params.deadband) {
            let angle = step_motor(state, binding.motor, binding.polarity * direction);
            report.commanded_deg[binding.motor.index()] = Some(angle);
        }
    }

    if quick_open_requested(state) {
        let open_deg = state.servos[MotorId::Claw].min();
        state.servos[MotorId::Claw].write(open_deg);
        report.quick_open = true;
        info!("Claw quick open to {}", open_deg);
    }

    state.delay.delay_ms(state.params.cycle_delay_ms);
    state.num_cycles += 1;

    report
}

/// Get the step direction (`-1` or `1`) for a stick deflection, or `None` if the deflection is
/// inside the deadband.
pub fn step_direction(delta: i32, deadband: i32) -> Option<i32> {
    if delta.abs() > deadband {
        Some(delta.signum())
    } else {
        None
    }
}

/// Step `motor` by one step in `direction`, applying the angle correction.
///
/// Returns the angle the motor was commanded to.
pub fn step_motor<R, S, B, D>(state: &mut ArmState<R, S, B, D>, motor: MotorId, direction: i32) -> i32
where
    R: AnalogInput + DigitalInput,
    S: AngleActuator,
    B: ByteStore,
    D: DelayMs<u32>,
{
    let current = state.servos[motor].read();
    let proposed = current + direction * state.params.step_deg;
    let corrected = correct(motor, proposed, &state.servos, &state.params.coupling);

    state.servos[motor].write(corrected);

    let angle = state.servos[motor].read();
    trace!("{} step {} -> {} (proposed {})", motor, current, angle, proposed);

    angle
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Deflection of a stick axis from its calibrated centre.
fn axis_delta<R, S, B, D>(state: &mut ArmState<R, S, B, D>, stick: Stick, axis: Axis) -> i32
where
    R: AnalogInput + DigitalInput,
    D: DelayMs<u32>,
{
    let joystick = match stick {
        Stick::Left => &mut state.left,
        Stick::Right => &mut state.right,
    };

    match axis {
        Axis::X => joystick.read_x() - joystick.mean_x(),
        Axis::Y => joystick.read_y() - joystick.mean_y(),
    }
}

/// Debounced check of the right stick's button, it must read pressed twice, `debounce_ms` apart.
fn quick_open_requested<R, S, B, D>(state: &mut ArmState<R, S, B, D>) -> bool
where
    R: AnalogInput + DigitalInput,
    D: DelayMs<u32>,
{
    if !state.right.is_pressed() {
        return false;
    }

    state.delay.delay_ms(state.params.debounce_ms);
    state.right.is_pressed()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        data_store::test_rig::{SimRig, LEFT_X, LEFT_Y, RIGHT_BUTTON, RIGHT_X, RIGHT_Y},
        hal::Level,
        joystick::SETTLE_DELAY_MS,
    };

    #[test]
    fn test_step_direction() {
        assert_eq!(step_direction(0, 200), None);
        assert_eq!(step_direction(200, 200), None);
        assert_eq!(step_direction(-200, 200), None);
        assert_eq!(step_direction(201, 200), Some(1));
        assert_eq!(step_direction(-201, 200), Some(-1));
    }

    #[test]
    fn test_deadband_gating() {
        let mut rig = SimRig::new();
        let writes = rig.total_writes();

        // Exactly on the deadband: nothing moves
        rig.panel.set_analog(LEFT_X, 512 + 200);
        rig.panel.set_analog(RIGHT_Y, 512 - 200);
        let report = proc(&mut rig.state);
        assert_eq!(report.commanded_deg, [None; NUM_MOTORS]);
        assert_eq!(rig.total_writes(), writes);

        // One count further: exactly one step each
        rig.panel.set_analog(LEFT_X, 512 + 201);
        rig.panel.set_analog(RIGHT_Y, 512 - 201);
        let report = proc(&mut rig.state);
        assert_eq!(rig.total_writes(), writes + 2);
        assert_eq!(report.commanded_deg[MotorId::Height.index()], Some(115 - 5));
        assert_eq!(report.commanded_deg[MotorId::Claw.index()], Some(135 - 5));
        assert_eq!(report.commanded_deg[MotorId::Base.index()], None);
        assert_eq!(report.commanded_deg[MotorId::Reach.index()], None);
    }

    #[test]
    fn test_axis_polarity() {
        let mut rig = SimRig::new();

        rig.panel.set_analog(LEFT_X, 1023);
        rig.panel.set_analog(LEFT_Y, 1023);
        rig.panel.set_analog(RIGHT_X, 1023);
        rig.panel.set_analog(RIGHT_Y, 1023);
        proc(&mut rig.state);

        assert_eq!(rig.angle(MotorId::Height), 110);
        assert_eq!(rig.angle(MotorId::Base), 95);
        assert_eq!(rig.angle(MotorId::Reach), 110);
        assert_eq!(rig.angle(MotorId::Claw), 140);

        rig.panel.set_analog(LEFT_X, 0);
        rig.panel.set_analog(LEFT_Y, 0);
        rig.panel.set_analog(RIGHT_X, 0);
        rig.panel.set_analog(RIGHT_Y, 0);
        proc(&mut rig.state);
        proc(&mut rig.state);

        assert_eq!(rig.angle(MotorId::Height), 120);
        assert_eq!(rig.angle(MotorId::Base), 85);
        assert_eq!(rig.angle(MotorId::Reach), 120);
        assert_eq!(rig.angle(MotorId::Claw), 130);
    }

    #[test]
    fn test_stops_at_limits() {
        let mut rig = SimRig::new();

        rig.panel.set_analog(LEFT_Y, 1023);
        for _ in 0..100 {
            proc(&mut rig.state);
            assert!(rig.angle(MotorId::Base) <= 170);
        }
        assert_eq!(rig.angle(MotorId::Base), 170);

        rig.panel.set_analog(LEFT_Y, 0);
        for _ in 0..100 {
            proc(&mut rig.state);
        }
        assert_eq!(rig.angle(MotorId::Base), 10);
    }

    #[test]
    fn test_height_held_at_coupling_floor() {
        let mut rig = SimRig::new();

        // Reach rests at 115, so height can't go below 115 * -0.75 + 165 = 78.75
        rig.panel.set_analog(LEFT_X, 1023);
        for _ in 0..20 {
            proc(&mut rig.state);
        }
        assert_eq!(rig.angle(MotorId::Reach), 115);
        assert_eq!(rig.angle(MotorId::Height), 78);
    }

    #[test]
    fn test_quick_open() {
        let mut rig = SimRig::new();
        assert_eq!(rig.angle(MotorId::Claw), 135);

        let report = proc(&mut rig.state);
        assert!(!report.quick_open);
        assert_eq!(rig.angle(MotorId::Claw), 135);

        rig.panel.set_digital(RIGHT_BUTTON, Level::Low);
        let start_ms = rig.delay.total_ms();
        let report = proc(&mut rig.state);
        assert!(report.quick_open);
        assert_eq!(rig.angle(MotorId::Claw), 100);

        // Four settled axis reads, the debounce, then the cycle delay
        assert_eq!(
            rig.delay.total_ms() - start_ms,
            4 * SETTLE_DELAY_MS as u64 + 20 + 20
        );
    }

    #[test]
    fn test_cycle_delay() {
        let mut rig = SimRig::new();

        let start_ms = rig.delay.total_ms();
        let start_cycles = rig.state.num_cycles;
        proc(&mut rig.state);

        assert_eq!(rig.delay.total_ms() - start_ms, 4 * SETTLE_DELAY_MS as u64 + 20);
        assert_eq!(rig.state.num_cycles, start_cycles + 1);
    }

    #[test]
    fn test_step_motor() {
        let mut rig = SimRig::new();

        assert_eq!(step_motor(&mut rig.state, MotorId::Base, 1), 95);
        assert_eq!(step_motor(&mut rig.state, MotorId::Base, -1), 90);
        assert_eq!(rig.angle(MotorId::Base), 90);
    }
}
