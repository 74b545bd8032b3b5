//! # Telecommand processor module
//!
//! The telecommand processor handles the single character commands typed by the operator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use embedded_hal::blocking::delay::DelayMs;
use log::{debug, info, trace};

// Internal
use crate::{
    arm_ctrl::{self, ArmCtrlError},
    config_store::ByteStore,
    data_store::ArmState,
    hal::{AnalogInput, DigitalInput},
    servo_ctrl::AngleActuator,
};
use comms_if::{eqpt::mech::MotorId, tc::Tc};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Returns the lines to be written back to the operator, which may be empty.
pub fn exec<R, S, B, D>(state: &mut ArmState<R, S, B, D>, tc: Tc) -> Result<Vec<String>, ArmCtrlError>
where
    R: AnalogInput + DigitalInput,
    S: AngleActuator,
    B: ByteStore,
    D: DelayMs<u32>,
{
    let motor = state.current_motor;

    match tc {
        Tc::Info => {
            let mut lines = vec![
                format!("left: {}", state.left.dump()),
                format!("right: {}", state.right.dump()),
            ];
            for (m, servo) in state.servos.iter() {
                lines.push(format!("{}: {}", m, servo));
            }
            Ok(lines)
        }
        Tc::Select(m) => {
            state.current_motor = m;
            debug!("Selected motor {}", m);
            Ok(vec![format!("motor: {}", m)])
        }
        Tc::ReportAngle => Ok(vec![format!("{}", state.servos[motor].read())]),
        Tc::NudgeUp => {
            let angle = arm_ctrl::step_motor(state, motor, 1);
            debug!("Nudged {} up to {}", motor, angle);
            Ok(vec![])
        }
        Tc::NudgeDown => {
            let angle = arm_ctrl::step_motor(state, motor, -1);
            debug!("Nudged {} down to {}", motor, angle);
            Ok(vec![])
        }
        Tc::SetMin => {
            let angle = state.servos[motor].read();
            state.servos[motor].set_min(angle);
            persist_limits(state, motor)?;
            Ok(vec![format!("min: {}", state.servos[motor].min())])
        }
        Tc::SetMax => {
            let angle = state.servos[motor].read();
            state.servos[motor].set_max(angle);
            persist_limits(state, motor)?;
            Ok(vec![format!("max: {}", state.servos[motor].max())])
        }
    }
}

/// Parse and execute a command character. Characters which aren't commands are ignored.
pub fn exec_char<R, S, B, D>(
    state: &mut ArmState<R, S, B, D>,
    c: char,
) -> Result<Vec<String>, ArmCtrlError>
where
    R: AnalogInput + DigitalInput,
    S: AngleActuator,
    B: ByteStore,
    D: DelayMs<u32>,
{
    match Tc::from_char(c) {
        Ok(tc) => exec(state, tc),
        Err(e) => {
            trace!("Ignoring input: {}", e);
            Ok(vec![])
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn persist_limits<R, S, B, D>(
    state: &mut ArmState<R, S, B, D>,
    motor: MotorId,
) -> Result<(), ArmCtrlError>
where
    S: AngleActuator,
    B: ByteStore,
{
    let servo = &state.servos[motor];
    info!("{} limits now [{}, {}]", motor, servo.min(), servo.max());

    if state.persist_limit_edits {
        state
            .config
            .store_limits(&state.servos)
            .map_err(ArmCtrlError::PersistFailed)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
