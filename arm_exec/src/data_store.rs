//! # Data Store
//!
//! Holds everything the control loop and the telecommand processor share: the two joysticks, the
//! servos, the limit store and the cycle bookkeeping.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::MotorId;
use embedded_hal::blocking::delay::DelayMs;
use log::{info, warn};
use std::fmt::Write;
use thiserror::Error;

use crate::{
    arm_ctrl,
    config_store::{ByteStore, ConfigStore, ConfigStoreError, LoadOutcome},
    hal::{AnalogInput, DigitalInput},
    joystick::Joystick,
    servo_ctrl::{AngleActuator, Servos},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global state of the arm.
pub struct ArmState<R, S, B, D> {
    // Inputs
    /// Left stick, drives height (X) and base (Y)
    pub left: Joystick<R, D>,

    /// Right stick, drives reach (X) and claw (Y). Its button snaps the claw open.
    pub right: Joystick<R, D>,

    // Outputs
    pub servos: Servos<S>,

    /// Persisted servo limits
    pub config: ConfigStore<B>,

    /// Delay used for the debounce and the end of cycle wait
    pub delay: D,

    // Operator selection
    /// Motor which the nudge and limit commands act on
    pub current_motor: MotorId,

    // Configuration
    pub params: arm_ctrl::Params,

    /// If true limit edits are written to the store as soon as they're made
    pub persist_limit_edits: bool,

    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArmInitError {
    #[error("Could not load the servo limits: {0}")]
    ConfigLoad(ConfigStoreError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<R, S, B, D> ArmState<R, S, B, D>
where
    R: AnalogInput + DigitalInput,
    S: AngleActuator,
    B: ByteStore,
    D: DelayMs<u32>,
{
    /// Create the state. Nothing is touched until [`ArmState::init`] is called.
    pub fn new(
        left: Joystick<R, D>,
        right: Joystick<R, D>,
        servos: Servos<S>,
        config: ConfigStore<B>,
        delay: D,
        params: arm_ctrl::Params,
    ) -> Self {
        Self {
            left,
            right,
            servos,
            config,
            delay,
            current_motor: MotorId::Base,
            params,
            persist_limit_edits: false,
            num_cycles: 0,
        }
    }

    /// Bring the arm up.
    ///
    /// The limits are loaded (seeding the store if it's blank) before the servos are attached, so
    /// that each servo rests at the middle of its real limits. The joysticks are then calibrated,
    /// they must not be touched until this returns.
    pub fn init(&mut self) -> Result<LoadOutcome, ArmInitError> {
        let outcome = self
            .config
            .load(&mut self.servos)
            .map_err(ArmInitError::ConfigLoad)?;

        let failed = self.servos.attach_all();
        if !failed.is_empty() {
            warn!("Servos failed to attach: {:?}", failed);
        }

        let mut diag = String::new();
        writeln!(diag, "left joystick").ok();
        self.left.calibrate(Some(&mut diag as &mut dyn Write));
        writeln!(diag, "right joystick").ok();
        self.right.calibrate(Some(&mut diag as &mut dyn Write));

        for line in diag.lines() {
            info!("{}", line);
        }

        info!("Arm initialised, current motor: {}", self.current_motor);

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// TEST RIG
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::test_rig::*;
    use super::*;
    use crate::{
        config_store::{MemByteStore, MAGIC},
        hal::ChannelId,
    };

    #[test]
    fn test_init_bootstraps_blank_store() {
        let mut rig = SimRig::uninit(MemByteStore::default());

        assert_eq!(rig.state.init().unwrap(), LoadOutcome::Bootstrapped);
        assert!(rig.state.config.is_initialised().unwrap());

        // Every servo attached and resting at the middle of its default limits
        for (motor, servo) in rig.state.servos.iter() {
            assert!(servo.is_attached());
            assert_eq!(rig.angle(motor), (servo.min() + servo.max()) / 2);
        }
        assert_eq!(rig.angle(MotorId::Base), 90);
        assert_eq!(rig.angle(MotorId::Reach), 115);
        assert_eq!(rig.angle(MotorId::Height), 115);
        assert_eq!(rig.angle(MotorId::Claw), 135);

        assert_eq!(rig.state.current_motor, MotorId::Base);
        assert_eq!(rig.state.num_cycles, 0);
    }

    #[test]
    fn test_init_uses_stored_limits() {
        let mut store = MemByteStore::default();
        let image = [MAGIC[0], MAGIC[1], 20, 30, 40, 50, 160, 150, 140, 130];
        for (i, b) in image.iter().enumerate() {
            store.write_byte(i, *b).unwrap();
        }

        let mut rig = SimRig::uninit(store);
        assert_eq!(rig.state.init().unwrap(), LoadOutcome::Loaded);

        assert_eq!(rig.angle(MotorId::Base), 90);
        assert_eq!(rig.angle(MotorId::Reach), 90);
        assert_eq!(rig.angle(MotorId::Height), 90);
        assert_eq!(rig.angle(MotorId::Claw), 90);
        assert_eq!(rig.sims[MotorId::Claw.index()].channel(), Some(ChannelId(12)));
    }

    #[test]
    fn test_init_calibrates_joysticks() {
        let mut rig = SimRig::uninit(MemByteStore::default());
        rig.panel.set_analog(LEFT_X, 480);
        rig.panel.set_analog(RIGHT_Y, 530);

        rig.state.init().unwrap();

        assert_eq!(rig.state.left.mean_x(), 480);
        assert_eq!(rig.state.left.mean_y(), 512);
        assert_eq!(rig.state.right.mean_x(), 512);
        assert_eq!(rig.state.right.mean_y(), 530);
    }
}
