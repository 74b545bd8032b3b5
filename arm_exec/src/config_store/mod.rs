//! # Config Store
//!
//! Persists the servo travel limits in non-volatile storage. The layout, starting at a fixed
//! offset, is:
//!
//! | Byte | Content |
//! |------|---------|
//! | 0, 1 | Magic marker `0x83, 0xED` |
//! | 2-5  | Minimum limit of base, reach, height, claw |
//! | 6-9  | Maximum limit of base, reach, height, claw |
//!
//! Storage without the marker is blank (or was never finished being written) and is seeded with
//! the default limits the first time it's loaded.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod byte_store;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{MotorId, NUM_MOTORS};
use log::{debug, info, warn};
use thiserror::Error;

use crate::servo_ctrl::{AngleActuator, Servos};
pub use byte_store::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Marker identifying initialised storage.
pub const MAGIC: [u8; 2] = [0x83, 0xED];

/// Default minimum limits, in [`MotorId`] order.
pub const DEFAULT_MIN_DEG: [u8; NUM_MOTORS] = [10, 60, 60, 100];

/// Default maximum limits, in [`MotorId`] order.
pub const DEFAULT_MAX_DEG: [u8; NUM_MOTORS] = [170, 170, 170, 170];

/// Number of bytes the layout occupies.
pub const LAYOUT_LEN: usize = MAGIC.len() + 2 * NUM_MOTORS;

const MIN_OFFSET: usize = MAGIC.len();
const MAX_OFFSET: usize = MIN_OFFSET + NUM_MOTORS;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Reads and writes the servo limits held in a [`ByteStore`].
pub struct ConfigStore<B> {
    store: B,
    offset: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of loading the limits.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum LoadOutcome {
    /// The store held valid limits which were loaded.
    Loaded,

    /// The store was blank, so it was seeded with the defaults before loading.
    Bootstrapped,
}

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error(
        "The config layout at offset {offset} doesn't fit in the store (size {store_len})"
    )]
    LayoutOutOfRange { offset: usize, store_len: usize },

    #[error("Store access failed: {0}")]
    Store(StoreError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl From<StoreError> for ConfigStoreError {
    fn from(e: StoreError) -> Self {
        ConfigStoreError::Store(e)
    }
}

impl<B: ByteStore> ConfigStore<B> {
    /// Create a config store whose layout starts at `offset` in `store`.
    pub fn new(store: B, offset: usize) -> Result<Self, ConfigStoreError> {
        if offset + LAYOUT_LEN > store.len() {
            return Err(ConfigStoreError::LayoutOutOfRange {
                offset,
                store_len: store.len(),
            });
        }

        Ok(Self { store, offset })
    }

    /// True if the magic marker is present.
    pub fn is_initialised(&mut self) -> Result<bool, ConfigStoreError> {
        let magic = [
            self.store.read_byte(self.offset)?,
            self.store.read_byte(self.offset + 1)?,
        ];
        Ok(magic == MAGIC)
    }

    /// Load the limits into the servos.
    ///
    /// If the store is blank the defaults are written first, the limits are then always read
    /// back from the store.
    pub fn load<S: AngleActuator>(
        &mut self,
        servos: &mut Servos<S>,
    ) -> Result<LoadOutcome, ConfigStoreError> {
        let outcome = if self.is_initialised()? {
            LoadOutcome::Loaded
        } else {
            warn!("Config store is not initialised, writing default limits");
            self.write_limits(&DEFAULT_MIN_DEG, &DEFAULT_MAX_DEG)?;
            LoadOutcome::Bootstrapped
        };

        for motor in MotorId::ALL.iter() {
            let min = self.store.read_byte(self.offset + MIN_OFFSET + motor.index())?;
            let max = self.store.read_byte(self.offset + MAX_OFFSET + motor.index())?;

            servos[*motor].set_min(min as i32);
            servos[*motor].set_max(max as i32);

            debug!(
                "Loaded {} limits [{}, {}]",
                motor,
                servos[*motor].min(),
                servos[*motor].max()
            );
        }

        info!("Servo limits loaded ({:?})", outcome);

        Ok(outcome)
    }

    /// Write the servos' current limits to the store.
    pub fn store_limits<S: AngleActuator>(
        &mut self,
        servos: &Servos<S>,
    ) -> Result<(), ConfigStoreError> {
        let mut min = [0u8; NUM_MOTORS];
        let mut max = [0u8; NUM_MOTORS];

        // Limits are always within 0..=180 so they fit in a byte
        for (motor, servo) in servos.iter() {
            min[motor.index()] = servo.min() as u8;
            max[motor.index()] = servo.max() as u8;
        }

        self.write_limits(&min, &max)?;
        debug!("Servo limits stored: min {:?}, max {:?}", min, max);

        Ok(())
    }

    /// The underlying store.
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Write the limit bytes followed by the marker.
    ///
    /// An interrupted write leaves the marker missing, so the store reads as blank.
    fn write_limits(
        &mut self,
        min: &[u8; NUM_MOTORS],
        max: &[u8; NUM_MOTORS],
    ) -> Result<(), ConfigStoreError> {
        for i in 0..NUM_MOTORS {
            self.store.write_byte(self.offset + MIN_OFFSET + i, min[i])?;
            self.store.write_byte(self.offset + MAX_OFFSET + i, max[i])?;
        }

        for (i, b) in MAGIC.iter().enumerate() {
            self.store.write_byte(self.offset + i, *b)?;
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
