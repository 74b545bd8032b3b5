//! Byte addressed non-volatile storage

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use std::{
    fs::{self, File, OpenOptions},
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of the storage, matching a 1 KiB EEPROM.
pub const STORE_SIZE: usize = 1024;

/// Value of every byte in erased storage.
pub const ERASED_BYTE: u8 = 0xFF;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Byte addressed storage which keeps its contents across power cycles.
pub trait ByteStore {
    /// Read the byte at `addr`.
    fn read_byte(&mut self, addr: usize) -> Result<u8, StoreError>;

    /// Write `value` to `addr`.
    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), StoreError>;

    /// Number of addressable bytes.
    fn len(&self) -> usize;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Storage held in memory, lost when the process exits.
#[derive(Debug, Clone)]
pub struct MemByteStore {
    bytes: Vec<u8>,
}

/// Storage backed by an image file, written through on every byte write.
#[derive(Debug)]
pub struct FileByteStore {
    path: PathBuf,
    file: File,
    image: Vec<u8>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Address {addr} is outside the store (size {len})")]
    OutOfRange { addr: usize, len: usize },

    #[error("Store image I/O error: {0}")]
    Io(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MemByteStore {
    /// Create erased storage of the given size.
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![ERASED_BYTE; len],
        }
    }

    /// The raw contents of the store.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MemByteStore {
    fn default() -> Self {
        Self::new(STORE_SIZE)
    }
}

impl ByteStore for MemByteStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8, StoreError> {
        match self.bytes.get(addr) {
            Some(b) => Ok(*b),
            None => Err(StoreError::OutOfRange {
                addr,
                len: self.bytes.len(),
            }),
        }
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), StoreError> {
        let len = self.bytes.len();
        match self.bytes.get_mut(addr) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(StoreError::OutOfRange { addr, len }),
        }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl FileByteStore {
    /// Open the image at `path`, creating an erased image of `len` bytes if there isn't one.
    ///
    /// An existing image that is shorter than `len` is padded with erased bytes, a longer one is
    /// truncated.
    pub fn open<P: AsRef<Path>>(path: P, len: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        let mut image = match fs::read(&path) {
            Ok(bytes) => {
                debug!("Loaded {} byte store image from {:?}", bytes.len(), path);
                bytes
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store image at {:?}, creating an erased one", path);
                Vec::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        image.resize(len, ERASED_BYTE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(StoreError::Io)?;

        file.set_len(len as u64).map_err(StoreError::Io)?;
        file.seek(SeekFrom::Start(0)).map_err(StoreError::Io)?;
        file.write_all(&image).map_err(StoreError::Io)?;
        file.sync_data().map_err(StoreError::Io)?;

        Ok(Self { path, file, image })
    }

    /// Path of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileByteStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8, StoreError> {
        match self.image.get(addr) {
            Some(b) => Ok(*b),
            None => Err(StoreError::OutOfRange {
                addr,
                len: self.image.len(),
            }),
        }
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), StoreError> {
        if addr >= self.image.len() {
            return Err(StoreError::OutOfRange {
                addr,
                len: self.image.len(),
            });
        }

        self.file
            .seek(SeekFrom::Start(addr as u64))
            .map_err(StoreError::Io)?;
        self.file.write_all(&[value]).map_err(StoreError::Io)?;
        self.file.sync_data().map_err(StoreError::Io)?;

        self.image[addr] = value;

        Ok(())
    }

    fn len(&self) -> usize {
        self.image.len()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
