//! Script storage.
//!
//! The engine reads its script through [`ScriptStorage`], which hides the
//! filesystem and the card driver.  A script is loaded completely before it
//! starts running, and the storage handles are released as soon as it has
//! been read.

use alloc::vec::Vec;
use core::fmt;

use crate::feedback::Signal;
use crate::log::{debug, warn};
use crate::script::Script;

pub trait ScriptStorage {
    /// A mounted volume.
    type Volume;
    /// An open file.
    type File;
    type Error: fmt::Debug;

    fn mount(&mut self) -> Result<Self::Volume, Self::Error>;

    fn open(&mut self, volume: &mut Self::Volume, path: &str) -> Result<Self::File, Self::Error>;

    /// Read the next line of the file, including its line ending if it has
    /// one.  Returns `Ok(None)` at end of file.
    fn read_line(&mut self, file: &mut Self::File) -> Result<Option<Vec<u8>>, Self::Error>;

    fn close(&mut self, volume: &mut Self::Volume, file: Self::File);

    fn unmount(&mut self, volume: Self::Volume);
}

/// A failure to get a script off of storage.  Each of these ends the run.
#[derive(Debug, PartialEq, Eq)]
pub enum StorageError<E> {
    Mount(E),
    Open(E),
    Read(E),
}

impl<E> StorageError<E> {
    /// The diagnostic signal that reports this failure.
    pub fn signal(&self) -> Signal {
        match self {
            StorageError::Mount(_) => Signal::MountFailed,
            StorageError::Open(_) => Signal::OpenFailed,
            StorageError::Read(_) => Signal::ReadFailed,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Mount(_) => "mount",
            StorageError::Open(_) => "open",
            StorageError::Read(_) => "read",
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            StorageError::Mount(e) | StorageError::Open(e) | StorageError::Read(e) => e,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for StorageError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage {} failed: {:?}", self.kind(), self.inner())
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for StorageError<E> {}

/// Read the whole script at `path`.  The file is closed and the volume
/// unmounted on every path out of here.
pub fn load<S: ScriptStorage>(storage: &mut S, path: &str) -> Result<Script, StorageError<S::Error>> {
    let mut volume = storage.mount().map_err(StorageError::Mount)?;

    let mut file = match storage.open(&mut volume, path) {
        Ok(file) => file,
        Err(e) => {
            storage.unmount(volume);
            return Err(StorageError::Open(e));
        }
    };

    let mut lines = Vec::new();
    let result = loop {
        match storage.read_line(&mut file) {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break Ok(()),
            Err(e) => break Err(StorageError::Read(e)),
        }
    };

    storage.close(&mut volume, file);
    storage.unmount(volume);

    match result {
        Ok(()) => {
            debug!("Loaded {} lines from {}", lines.len(), path);
            Ok(Script::from_lines(lines))
        }
        Err(e) => {
            warn!("Read of {} failed after {} lines", path, lines.len());
            Err(e)
        }
    }
}
