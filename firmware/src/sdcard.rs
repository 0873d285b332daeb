//! Script storage on a FAT formatted SD card.

use alloc::vec::Vec;

use ducky_keyboard::ScriptStorage;
use embedded_sdmmc::{
    BlockDevice, Directory, Error, File, Mode, TimeSource, Timestamp, Volume, VolumeIdx,
    VolumeManager,
};

/// The device has no clock, and never writes, so every file time is the same.
pub struct NoClock;

impl TimeSource for NoClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// An open script, and what has been read of it but not yet returned.
pub struct ScriptFile {
    dir: Directory,
    file: File,
    buf: [u8; 64],
    pos: usize,
    len: usize,
}

pub struct SdStorage<D: BlockDevice, T: TimeSource> {
    volumes: VolumeManager<D, T>,
}

impl<D: BlockDevice, T: TimeSource> SdStorage<D, T> {
    pub fn new(volumes: VolumeManager<D, T>) -> Self {
        SdStorage { volumes }
    }

    fn fill(&mut self, file: &mut ScriptFile) -> Result<(), Error<D::Error>> {
        file.len = self.volumes.read(file.file, &mut file.buf)?;
        file.pos = 0;
        Ok(())
    }
}

impl<D: BlockDevice, T: TimeSource> ScriptStorage for SdStorage<D, T> {
    type Volume = Volume;
    type File = ScriptFile;
    type Error = Error<D::Error>;

    fn mount(&mut self) -> Result<Volume, Self::Error> {
        self.volumes.open_volume(VolumeIdx(0))
    }

    fn open(&mut self, volume: &mut Volume, path: &str) -> Result<ScriptFile, Self::Error> {
        let dir = self.volumes.open_root_dir(*volume)?;
        match self.volumes.open_file_in_dir(dir, path, Mode::ReadOnly) {
            Ok(file) => Ok(ScriptFile {
                dir,
                file,
                buf: [0; 64],
                pos: 0,
                len: 0,
            }),
            Err(e) => {
                let _ = self.volumes.close_dir(dir);
                Err(e)
            }
        }
    }

    fn read_line(&mut self, file: &mut ScriptFile) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut line = Vec::new();
        loop {
            if file.pos == file.len {
                self.fill(file)?;
                if file.len == 0 {
                    // End of file.
                    return Ok(if line.is_empty() { None } else { Some(line) });
                }
            }
            let byte = file.buf[file.pos];
            file.pos += 1;
            line.push(byte);
            if byte == b'\n' {
                return Ok(Some(line));
            }
        }
    }

    fn close(&mut self, _volume: &mut Volume, file: ScriptFile) {
        let _ = self.volumes.close_file(file.file);
        let _ = self.volumes.close_dir(file.dir);
    }

    fn unmount(&mut self, volume: Volume) {
        let _ = self.volumes.close_volume(volume);
    }
}
