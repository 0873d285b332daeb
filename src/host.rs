//! Host side implementations of the engine's collaborators.
//!
//! These let a script be run on a desktop machine: the script comes from a
//! directory on the local filesystem, and the reports are recorded rather
//! than sent anywhere.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use log::info;

use crate::feedback::{Feedback, Signal};
use crate::inject::UsbStack;
use crate::report::KeyReport;
use crate::storage::ScriptStorage;

/// Storage backed by a directory.  Mounting checks that the directory
/// exists.
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> DirStorage {
        DirStorage { root: root.into() }
    }
}

impl ScriptStorage for DirStorage {
    type Volume = PathBuf;
    type File = BufReader<File>;
    type Error = io::Error;

    fn mount(&mut self) -> io::Result<PathBuf> {
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }
        Ok(self.root.clone())
    }

    fn open(&mut self, volume: &mut PathBuf, path: &str) -> io::Result<BufReader<File>> {
        Ok(BufReader::new(File::open(volume.join(path))?))
    }

    fn read_line(&mut self, file: &mut BufReader<File>) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        match file.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    fn close(&mut self, _volume: &mut PathBuf, _file: BufReader<File>) {}

    fn unmount(&mut self, _volume: PathBuf) {}
}

/// Milliseconds since the start of a run, shared between the delay and the
/// recorder so that reports can be timestamped.
pub type Clock = Rc<Cell<u64>>;

/// A delay that advances a [`Clock`], and optionally really sleeps.
#[derive(Debug, Default)]
pub struct HostDelay {
    realtime: bool,
    clock: Clock,
}

impl HostDelay {
    pub fn new(realtime: bool, clock: Clock) -> HostDelay {
        HostDelay { realtime, clock }
    }
}

impl DelayMs<u32> for HostDelay {
    fn delay_ms(&mut self, ms: u32) {
        if self.realtime {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }
        self.clock.set(self.clock.get() + ms as u64);
    }
}

/// A report, and how far into the run it was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sent {
    pub at_ms: u64,
    pub report: KeyReport,
}

/// A USB stack that is always configured, and records what it is sent.
#[derive(Debug, Default)]
pub struct RecordingUsb {
    clock: Clock,
    pub reports: Vec<Sent>,
    pub services: u64,
    /// Print each report as it is sent.
    pub echo: bool,
}

impl RecordingUsb {
    pub fn new(clock: Clock, echo: bool) -> RecordingUsb {
        RecordingUsb {
            clock,
            reports: Vec::new(),
            services: 0,
            echo,
        }
    }
}

impl UsbStack for RecordingUsb {
    fn hid_ready(&self) -> bool {
        true
    }

    fn send_report(&mut self, report: &KeyReport) {
        let sent = Sent { at_ms: self.clock.get(), report: *report };
        if self.echo {
            println!("{:>8} ms  {}", sent.at_ms, format_report(report));
        }
        self.reports.push(sent);
    }

    fn service(&mut self) {
        self.services += 1;
    }
}

/// Render a report as its eight bytes in hex.
pub fn format_report(report: &KeyReport) -> String {
    report
        .to_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Feedback shown as log messages.
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn signal(&mut self, signal: Signal) {
        let pattern = signal.pattern();
        info!(
            "signal {:?}: {} blinks of {} ms",
            signal, pattern.count, pattern.period_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mods;
    use usbd_human_interface_device::page::Keyboard;

    #[test]
    fn report_hex() {
        let r = KeyReport::press(Mods::LEFT_SHIFT, Keyboard::H);
        assert_eq!(format_report(&r), "02 00 0b 00 00 00 00 00");
    }

    #[test]
    fn missing_directory_fails_mount() {
        let mut storage = DirStorage::new("/nonexistent/ducky/dir");
        assert!(storage.mount().is_err());
    }
}
