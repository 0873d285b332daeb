//! Ducky keyboard
//!
//! A keystroke script engine for a device that presents itself as a USB
//! keyboard. Scripts are read from removable storage, one command per line,
//! and replayed to the host as boot-keyboard HID reports.
//!
//! The engine is hardware independent. The USB device stack, the storage
//! driver, the status LED and the sleep primitive are all supplied by the
//! caller through the traits in [`inject`], [`storage`], [`feedback`], and
//! `embedded_hal`'s `DelayMs`.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
// #![deny(missing_docs)]

#[cfg(not(any(feature = "std", test)))]
extern crate core as std;

extern crate alloc;

use bitflags::bitflags;

pub use usbd_human_interface_device::page::Keyboard;

pub mod command;
pub mod config;
pub mod engine;
pub mod feedback;
pub mod inject;
pub mod interp;
pub mod keymap;
pub mod report;
pub mod script;
pub mod storage;
pub mod trigger;

#[cfg(feature = "std")]
pub mod host;

pub use command::Command;
pub use config::{Config, Timing};
pub use engine::{Control, Engine, ExecState, Phase, RunOutcome, RunSummary, TriggerAction};
pub use feedback::{Feedback, Signal};
pub use inject::UsbStack;
pub use report::KeyReport;
pub use storage::{ScriptStorage, StorageError};

#[cfg(not(any(feature = "defmt", feature = "log")))]
compile_error!("One of the features \"defmt\" or \"log\" must be enabled");

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        mod log {
            pub use defmt::{debug, info, warn};
        }
    } else {
        mod log {
            pub use log::{debug, info, warn};
        }
    }
}

bitflags! {
    /// A modifier map, laid out exactly as byte 0 of a boot keyboard
    /// report.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
    pub struct Mods: u8 {
        const LEFT_CTRL = 0b0000_0001;
        const LEFT_SHIFT = 0b0000_0010;
        const LEFT_ALT = 0b0000_0100;
        const LEFT_GUI = 0b0000_1000;
        const RIGHT_CTRL = 0b0001_0000;
        const RIGHT_SHIFT = 0b0010_0000;
        const RIGHT_ALT = 0b0100_0000;
        const RIGHT_GUI = 0b1000_0000;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mods {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Mods({=u8:#04x})", self.bits())
    }
}
