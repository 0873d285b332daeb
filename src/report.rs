//! Boot keyboard reports
//!
//! The standard 8-byte HID boot keyboard frame:
//!
//! - Byte 0: modifier bits (see [`Mods`])
//! - Byte 1: reserved
//! - Bytes 2-7: up to six keycodes
//!
//! The engine only ever types one key at a time, so only the first keycode
//! slot is used.

use usbd_human_interface_device::page::Keyboard;

use crate::Mods;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KeyReport {
    pub mods: Mods,
    pub keycodes: [u8; 6],
}

impl KeyReport {
    /// A report holding down a single key with the given modifiers.  Passing
    /// `Keyboard::NoEventIndicated` gives a modifier only press.
    pub fn press(mods: Mods, key: Keyboard) -> KeyReport {
        let mut keycodes = [0; 6];
        keycodes[0] = key as u8;
        KeyReport { mods, keycodes }
    }

    /// The all keys released report.
    pub fn release() -> KeyReport {
        KeyReport::default()
    }

    /// The wire encoding of this report.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[0] = self.mods.bits();
        buf[2..].copy_from_slice(&self.keycodes);
        buf
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyReport {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "KeyReport({:02x})", self.to_bytes())
    }
}
