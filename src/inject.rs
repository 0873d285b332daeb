//! Report injection.
//!
//! The [`Injector`] is the only thing that writes reports to the HID
//! endpoint.  It also owns every wait the engine performs, so that the USB
//! stack keeps getting serviced while a script is sleeping.

use embedded_hal::blocking::delay::DelayMs;
use usbd_human_interface_device::page::Keyboard;

use crate::config::Timing;
use crate::log::debug;
use crate::{KeyReport, Mods};

/// The USB device stack, as seen by the engine.
pub trait UsbStack {
    /// Is the HID interface able to take a report right now?  False until
    /// the host has configured the device, and while a report is still in
    /// flight.
    fn hid_ready(&self) -> bool;

    /// Hand a report to the HID endpoint.
    fn send_report(&mut self, report: &KeyReport);

    /// Give the device stack a chance to run.  This must be called
    /// regularly, or the host will consider the device dead.
    fn service(&mut self);
}

/// Counters for keystrokes that didn't make it to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Losses {
    /// Keystrokes dropped because the endpoint wasn't ready.
    pub dropped: usize,
    /// Characters that have no key.
    pub unmapped: usize,
}

pub struct Injector<'a, U, D> {
    usb: &'a mut U,
    delay: &'a mut D,
    timing: Timing,
    pub losses: Losses,
}

impl<'a, U: UsbStack, D: DelayMs<u32>> Injector<'a, U, D> {
    pub fn new(usb: &'a mut U, delay: &'a mut D, timing: Timing) -> Self {
        Injector {
            usb,
            delay,
            timing,
            losses: Losses::default(),
        }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Tap a single key: press, settle, release, settle.
    ///
    /// If the endpoint isn't ready, nothing is sent and the keystroke is
    /// lost.  Returns whether the key was sent.
    pub fn send_key(&mut self, mods: Mods, key: Keyboard) -> bool {
        if !self.usb.hid_ready() {
            debug!("HID not ready, dropping key {}", key as u8);
            self.losses.dropped += 1;
            return false;
        }

        self.usb.send_report(&KeyReport::press(mods, key));
        self.wait(self.timing.settle_ms);
        self.usb.send_report(&KeyReport::release());
        self.wait(self.timing.settle_ms);
        true
    }

    /// Sleep, servicing the USB stack between each slice.
    pub fn wait(&mut self, ms: u32) {
        let slice = self.timing.service_slice_ms.max(1);
        let mut left = ms;
        while left > 0 {
            let step = left.min(slice);
            self.delay.delay_ms(step);
            self.usb.service();
            left -= step;
        }
    }

    pub fn service(&mut self) {
        self.usb.service();
    }
}
