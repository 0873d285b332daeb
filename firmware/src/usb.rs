// Usb HID management.

use arraydeque::ArrayDeque;
use defmt::{info, warn};
use ducky_keyboard::{KeyReport, Mods, UsbStack};
use frunk::{HCons, HNil};
use usb_device::{
    class_prelude::{UsbBus, UsbBusAllocator},
    prelude::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid},
};
use usbd_human_interface_device::{
    device::keyboard::{NKROBootKeyboard, NKROBootKeyboardConfig},
    page::Keyboard,
    usb_class::{UsbHidClass, UsbHidClassBuilder},
    UsbHidError,
};

// Type of the device list, which is internal to usbd_human_interface_device.
type InterfaceList<'a, Bus> = HCons<NKROBootKeyboard<'a, Bus>, HNil>;

pub struct UsbHandler<'a, Bus: UsbBus> {
    dev: UsbDevice<'a, Bus>,
    hid: UsbHidClass<'a, Bus, InterfaceList<'a, Bus>>,
    state: Option<UsbDeviceState>,
    /// Reports the endpoint wasn't able to take yet.
    reports: ArrayDeque<KeyReport, 8>,
}

impl<'a, Bus: UsbBus> UsbHandler<'a, Bus> {
    pub fn new(usb_bus: &'a UsbBusAllocator<Bus>) -> Self {
        let keyboard = UsbHidClassBuilder::new()
            .add_device(NKROBootKeyboardConfig::default())
            .build(usb_bus);
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x1209, 0x0001))
            .manufacturer("ducky-keyboard")
            .product("Ducky")
            .serial_number("development")
            .device_class(0)
            .max_power(500)
            .build();
        UsbHandler {
            hid: keyboard,
            dev: usb_dev,
            state: None,
            reports: ArrayDeque::new(),
        }
    }

    pub fn state(&self) -> UsbDeviceState {
        self.dev.state()
    }

    /// Perform a 1khz tick operation.
    pub fn tick(&mut self) {
        if let Err(UsbHidError::UsbError(_)) = self.hid.device().tick() {
            info!("tick error");
        }

        self.flush();
    }

    /// Send as many queued reports as the endpoint will take.
    fn flush(&mut self) {
        while let Some(report) = self.reports.front().copied() {
            if !self.write(&report) {
                break;
            }
            let _ = self.reports.pop_front();
        }
    }

    /// Perform a periodic poll.  Ideally, this would be interrupt driven, but
    /// calling sufficiently fast should also work.
    pub fn poll(&mut self) {
        if self.dev.poll(&mut [&mut self.hid]) {
            // Host LED state isn't used, but has to be drained.
            let _ = self.hid.device().read_report();
        }

        // Check for state changes.
        let new_state = self.dev.state();
        if self.state != Some(new_state) {
            match new_state {
                UsbDeviceState::Addressed => info!("State: Addressed"),
                UsbDeviceState::Configured => info!("State: Configured"),
                UsbDeviceState::Default => info!("State: Default"),
                UsbDeviceState::Suspend => info!("State: Suspend"),
            }
            if new_state != UsbDeviceState::Configured {
                self.reports.clear();
            }
            self.state = Some(new_state);
        }
    }

    /// Try to hand a report to the HID class.  Returns false if it should be
    /// tried again later.
    fn write(&mut self, report: &KeyReport) -> bool {
        match self.hid.device().write_report(keys_of(report)) {
            Ok(()) => true,
            Err(UsbHidError::WouldBlock) => false,
            // The same keys as last time, so nothing to send.
            Err(UsbHidError::Duplicate) => true,
            Err(UsbHidError::UsbError(_)) => {
                warn!("USB error, report lost");
                true
            }
            Err(UsbHidError::SerializationError) => {
                warn!("SerializationError");
                true
            }
        }
    }
}

impl<'a, Bus: UsbBus> UsbStack for UsbHandler<'a, Bus> {
    fn hid_ready(&self) -> bool {
        self.dev.state() == UsbDeviceState::Configured && self.reports.is_empty()
    }

    /// Queue a report.  A release always follows a press, so the queue is
    /// only full if the host has stopped reading.
    fn send_report(&mut self, report: &KeyReport) {
        if self.reports.push_back(*report).is_err() {
            warn!("Report queue full");
        }
        self.flush();
    }

    fn service(&mut self) {
        self.poll();
    }
}

/// The HID class takes the keys that are down rather than a raw report, with
/// the modifiers as keys of their own.
fn keys_of(report: &KeyReport) -> impl Iterator<Item = Keyboard> + '_ {
    let held = report.mods;
    let mods = (0..8u8)
        .filter(move |bit| held.contains(Mods::from_bits_retain(1 << bit)))
        .map(|bit| Keyboard::from(Keyboard::LeftControl as u8 + bit));
    let keys = report
        .keycodes
        .iter()
        .filter(|&&k| k != 0)
        .map(|&k| Keyboard::from(k));
    mods.chain(keys)
}
