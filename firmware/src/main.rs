//! Ducky keystroke injector
//!
//! Presents itself to the host as a USB keyboard.  Pressing the button types
//! out `payload.txt` from the SD card, and pressing it again stops the run.
#![no_std]
#![no_main]

extern crate alloc;

use core::cell::Cell;

use bsp::{entry, hal::Timer, XOSC_CRYSTAL_FREQ};
use defmt::*;
use defmt_rtt as _;
use ducky_keyboard::feedback::{Feedback, Signal};
use ducky_keyboard::trigger::Trigger;
use ducky_keyboard::{Config, Control, Engine, KeyReport, RunOutcome, TriggerAction, UsbStack};
use embedded_hal::digital::v2::InputPin;
use fugit::RateExtU32;
use panic_probe as _;
use usb_device::class_prelude::{UsbBus, UsbBusAllocator};
use ws2812_pio::Ws2812Direct;
use smart_leds::{SmartLedsWrite, RGB8};

use embedded_alloc::Heap;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Provide an alias for our BSP so we can switch targets quickly.
use sparkfun_pro_micro_rp2040 as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    gpio::FunctionSpi,
    pac,
    pio::PIOExt,
    sio::Sio,
    watchdog::Watchdog,
};

use bsp::hal as hal;

mod leds;
mod sdcard;
mod usb;

use leds::LedManager;
use sdcard::{NoClock, SdStorage};
use usb::UsbHandler;

/// Hands signals from the engine over to the board, which shows them on its
/// next tick.
struct SignalSlot<'a>(&'a Cell<Option<Signal>>);

impl<'a> Feedback for SignalSlot<'a> {
    fn signal(&mut self, signal: Signal) {
        info!("Signal: {}", signal);
        self.0.set(Some(signal));
    }
}

/// Everything that has to keep running while a script is being typed: the
/// USB device, the button, and the status LED.
struct Board<'a, Bus: UsbBus, B: InputPin, L: SmartLedsWrite<Color = RGB8>> {
    usb: UsbHandler<'a, Bus>,
    button: B,
    trigger: Trigger,
    control: &'a Control,
    leds: LedManager<'a, L>,
    signals: &'a Cell<Option<Signal>>,
    timer: Timer,
    next_1ms: u64,
    /// The button asked for a run while idle.
    start: bool,
}

impl<'a, Bus, B, L> Board<'a, Bus, B, L>
where
    Bus: UsbBus,
    B: InputPin,
    L: SmartLedsWrite<Color = RGB8>,
{
    /// Take a pending start request.
    fn take_start(&mut self) -> bool {
        core::mem::replace(&mut self.start, false)
    }

    fn tick(&mut self, now_ms: u64) {
        self.usb.tick();
        if let Some(signal) = self.signals.take() {
            self.leds.signal(signal);
        }
        self.leds.set_phase(self.control.phase());
        self.leds.tick();

        // The button pulls the input low.
        let pressed = self.button.is_low().unwrap_or(false);
        if self.trigger.poll(pressed, now_ms) {
            match self.control.on_press(self.usb.state()) {
                TriggerAction::Start => self.start = true,
                TriggerAction::Stop => info!("Stop requested"),
                TriggerAction::NotConnected => warn!("Not connected to a host"),
                TriggerAction::Ignore => (),
            }
        }
    }
}

impl<'a, Bus, B, L> UsbStack for Board<'a, Bus, B, L>
where
    Bus: UsbBus,
    B: InputPin,
    L: SmartLedsWrite<Color = RGB8>,
{
    fn hid_ready(&self) -> bool {
        self.usb.hid_ready()
    }

    fn send_report(&mut self, report: &KeyReport) {
        self.usb.send_report(report);
    }

    fn service(&mut self) {
        self.usb.poll();

        let now = self.timer.get_counter().ticks();
        if now >= self.next_1ms {
            self.tick(now / 1_000);
            self.next_1ms = now + 1_000;
        }
    }
}

#[entry]
fn main() -> ! {
    {
        use core::mem::MaybeUninit;
        // Room for the script, and then some.
        const HEAP_SIZE: usize = 32 * 1024;
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        unsafe { HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE) }
    }

    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    info!("Program start");
    // External high-speed crystal on the pico board is 12Mhz
    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let mut ws = Ws2812Direct::new(
        pins.led.into_function(),
        &mut pio,
        sm0,
        clocks.peripheral_clock.freq(),
    );

    // SD card on SPI0.  Cards have to be brought up at 400kHz.
    let sclk = pins.gpio2.into_function::<FunctionSpi>();
    let mosi = pins.gpio3.into_function::<FunctionSpi>();
    let miso = pins.gpio4.into_function::<FunctionSpi>();
    let cs = pins.gpio5.into_push_pull_output();
    let spi = hal::spi::Spi::<_, _, _, 8>::new(pac.SPI0, (mosi, miso, sclk)).init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        400.kHz(),
        embedded_hal::spi::MODE_0,
    );
    let card = embedded_sdmmc::SdCard::new(spi, cs, timer);
    let mut storage = SdStorage::new(embedded_sdmmc::VolumeManager::new(card, NoClock));

    let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    let control = Control::new();
    let signals = Cell::new(None);
    let mut board = Board {
        usb: UsbHandler::new(&usb_bus),
        button: pins.gpio6.into_pull_up_input(),
        trigger: Trigger::default(),
        control: &control,
        leds: LedManager::new(&mut ws),
        signals: &signals,
        timer,
        next_1ms: 0,
        start: false,
    };
    let mut slot = SignalSlot(&signals);
    let mut engine = Engine::new(Config::default(), &control, timer);

    info!("Ready, waiting for the button");
    loop {
        board.service();

        if board.take_start() {
            info!("Starting {}", engine.config().script_path);
            match engine.run(&mut storage, &mut board, &mut slot) {
                Ok(summary) => {
                    let outcome = match summary.outcome {
                        RunOutcome::Completed => "completed",
                        RunOutcome::Cancelled => "cancelled",
                    };
                    info!(
                        "Run {}: {} lines, {} unknown, {} dropped, {} unmapped",
                        outcome, summary.lines, summary.unknown, summary.dropped, summary.unmapped
                    );
                }
                Err(e) => warn!("Run failed: {}: {}", e.kind(), Debug2Format(e.inner())),
            }
        }
    }
}
