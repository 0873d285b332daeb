//! Control of the status LED.
//!
//! A background pattern shows whether a script is running.  Signals from the
//! engine are played over the top of it as a run of blinks.

use core::iter::once;

use ducky_keyboard::feedback::Pattern;
use ducky_keyboard::{Phase, Signal};
use smart_leds::{SmartLedsWrite, RGB8};

const OFF: RGB8 = RGB8::new(0, 0, 0);

struct Step {
    color: RGB8,
    count: usize,
}

/// Slow heartbeat while waiting for the button.
static IDLE_INDICATOR: &[Step] = &[
    Step { color: RGB8::new(0, 6, 0), count: 100 },
    Step { color: OFF,                count: 1900 },
];

static RUNNING_INDICATOR: &[Step] = &[
    Step { color: RGB8::new(0, 0, 12), count: 1000 },
];

static STOPPING_INDICATOR: &[Step] = &[
    Step { color: RGB8::new(12, 6, 0), count: 1000 },
];

/// A signal being played.
struct Blink {
    color: RGB8,
    /// On and off periods left, including the current one.
    halves: u32,
    period: usize,
    count: usize,
}

pub struct LedManager<'a, L: SmartLedsWrite<Color = RGB8>> {
    leds: &'a mut L,

    steps: &'static [Step],
    count: usize,
    phase: usize,

    blink: Option<Blink>,
}

impl<'a, L: SmartLedsWrite<Color = RGB8>> LedManager<'a, L> {
    pub fn new(leds: &'a mut L) -> Self {
        LedManager {
            leds,
            steps: IDLE_INDICATOR,
            count: 0,
            phase: 0,
            blink: None,
        }
    }

    /// Follow the engine's phase with the background pattern.
    pub fn set_phase(&mut self, phase: Phase) {
        let steps = match phase {
            Phase::Idle => IDLE_INDICATOR,
            Phase::Running => RUNNING_INDICATOR,
            Phase::Stopping => STOPPING_INDICATOR,
        };
        if !core::ptr::eq(steps, self.steps) {
            self.steps = steps;
            self.count = 0;
            self.phase = 0;
        }
    }

    /// Start playing a signal, replacing any that is still going.
    pub fn signal(&mut self, signal: Signal) {
        let Pattern { count, period_ms } = signal.pattern();
        let color = match signal {
            Signal::Started | Signal::Finished => RGB8::new(12, 12, 12),
            Signal::MountFailed | Signal::OpenFailed | Signal::ReadFailed => RGB8::new(16, 0, 0),
        };
        self.blink = Some(Blink {
            color,
            halves: count * 2,
            period: period_ms as usize,
            count: 0,
        });
    }

    /// Called every millisecond.
    pub fn tick(&mut self) {
        if let Some(blink) = &mut self.blink {
            if blink.count == 0 {
                if blink.halves == 0 {
                    self.blink = None;
                    // Pick the background back up from the top.
                    self.count = 0;
                    self.phase = 0;
                    return;
                }
                let color = if blink.halves % 2 == 0 { blink.color } else { OFF };
                let _ = self.leds.write(once(color));
                blink.halves -= 1;
                blink.count = blink.period;
            } else {
                blink.count -= 1;
            }
            return;
        }

        if self.count == 0 {
            if self.phase >= self.steps.len() {
                self.phase = 0;
            }

            let _ = self.leds.write(once(self.steps[self.phase].color));
            self.count = self.steps[self.phase].count;
            self.phase += 1;
        } else {
            self.count -= 1;
        }
    }
}
