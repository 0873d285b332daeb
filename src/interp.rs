//! Command interpreter.

use embedded_hal::blocking::delay::DelayMs;

use crate::engine::Control;
use crate::inject::{Injector, UsbStack};
use crate::keymap;
use crate::log::{debug, warn};
use crate::Command;

/// How the execution of a single command ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The command ran to completion.
    Done,
    /// The line was skipped: a known keyword with nothing to send, or an
    /// unknown keyword.
    Ignored,
    /// A stop was requested part way through the command.
    Stopped,
}

pub struct Interpreter<'a, 'b, U, D> {
    injector: &'b mut Injector<'a, U, D>,
    control: &'b Control,
}

impl<'a, 'b, U: UsbStack, D: DelayMs<u32>> Interpreter<'a, 'b, U, D> {
    pub fn new(injector: &'b mut Injector<'a, U, D>, control: &'b Control) -> Self {
        Interpreter { injector, control }
    }

    /// Execute one command.
    pub fn execute(&mut self, command: &Command) -> Step {
        match command {
            Command::Delay(ms) => {
                debug!("Delaying {} ms", *ms);
                self.injector.wait(*ms);
                Step::Done
            }
            Command::TypeString(text) => self.type_string(text),
            Command::SpecialKey(mods, key) => {
                self.injector.send_key(*mods, *key);
                Step::Done
            }
            Command::Skip => Step::Ignored,
            Command::Unknown(line) => {
                warn!("Unknown command: {}", line.as_str());
                Step::Ignored
            }
        }
    }

    /// Type some text.  Characters with no key still take up their pacing
    /// slot, and a stop request is honored between characters.  The USB
    /// stack is serviced after every character, even with no pacing.
    fn type_string(&mut self, text: &str) -> Step {
        let pace = self.injector.timing().char_pace_ms;
        for ch in text.chars() {
            if self.control.stop_requested() {
                return Step::Stopped;
            }
            match keymap::translate(ch) {
                Some((key, mods)) => {
                    self.injector.send_key(mods, key);
                }
                None => self.injector.losses.unmapped += 1,
            }
            self.injector.wait(pace);
            self.injector.service();
        }
        Step::Done
    }
}
