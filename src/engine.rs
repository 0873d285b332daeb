//! Script execution.
//!
//! The [`Engine`] owns a run from start to finish: it loads the script,
//! walks it line by line, and makes sure the USB stack is serviced between
//! every line.  The only thing shared with the outside world while a run is
//! going is the [`Control`], through which a trigger can ask for the run to
//! stop.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embedded_hal::blocking::delay::DelayMs;
use usb_device::prelude::UsbDeviceState;

use crate::command::{self, Command};
use crate::config::Config;
use crate::feedback::{Feedback, Signal};
use crate::inject::{Injector, UsbStack};
use crate::interp::{Interpreter, Step};
use crate::log::{info, warn};
use crate::script::Script;
use crate::storage::{self, ScriptStorage, StorageError};

/// The coarse run state, as visible through [`Control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopping,
}

impl Phase {
    fn from_u8(value: u8) -> Phase {
        match value {
            1 => Phase::Running,
            2 => Phase::Stopping,
            _ => Phase::Idle,
        }
    }
}

/// The full execution state, owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecState {
    Idle,
    /// Executing a script.  `next_line` counts the command lines already
    /// executed, which is also the index of the next one to run.
    Running { next_line: usize },
    Stopping,
}

/// What the trigger handler should do with a button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    /// Start a run.
    Start,
    /// A stop was requested of the current run.
    Stop,
    /// Nothing to start against: the host hasn't configured us.
    NotConnected,
    /// Already stopping.
    Ignore,
}

/// State shared between the engine and the trigger handler.
///
/// The trigger side may only raise the stop flag and read the phase.  Only
/// loads and stores are used, so this works on cores without
/// compare-and-swap, and can be touched from an interrupt handler.
pub struct Control {
    phase: AtomicU8,
    stop: AtomicBool,
}

impl Control {
    pub const fn new() -> Control {
        Control {
            phase: AtomicU8::new(Phase::Idle as u8),
            stop: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Ask a running script to stop.  Returns false, and does nothing, if
    /// there is no run to stop.
    pub fn request_stop(&self) -> bool {
        if self.phase() != Phase::Running {
            return false;
        }
        self.stop.store(true, Ordering::Release);
        true
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Decide what a trigger press means right now.  A press while running
    /// requests the stop itself.
    pub fn on_press(&self, usb: UsbDeviceState) -> TriggerAction {
        match self.phase() {
            Phase::Idle if usb == UsbDeviceState::Configured => TriggerAction::Start,
            Phase::Idle => TriggerAction::NotConnected,
            Phase::Running => {
                self.request_stop();
                TriggerAction::Stop
            }
            Phase::Stopping => TriggerAction::Ignore,
        }
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn begin(&self) {
        self.stop.store(false, Ordering::Release);
        self.set_phase(Phase::Running);
    }

    fn end(&self) {
        self.set_phase(Phase::Idle);
        self.stop.store(false, Ordering::Release);
    }
}

impl Default for Control {
    fn default() -> Self {
        Control::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every line was executed.
    Completed,
    /// Stopped by request before the end of the script.
    Cancelled,
}

/// What happened during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Command lines executed, including unknown ones.
    pub lines: usize,
    /// Lines whose keyword wasn't recognized.
    pub unknown: usize,
    /// Keystrokes lost to a busy or unconfigured endpoint.
    pub dropped: usize,
    /// Characters in `STRING` commands that have no key.
    pub unmapped: usize,
}

pub struct Engine<'a, D> {
    config: Config<'a>,
    control: &'a Control,
    delay: D,
    state: ExecState,
}

impl<'a, D: DelayMs<u32>> Engine<'a, D> {
    pub fn new(config: Config<'a>, control: &'a Control, delay: D) -> Self {
        Engine {
            config,
            control,
            delay,
            state: ExecState::Idle,
        }
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    /// Load the configured script from storage and run it.
    ///
    /// Storage failures end the run before anything is typed.  Either way,
    /// the engine is back to idle when this returns.
    pub fn run<S, U, F>(
        &mut self,
        storage: &mut S,
        usb: &mut U,
        feedback: &mut F,
    ) -> Result<RunSummary, StorageError<S::Error>>
    where
        S: ScriptStorage,
        U: UsbStack,
        F: Feedback,
    {
        self.start();

        let script = match storage::load(storage, self.config.script_path) {
            Ok(script) => script,
            Err(e) => {
                warn!("Unable to load script: {} failed", e.kind());
                feedback.signal(e.signal());
                self.finish();
                return Err(e);
            }
        };

        info!("Script {} loaded, executing", self.config.script_path);
        feedback.signal(Signal::Started);
        let summary = self.execute_lines(&script, usb);
        feedback.signal(Signal::Finished);
        Ok(summary)
    }

    /// Run a script that is already in memory.
    pub fn execute<U: UsbStack>(&mut self, script: &Script, usb: &mut U) -> RunSummary {
        self.start();
        self.execute_lines(script, usb)
    }

    fn start(&mut self) {
        debug_assert_eq!(self.state, ExecState::Idle);
        self.state = ExecState::Running { next_line: 0 };
        self.control.begin();
    }

    fn finish(&mut self) {
        self.state = ExecState::Idle;
        self.control.end();
    }

    fn execute_lines<U: UsbStack>(&mut self, script: &Script, usb: &mut U) -> RunSummary {
        let control = self.control;
        let timing = self.config.timing;
        let mut injector = Injector::new(usb, &mut self.delay, timing);

        let mut script_lines = script.lines();
        let mut unknown = 0;
        let mut outcome = RunOutcome::Completed;

        while let ExecState::Running { next_line } = self.state {
            if control.stop_requested() {
                outcome = RunOutcome::Cancelled;
                break;
            }
            let Some(line) = script_lines.next() else {
                break;
            };

            let command = command::classify(line);
            if let Command::Unknown(_) = command {
                unknown += 1;
            }
            let step = Interpreter::new(&mut injector, control).execute(&command);
            self.state = ExecState::Running { next_line: next_line + 1 };
            if step == Step::Stopped {
                outcome = RunOutcome::Cancelled;
                break;
            }

            // Keep the device alive between lines.
            injector.service();
            injector.wait(timing.line_pace_ms);
        }

        let lines = match self.state {
            ExecState::Running { next_line } => next_line,
            _ => 0,
        };
        if outcome == RunOutcome::Cancelled {
            self.state = ExecState::Stopping;
            control.set_phase(Phase::Stopping);
            info!("Script stopped after {} lines", lines);
        } else {
            info!("Script completed, {} lines", lines);
        }

        let summary = RunSummary {
            outcome,
            lines,
            unknown,
            dropped: injector.losses.dropped,
            unmapped: injector.losses.unmapped,
        };
        self.finish();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_only_while_running() {
        let control = Control::new();
        assert!(!control.request_stop());
        assert!(!control.stop_requested());

        control.begin();
        assert_eq!(control.phase(), Phase::Running);
        assert!(control.request_stop());
        assert!(control.stop_requested());

        control.end();
        assert!(control.is_idle());
        assert!(!control.stop_requested());
    }

    #[test]
    fn press_decisions() {
        let control = Control::new();
        assert_eq!(control.on_press(UsbDeviceState::Default), TriggerAction::NotConnected);
        assert_eq!(control.on_press(UsbDeviceState::Configured), TriggerAction::Start);

        control.begin();
        assert_eq!(control.on_press(UsbDeviceState::Configured), TriggerAction::Stop);
        assert!(control.stop_requested());

        control.set_phase(Phase::Stopping);
        assert_eq!(control.on_press(UsbDeviceState::Configured), TriggerAction::Ignore);
    }
}
