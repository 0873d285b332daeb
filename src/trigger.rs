//! Start/stop button handling.
//!
//! The button is sampled periodically.  A press is only reported once the
//! input has been stable for a while, and presses that come too soon after
//! the last accepted one are ignored, so a single push can't start a run
//! and then immediately stop it.

/// Individual state tracking.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum KeyState {
    /// Button is in released state.
    Released,
    /// Button is in pressed state.
    Pressed,
    /// We've seen a release edge, and will consider it released when consistent.
    DebounceRelease,
    /// We've seen a press edge, and will consider it pressed when consistent.
    DebouncePress,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Edge {
    None,
    Press,
    Release,
}

/// Number of consistent samples before a change is believed.
pub const DEBOUNCE_COUNT: usize = 20;

/// Minimum time between accepted presses.
pub const LOCKOUT_MS: u64 = 1000;

#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    state: KeyState,
    /// Count how many times we've seen a given debounce state.
    counter: usize,
}

impl Debouncer {
    pub const fn new() -> Debouncer {
        Debouncer {
            state: KeyState::Released,
            counter: 0,
        }
    }

    /// Feed one sample of the input.
    pub fn react(&mut self, pressed: bool) -> Edge {
        match self.state {
            KeyState::Released => {
                if pressed {
                    self.state = KeyState::DebouncePress;
                    self.counter = 0;
                }
                Edge::None
            }
            KeyState::Pressed => {
                if !pressed {
                    self.state = KeyState::DebounceRelease;
                    self.counter = 0;
                }
                Edge::None
            }
            KeyState::DebounceRelease => self.settle(!pressed, KeyState::Released, KeyState::Pressed, Edge::Release),
            KeyState::DebouncePress => self.settle(pressed, KeyState::Pressed, KeyState::Released, Edge::Press),
        }
    }

    /// While waiting for a change to settle: count samples that agree with
    /// the change, and give up on the first one that doesn't.
    fn settle(&mut self, agrees: bool, target: KeyState, back: KeyState, edge: Edge) -> Edge {
        if !agrees {
            self.state = back;
            self.counter = 0;
            return Edge::None;
        }
        self.counter += 1;
        if self.counter == DEBOUNCE_COUNT {
            self.state = target;
            edge
        } else {
            Edge::None
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new()
    }
}

/// A debounced button with a re-trigger lockout.
#[derive(Clone, Copy, Debug)]
pub struct Trigger {
    debounce: Debouncer,
    lockout_ms: u64,
    last_accepted: Option<u64>,
}

impl Trigger {
    pub const fn new(lockout_ms: u64) -> Trigger {
        Trigger {
            debounce: Debouncer::new(),
            lockout_ms,
            last_accepted: None,
        }
    }

    /// Sample the button at time `now_ms`.  Returns true for a press that
    /// should be acted upon.
    pub fn poll(&mut self, pressed: bool, now_ms: u64) -> bool {
        if self.debounce.react(pressed) != Edge::Press {
            return false;
        }
        if let Some(last) = self.last_accepted {
            if now_ms.saturating_sub(last) < self.lockout_ms {
                return false;
            }
        }
        self.last_accepted = Some(now_ms);
        true
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::new(LOCKOUT_MS)
    }
}
