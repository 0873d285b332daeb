//! Diagnostic feedback.
//!
//! Without a console, the only way the device has to report what happened
//! is by blinking its status light.  Each [`Signal`] has its own count.

/// An event worth telling the user about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The script was loaded and is about to run.
    Started,
    /// The run ended, either at the end of the script or because it was
    /// stopped.
    Finished,
    MountFailed,
    OpenFailed,
    ReadFailed,
}

/// A blink pattern: `count` flashes, each on for `period_ms` and then off
/// for `period_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub count: u32,
    pub period_ms: u32,
}

impl Signal {
    pub fn pattern(self) -> Pattern {
        let (count, period_ms) = match self {
            Signal::Started => (2, 100),
            Signal::Finished => (1, 500),
            Signal::MountFailed => (3, 200),
            Signal::OpenFailed => (4, 200),
            Signal::ReadFailed => (5, 200),
        };
        Pattern { count, period_ms }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Signal {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Signal::Started => defmt::write!(fmt, "started"),
            Signal::Finished => defmt::write!(fmt, "finished"),
            Signal::MountFailed => defmt::write!(fmt, "mount failed"),
            Signal::OpenFailed => defmt::write!(fmt, "open failed"),
            Signal::ReadFailed => defmt::write!(fmt, "read failed"),
        }
    }
}

/// Something that can show signals to the user.
pub trait Feedback {
    fn signal(&mut self, signal: Signal);
}

/// Feedback that goes nowhere.
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn signal(&mut self, _signal: Signal) {}
}
