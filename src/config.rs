//! Engine configuration.
//!
//! The timing values were tuned against typical host keyboard buffers.  A
//! host that drops keys wants longer settle or pacing times; none of these
//! are protocol requirements.

/// Default file name of the script on the storage volume.
pub const SCRIPT_FILE_NAME: &str = "payload.txt";

/// Waits used while replaying a script, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// How long a press, and then the following release, is held before
    /// anything else is sent.
    pub settle_ms: u32,
    /// Pause after each character of a `STRING`.
    pub char_pace_ms: u32,
    /// Pause after each script line.
    pub line_pace_ms: u32,
    /// Waits are broken into slices of this length, with the USB stack
    /// serviced between slices.  Must be at least 1.
    pub service_slice_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle_ms: 10,
            char_pace_ms: 20,
            line_pace_ms: 50,
            service_slice_ms: 1,
        }
    }
}

impl Timing {
    /// Timing with no waits at all, other than explicit `DELAY` commands.
    pub fn immediate() -> Self {
        Timing {
            settle_ms: 0,
            char_pace_ms: 0,
            line_pace_ms: 0,
            service_slice_ms: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config<'a> {
    /// Path of the script, relative to the root of the mounted volume.
    pub script_path: &'a str,
    pub timing: Timing,
}

impl Default for Config<'static> {
    fn default() -> Self {
        Config {
            script_path: SCRIPT_FILE_NAME,
            timing: Timing::default(),
        }
    }
}
