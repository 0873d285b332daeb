//! Dry run a keystroke script on the host.
//!
//! `check` shows how each line of a script is classified.  `run` executes
//! the script against a recording USB stack and prints every report that
//! the device would send, along with when it would be sent.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use ducky_keyboard::command::{self, Command};
use ducky_keyboard::host::{Clock, DirStorage, HostDelay, LogFeedback, RecordingUsb};
use ducky_keyboard::{Config, Control, Engine, Timing};

#[derive(Parser)]
#[command(name = "ducky-run")]
#[command(about = "Check and dry run keystroke scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how each line of a script is classified
    Check {
        /// The script to check
        script: PathBuf,
    },

    /// Run a script, printing the reports that would be sent
    Run {
        /// The script to run
        script: PathBuf,

        /// Actually sleep for each delay
        #[arg(long)]
        realtime: bool,

        /// Time each press and release is held
        #[arg(long, value_name = "MS")]
        settle_ms: Option<u32>,

        /// Pause after each typed character
        #[arg(long, value_name = "MS")]
        char_ms: Option<u32>,

        /// Pause after each line
        #[arg(long, value_name = "MS")]
        line_ms: Option<u32>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { script } => check(&script),
        Commands::Run { script, realtime, settle_ms, char_ms, line_ms } => {
            let mut timing = Timing::default();
            if let Some(ms) = settle_ms {
                timing.settle_ms = ms;
            }
            if let Some(ms) = char_ms {
                timing.char_pace_ms = ms;
            }
            if let Some(ms) = line_ms {
                timing.line_pace_ms = ms;
            }
            run(&script, realtime, timing)
        }
    }
}

/// Split a script path into the directory that acts as the volume, and the
/// file name within it.
fn split_path(script: &Path) -> Result<(PathBuf, String)> {
    let name = script
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid script path: {}", script.display()))?;
    let dir = match script.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name.to_string()))
}

fn check(script: &Path) -> Result<()> {
    let (dir, name) = split_path(script)?;
    let script = ducky_keyboard::storage::load(&mut DirStorage::new(dir), &name)?;

    let mut unknown = 0;
    for (index, line) in script.lines().enumerate() {
        let command = command::classify(line);
        if let Command::Unknown(_) = command {
            unknown += 1;
        }
        println!("{:4}: {:?}", index, command);
    }
    println!("{} command lines, {} unknown", script.lines().count(), unknown);
    Ok(())
}

fn run(script: &Path, realtime: bool, timing: Timing) -> Result<()> {
    let (dir, name) = split_path(script)?;
    let config = Config { script_path: &name, timing };

    let clock = Clock::default();
    let control = Control::new();
    let mut engine = Engine::new(config, &control, HostDelay::new(realtime, clock.clone()));
    let mut storage = DirStorage::new(dir);
    let mut usb = RecordingUsb::new(clock.clone(), true);

    let summary = engine.run(&mut storage, &mut usb, &mut LogFeedback)?;

    println!(
        "{:?}: {} lines, {} unknown, {} unmapped characters, {} reports, {} ms",
        summary.outcome,
        summary.lines,
        summary.unknown,
        summary.unmapped,
        usb.reports.len(),
        clock.get(),
    );
    Ok(())
}
