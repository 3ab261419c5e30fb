//! Building the DREAMM command line for an entry.
//!
//! Commands are typed values. `Display` renders them the way a user would
//! type them (`"C:\D\dreamm.exe" -mount rw:c="C:\G" ...`), while
//! [`EmulatorCommand::process_args`] yields the unquoted argument vector
//! handed to the OS, so no shell ever parses them.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::library::entry::{AUDIO_DEVICES, BASELINE_AUDIO_DEVICE};
use crate::library::LibraryEntry;
use crate::paths::{file_stem, parent_path};

/// Existence checks used while building commands.
pub trait PathProbe {
    fn exists(&self, path: &str) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// One command-line argument. `quoted` is appended after `prefix` and shown
/// in double quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arg {
    pub prefix: String,
    pub quoted: Option<String>,
}

impl Arg {
    pub fn plain(text: impl Into<String>) -> Self {
        Arg {
            prefix: text.into(),
            quoted: None,
        }
    }

    pub fn quoted(prefix: impl Into<String>, value: impl Into<String>) -> Self {
        Arg {
            prefix: prefix.into(),
            quoted: Some(value.into()),
        }
    }

    /// The value passed to the process.
    pub fn value(&self) -> String {
        match &self.quoted {
            Some(q) => format!("{}{q}", self.prefix),
            None => self.prefix.clone(),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quoted {
            Some(q) => write!(f, "{}\"{q}\"", self.prefix),
            None => f.write_str(&self.prefix),
        }
    }
}

/// A fully built emulator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmulatorCommand {
    pub program: String,
    pub args: Vec<Arg>,
}

impl EmulatorCommand {
    pub fn process_args(&self) -> Vec<String> {
        self.args.iter().map(Arg::value).collect()
    }
}

impl fmt::Display for EmulatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Build the command that plays (or, with `run_setup`, configures) `entry`.
///
/// Returns `None` when no emulator is configured, when the entry has nothing
/// to run in the requested mode, or when the file to run is missing.
pub fn build_command(
    emulator: &str,
    entry: &LibraryEntry,
    run_setup: bool,
    probe: &dyn PathProbe,
) -> Option<EmulatorCommand> {
    if emulator.is_empty() {
        return None;
    }

    if entry.is_native() && !run_setup {
        let mut args = vec![Arg::plain("-run"), Arg::quoted("", &entry.install_path)];
        if let Some(mode) = entry.window_mode() {
            args.push(Arg::plain(mode.flag()));
        }
        return Some(EmulatorCommand {
            program: emulator.to_string(),
            args,
        });
    }

    let target = if run_setup {
        &entry.setup_path
    } else {
        &entry.exe_path
    };
    if target.is_empty() || !probe.exists(target) {
        return None;
    }

    let mut args = emulation_args(entry, target, probe);
    args.push(Arg::plain("-launch"));
    args.push(Arg::quoted("", target));
    Some(EmulatorCommand {
        program: emulator.to_string(),
        args,
    })
}

/// Build the command that has DREAMM write a `.dreamm` profile for the
/// entry's executable (`DOOM.EXE` -> `DOOM.dreamm`) and start it.
pub fn build_persistent_profile(
    emulator: &str,
    entry: &LibraryEntry,
    probe: &dyn PathProbe,
) -> Option<EmulatorCommand> {
    let target = &entry.exe_path;
    if emulator.is_empty() || target.is_empty() || !probe.exists(target) {
        return None;
    }

    let mut args = emulation_args(entry, target, probe);
    args.push(Arg::plain("-makedream"));
    args.push(Arg::quoted("", profile_file_name(target)));
    args.push(Arg::plain("-launch"));
    args.push(Arg::quoted("", target));
    Some(EmulatorCommand {
        program: emulator.to_string(),
        args,
    })
}

/// File name of the profile DREAMM writes for `exe_path`.
pub fn profile_file_name(exe_path: &str) -> String {
    format!("{}.dreamm", file_stem(exe_path))
}

/// Drive mounts and hardware properties for an emulated launch of `target`.
fn emulation_args(entry: &LibraryEntry, target: &str, probe: &dyn PathProbe) -> Vec<Arg> {
    let mut args = vec![
        Arg::plain("-mount"),
        Arg::quoted("rw:c=", parent_path(target).unwrap_or_default()),
    ];

    if !entry.iso_path.is_empty() && probe.exists(&entry.iso_path) {
        args.push(Arg::plain("-mount"));
        args.push(Arg::quoted("", format!("d={}", entry.iso_path)));
    }
    if !entry.root_path_override.is_empty() {
        args.push(Arg::plain("-prop"));
        args.push(Arg::quoted("rootpath=", &entry.root_path_override));
    }

    let mips = if entry.mips <= 0 {
        "unlimited".to_string()
    } else {
        entry.mips.to_string()
    };
    let mut audio = entry.audio.enabled_names().join("+");
    if audio.is_empty() {
        audio = AUDIO_DEVICES[BASELINE_AUDIO_DEVICE].to_string();
    }

    for prop in [
        format!("ramkb={}", entry.ram_kb),
        format!("mips={mips}"),
        format!("machine={}", entry.machine.property_value()),
        format!("audiohw={audio}"),
        format!("videohw={}", entry.video_hw_name()),
        format!("winres={}x{}x{}", entry.width, entry.height, entry.depth),
    ] {
        args.push(Arg::plain("-prop"));
        args.push(Arg::plain(prop));
    }
    args
}
