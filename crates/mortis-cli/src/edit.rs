//! Entry edit flags shared by `add` and `edit`.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use mortis_core::library::entry::{AudioFlags, Machine, AUDIO_DEVICES, VIDEO_HARDWARE};
use mortis_core::{LibraryEntry, Platform, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Dos,
    Windows,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Dos => Platform::Dos,
            PlatformArg::Windows => Platform::Windows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Playable,
    Unplayable,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Playable => Status::Playable,
            StatusArg::Unplayable => Status::Unplayable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineArg {
    Pc,
    Tandy,
}

impl From<MachineArg> for Machine {
    fn from(arg: MachineArg) -> Self {
        match arg {
            MachineArg::Pc => Machine::Pc,
            MachineArg::Tandy => Machine::Tandy,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Switch platform, resetting RAM and audio to the platform's defaults
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// Game executable
    #[arg(long)]
    pub exe: Option<String>,
    /// Setup executable
    #[arg(long)]
    pub setup: Option<String>,
    /// DREAMM install folder (enables native launch)
    #[arg(long)]
    pub install: Option<String>,
    /// CD image mounted as drive D
    #[arg(long)]
    pub iso: Option<String>,
    #[arg(long)]
    pub root_path: Option<String>,
    #[arg(long, value_enum)]
    pub machine: Option<MachineArg>,
    /// Memory in KB
    #[arg(long)]
    pub ram: Option<u32>,
    /// CPU speed, 0 for unlimited
    #[arg(long)]
    pub mips: Option<i32>,
    /// Comma-separated audio devices, e.g. "sb16,gmidi" (empty for none)
    #[arg(long)]
    pub audio: Option<String>,
    /// Video adapter (hercules, cga, ega, mcga, vga, svga)
    #[arg(long)]
    pub video: Option<String>,
    /// Windows desktop mode as WIDTHxHEIGHTxDEPTH
    #[arg(long)]
    pub resolution: Option<String>,
    #[arg(long)]
    pub windowed: Option<bool>,
    #[arg(long)]
    pub maximized: Option<bool>,
    #[arg(long)]
    pub fullscreen: Option<bool>,
}

/// Validated field changes, ready to apply to an entry.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    args: EditArgs,
    audio: Option<AudioFlags>,
    video_hw: Option<usize>,
    resolution: Option<(u32, u32, u32)>,
}

impl EntryChanges {
    pub fn platform(&self) -> Option<Platform> {
        self.args.platform.map(Platform::from)
    }

    /// Apply everything except the platform switch.
    pub fn apply(self, entry: &mut LibraryEntry) {
        let args = self.args;
        let set = |field: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *field = value;
            }
        };
        set(&mut entry.name, args.name);
        set(&mut entry.description, args.description);
        set(&mut entry.exe_path, args.exe);
        set(&mut entry.setup_path, args.setup);
        set(&mut entry.install_path, args.install);
        set(&mut entry.iso_path, args.iso);
        set(&mut entry.root_path_override, args.root_path);

        if let Some(status) = args.status {
            entry.status = status.into();
        }
        if let Some(machine) = args.machine {
            entry.machine = machine.into();
        }
        if let Some(ram) = args.ram {
            entry.ram_kb = ram;
        }
        if let Some(mips) = args.mips {
            entry.mips = mips;
        }
        if let Some(audio) = self.audio {
            entry.audio = audio;
        }
        if let Some(video_hw) = self.video_hw {
            entry.video_hw = video_hw;
        }
        if let Some((width, height, depth)) = self.resolution {
            entry.width = width;
            entry.height = height;
            entry.depth = depth;
        }
        if let Some(windowed) = args.windowed {
            entry.force_windowed = windowed;
        }
        if let Some(maximized) = args.maximized {
            entry.force_maximized = maximized;
        }
        if let Some(fullscreen) = args.fullscreen {
            entry.force_fullscreen = fullscreen;
        }
    }
}

impl TryFrom<EditArgs> for EntryChanges {
    type Error = anyhow::Error;

    fn try_from(args: EditArgs) -> Result<Self> {
        let audio = args.audio.as_deref().map(parse_audio).transpose()?;
        let video_hw = args.video.as_deref().map(parse_video).transpose()?;
        let resolution = args
            .resolution
            .as_deref()
            .map(parse_resolution)
            .transpose()?;
        if args.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            bail!("Name cannot be empty");
        }
        Ok(EntryChanges {
            args,
            audio,
            video_hw,
            resolution,
        })
    }
}

fn parse_audio(list: &str) -> Result<AudioFlags> {
    let mut flags = AudioFlags::none();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let Some(idx) = AUDIO_DEVICES.iter().position(|d| d.eq_ignore_ascii_case(name)) else {
            bail!(
                "Unknown audio device {name:?} (expected one of {})",
                AUDIO_DEVICES.join(", ")
            );
        };
        flags.set(idx, true);
    }
    Ok(flags)
}

fn parse_video(name: &str) -> Result<usize> {
    VIDEO_HARDWARE
        .iter()
        .position(|v| v.eq_ignore_ascii_case(name.trim()))
        .with_context(|| {
            format!(
                "Unknown video adapter {name:?} (expected one of {})",
                VIDEO_HARDWARE.join(", ")
            )
        })
}

fn parse_resolution(value: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = value.split(['x', 'X']).map(str::trim).collect();
    let [w, h, d] = parts.as_slice() else {
        bail!("Resolution must look like 800x600x32, got {value:?}");
    };
    let parse = |s: &str| {
        s.parse::<u32>()
            .with_context(|| format!("Invalid number {s:?} in resolution {value:?}"))
    };
    Ok((parse(*w)?, parse(*h)?, parse(*d)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audio() {
        assert_eq!(
            parse_audio("sb16, GMIDI").unwrap().enabled_names(),
            vec!["sb16", "gmidi"]
        );
        assert_eq!(parse_audio("").unwrap(), AudioFlags::none());
        assert!(parse_audio("gus").is_err());
    }

    #[test]
    fn test_parse_video_and_resolution() {
        assert_eq!(parse_video("VGA").unwrap(), 4);
        assert!(parse_video("xga").is_err());
        assert_eq!(parse_resolution("1024x768x16").unwrap(), (1024, 768, 16));
        assert!(parse_resolution("1024x768").is_err());
        assert!(parse_resolution("axbxc").is_err());
    }

    #[test]
    fn test_apply_changes() {
        let args = EditArgs {
            exe: Some("C:\\TIE\\TIE95.EXE".to_string()),
            ram: Some(32768),
            audio: Some("gmidi".to_string()),
            resolution: Some("800x600x16".to_string()),
            fullscreen: Some(true),
            platform: Some(PlatformArg::Windows),
            ..Default::default()
        };
        let changes = EntryChanges::try_from(args).unwrap();
        assert_eq!(changes.platform(), Some(Platform::Windows));

        let mut entry = LibraryEntry::named("TIE Fighter");
        changes.apply(&mut entry);
        assert_eq!(entry.exe_path, "C:\\TIE\\TIE95.EXE");
        assert_eq!(entry.ram_kb, 32768);
        assert_eq!(entry.audio.enabled_names(), vec!["gmidi"]);
        assert_eq!((entry.width, entry.height, entry.depth), (800, 600, 16));
        assert!(entry.force_fullscreen);
        assert_eq!(entry.name, "TIE Fighter");
    }

    #[test]
    fn test_empty_name_rejected() {
        let args = EditArgs {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(EntryChanges::try_from(args).is_err());
    }
}
