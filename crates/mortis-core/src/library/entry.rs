//! Library entry types.
//!
//! A [`LibraryEntry`] is one installed program the launcher knows about:
//! how to find it on disk and which emulated hardware to start it on.

use serde::{Deserialize, Serialize};

/// Audio devices in the order DREAMM's `audiohw` property expects them.
pub const AUDIO_DEVICES: [&str; 6] = ["speaker", "cms", "adlib", "sb16", "mt32", "gmidi"];

/// Index of the device used when an entry enables none.
pub const BASELINE_AUDIO_DEVICE: usize = 3;

/// Video adapters, indexed by [`LibraryEntry::video_hw`].
pub const VIDEO_HARDWARE: [&str; 6] = ["hercules", "cga", "ega", "mcga", "vga", "svga"];

pub const DEFAULT_VIDEO_HW: usize = 5;
pub const DEFAULT_RAM_KB: u32 = 640;
pub const DEFAULT_MIPS: i32 = 60;
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_DEPTH: u32 = 32;

/// Name given to entries created by "add".
pub const PLACEHOLDER_NAME: &str = "New Game";

const GMIDI: usize = 5;

/// RAM sizes offered by the editor, in KB.
pub const RAM_PRESETS_KB: &[u32] = &[
    640, 1024, 4096, 8192, 16384, 32768, 65536, 131072, 262144,
];

/// A named CPU speed. `0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipsPreset {
    pub value: i32,
    pub label: &'static str,
}

pub const MIPS_PRESETS: &[MipsPreset] = &[
    MipsPreset { value: 10, label: "10 MIPS (386 / Slow 486)" },
    MipsPreset { value: 35, label: "35 MIPS (486 DX2-66)" },
    MipsPreset { value: 60, label: "60 MIPS (Pentium 60 - DOS Default)" },
    MipsPreset { value: 100, label: "100 MIPS (Pentium 90/100)" },
    MipsPreset { value: 200, label: "200 MIPS (Pentium MMX)" },
    MipsPreset { value: 0, label: "Unlimited (Windows Default)" },
];

/// A Windows desktop mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPreset {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub label: &'static str,
}

pub const RESOLUTION_PRESETS: &[ResolutionPreset] = &[
    ResolutionPreset { width: 640, height: 480, depth: 8, label: "640 x 480 x 8 (256 Colors)" },
    ResolutionPreset { width: 640, height: 480, depth: 16, label: "640 x 480 x 16 (High Color)" },
    ResolutionPreset { width: 640, height: 480, depth: 32, label: "640 x 480 x 32 (True Color)" },
    ResolutionPreset { width: 800, height: 600, depth: 16, label: "800 x 600 x 16" },
    ResolutionPreset { width: 800, height: 600, depth: 32, label: "800 x 600 x 32 (SVGA)" },
    ResolutionPreset { width: 1024, height: 768, depth: 16, label: "1024 x 768 x 16" },
    ResolutionPreset { width: 1024, height: 768, depth: 32, label: "1024 x 768 x 32 (XGA)" },
    ResolutionPreset { width: 1280, height: 1024, depth: 32, label: "1280 x 1024 x 32 (SXGA)" },
    ResolutionPreset { width: 1600, height: 1200, depth: 32, label: "1600 x 1200 x 32 (UXGA)" },
];

/// Colour depths selectable for a custom resolution.
pub const COLOR_DEPTHS: &[u32] = &[8, 16, 24, 32];

/// How an entry is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Dos,
    Windows,
    /// An installation DREAMM understands natively; no mounts or properties.
    NativeNoEmulation,
}

impl Platform {
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Platform::Dos),
            1 => Some(Platform::Windows),
            2 => Some(Platform::NativeNoEmulation),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Platform::Dos => 0,
            Platform::Windows => 1,
            Platform::NativeNoEmulation => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Dos => "DOS",
            Platform::Windows => "Windows",
            Platform::NativeNoEmulation => "DREAMM Native",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Unplayable,
    Playable,
}

impl Status {
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Status::Unplayable),
            1 => Some(Status::Playable),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Status::Unplayable => 0,
            Status::Playable => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Machine {
    #[default]
    Pc,
    Tandy,
}

impl Machine {
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Machine::Pc),
            1 => Some(Machine::Tandy),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Machine::Pc => 0,
            Machine::Tandy => 1,
        }
    }

    /// Value of DREAMM's `machine` property.
    pub fn property_value(self) -> &'static str {
        match self {
            Machine::Pc => "pc",
            Machine::Tandy => "tandy",
        }
    }
}

/// Window mode requested from DREAMM for native launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowMode {
    Windowed,
    Maximized,
    Fullscreen,
}

impl WindowMode {
    pub fn flag(self) -> &'static str {
        match self {
            WindowMode::Windowed => "-windowed",
            WindowMode::Maximized => "-maximized",
            WindowMode::Fullscreen => "-fullscreen",
        }
    }
}

/// Enabled audio devices, indexed like [`AUDIO_DEVICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFlags(pub [bool; 6]);

impl Default for AudioFlags {
    fn default() -> Self {
        let mut flags = [false; 6];
        flags[BASELINE_AUDIO_DEVICE] = true;
        AudioFlags(flags)
    }
}

impl AudioFlags {
    pub fn none() -> Self {
        AudioFlags([false; 6])
    }

    /// Bit `i` set means device `i` is enabled. Bits above 5 are ignored.
    pub fn from_mask(mask: u32) -> Self {
        let mut flags = [false; 6];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = mask & (1 << i) != 0;
        }
        AudioFlags(flags)
    }

    pub fn mask(&self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize, enabled: bool) {
        if let Some(flag) = self.0.get_mut(index) {
            *flag = enabled;
        }
    }

    /// Names of the enabled devices, in device order.
    pub fn enabled_names(&self) -> Vec<&'static str> {
        AUDIO_DEVICES
            .iter()
            .zip(self.0.iter())
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// One managed program installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    pub description: String,
    pub platform: Platform,
    pub status: Status,
    pub exe_path: String,
    pub setup_path: String,
    /// DREAMM install folder; when set, normal play uses native mode.
    pub install_path: String,
    /// CD image mounted as drive D.
    pub iso_path: String,
    pub root_path_override: String,
    pub machine: Machine,
    pub ram_kb: u32,
    /// Emulated CPU speed, `<= 0` meaning unlimited.
    pub mips: i32,
    pub audio: AudioFlags,
    /// Index into [`VIDEO_HARDWARE`].
    pub video_hw: usize,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub force_windowed: bool,
    pub force_maximized: bool,
    pub force_fullscreen: bool,
}

impl Default for LibraryEntry {
    fn default() -> Self {
        LibraryEntry {
            name: PLACEHOLDER_NAME.to_string(),
            description: String::new(),
            platform: Platform::Dos,
            status: Status::Unplayable,
            exe_path: String::new(),
            setup_path: String::new(),
            install_path: String::new(),
            iso_path: String::new(),
            root_path_override: String::new(),
            machine: Machine::Pc,
            ram_kb: DEFAULT_RAM_KB,
            mips: DEFAULT_MIPS,
            audio: AudioFlags::default(),
            video_hw: DEFAULT_VIDEO_HW,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            depth: DEFAULT_DEPTH,
            force_windowed: false,
            force_maximized: false,
            force_fullscreen: false,
        }
    }
}

impl LibraryEntry {
    /// Entry produced by the "add" action.
    pub fn placeholder() -> Self {
        LibraryEntry::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        LibraryEntry {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Native installs launch through `-run` instead of mounting drives.
    pub fn is_native(&self) -> bool {
        !self.install_path.is_empty()
    }

    pub fn can_play(&self) -> bool {
        !self.exe_path.is_empty() || !self.install_path.is_empty()
    }

    /// Video adapter name; out-of-range indices fall back to `svga`.
    pub fn video_hw_name(&self) -> &'static str {
        VIDEO_HARDWARE
            .get(self.video_hw)
            .copied()
            .unwrap_or(VIDEO_HARDWARE[DEFAULT_VIDEO_HW])
    }

    /// The single window mode to request, fullscreen winning over maximized
    /// winning over windowed.
    pub fn window_mode(&self) -> Option<WindowMode> {
        if self.force_fullscreen {
            Some(WindowMode::Fullscreen)
        } else if self.force_maximized {
            Some(WindowMode::Maximized)
        } else if self.force_windowed {
            Some(WindowMode::Windowed)
        } else {
            None
        }
    }

    /// Switch between DOS and Windows, resetting RAM and audio to the
    /// platform's typical setup. Returns `false` (and changes nothing) for
    /// native entries or a native target.
    pub fn apply_platform_defaults(&mut self, platform: Platform) -> bool {
        if self.platform == Platform::NativeNoEmulation
            || platform == Platform::NativeNoEmulation
        {
            return false;
        }
        self.platform = platform;
        self.audio = AudioFlags::none();
        match platform {
            Platform::Windows => {
                self.ram_kb = 65536;
                self.audio.set(GMIDI, true);
            }
            _ => {
                self.ram_kb = DEFAULT_RAM_KB;
                self.audio.set(BASELINE_AUDIO_DEVICE, true);
                self.audio.set(GMIDI, true);
            }
        }
        true
    }

    /// Strip characters the record format cannot hold.
    pub(crate) fn sanitize(&mut self) {
        for field in [
            &mut self.name,
            &mut self.description,
            &mut self.exe_path,
            &mut self.setup_path,
            &mut self.install_path,
            &mut self.iso_path,
            &mut self.root_path_override,
        ] {
            if field.contains(['|', '\r', '\n']) {
                *field = field.replace(['|', '\r', '\n'], " ");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let entry = LibraryEntry::placeholder();
        assert_eq!(entry.name, "New Game");
        assert_eq!(entry.platform, Platform::Dos);
        assert_eq!(entry.ram_kb, 640);
        assert_eq!(entry.mips, 60);
        assert_eq!(entry.audio.enabled_names(), vec!["sb16"]);
        assert_eq!(entry.video_hw_name(), "svga");
        assert!(!entry.can_play());
    }

    #[test]
    fn test_audio_mask() {
        let flags = AudioFlags::from_mask(0b101000);
        assert_eq!(flags.enabled_names(), vec!["sb16", "gmidi"]);
        assert_eq!(flags.mask(), 0b101000);
        assert_eq!(AudioFlags::from_mask(0xFFC0), AudioFlags::none());
    }

    #[test]
    fn test_ordinals() {
        for platform in [Platform::Dos, Platform::Windows, Platform::NativeNoEmulation] {
            assert_eq!(Platform::from_ordinal(platform.ordinal() as i64), Some(platform));
        }
        assert_eq!(Platform::from_ordinal(7), None);
        assert_eq!(Status::from_ordinal(1), Some(Status::Playable));
        assert_eq!(Machine::from_ordinal(1), Some(Machine::Tandy));
        assert_eq!(Machine::from_ordinal(-1), None);
    }

    #[test]
    fn test_window_mode_precedence() {
        let mut entry = LibraryEntry::named("Grim Fandango");
        assert_eq!(entry.window_mode(), None);
        entry.force_windowed = true;
        assert_eq!(entry.window_mode(), Some(WindowMode::Windowed));
        entry.force_maximized = true;
        assert_eq!(entry.window_mode(), Some(WindowMode::Maximized));
        entry.force_fullscreen = true;
        assert_eq!(entry.window_mode(), Some(WindowMode::Fullscreen));
    }

    #[test]
    fn test_platform_defaults() {
        let mut entry = LibraryEntry::named("Full Throttle");
        assert!(entry.apply_platform_defaults(Platform::Windows));
        assert_eq!(entry.platform, Platform::Windows);
        assert_eq!(entry.ram_kb, 65536);
        assert_eq!(entry.audio.enabled_names(), vec!["gmidi"]);

        assert!(entry.apply_platform_defaults(Platform::Dos));
        assert_eq!(entry.ram_kb, 640);
        assert_eq!(entry.audio.enabled_names(), vec!["sb16", "gmidi"]);
    }

    #[test]
    fn test_platform_defaults_skip_native() {
        let mut entry = LibraryEntry::named("Loom");
        entry.platform = Platform::NativeNoEmulation;
        entry.ram_kb = 1024;
        assert!(!entry.apply_platform_defaults(Platform::Windows));
        assert_eq!(entry.platform, Platform::NativeNoEmulation);
        assert_eq!(entry.ram_kb, 1024);
    }

    #[test]
    fn test_video_hw_out_of_range() {
        let mut entry = LibraryEntry::named("Loom");
        entry.video_hw = 42;
        assert_eq!(entry.video_hw_name(), "svga");
        entry.video_hw = 4;
        assert_eq!(entry.video_hw_name(), "vga");
    }

    #[test]
    fn test_sanitize() {
        let mut entry = LibraryEntry::named("Sam | Max");
        entry.description = "line one\nline two".to_string();
        entry.sanitize();
        assert_eq!(entry.name, "Sam   Max");
        assert_eq!(entry.description, "line one line two");
    }
}
