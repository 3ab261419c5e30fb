//! Launcher settings stored in `launcher_config.txt`.
//!
//! ```text
//! 1|0|2                      background|mouse-warp|theme
//! C:\DREAMM\dreamm.exe       emulator
//! gamemoderun                launch wrapper (optional)
//! Day of the Tentacle        last selected entry (optional)
//! ```
//!
//! Older files carried the emulator path as a fourth field of line 1; that
//! form is still read.

use std::path::{Path, PathBuf};

use crate::error::{LaunchError, StoreError};
use crate::paths::ensure_parent_dirs;

/// Number of selectable colour themes. Out-of-range indices reset to 0.
pub const THEME_COUNT: u32 = 6;

/// Theme names, indexed by [`Settings::theme_index`].
pub const THEMES: [&str; THEME_COUNT as usize] = [
    "Auto (Seasonal)",
    "Default Dark",
    "Valentine",
    "Shamrock",
    "Halloween",
    "Christmas",
];

/// Persisted launcher preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub background_enabled: bool,
    /// Export `SDL_MOUSE_RELATIVE_MODE_WARP=1` to the emulator.
    pub mouse_warp: bool,
    pub theme_index: u32,
    /// Path of the DREAMM executable. Empty when unconfigured.
    pub emulator_path: String,
    /// Command prefixed to every launch (e.g. "gamemoderun").
    pub launch_wrapper: String,
    pub last_selected: Option<String>,
    path: PathBuf,
}

impl Settings {
    /// Default settings that will be saved to `path`.
    pub fn at(path: &Path) -> Self {
        Settings {
            background_enabled: true,
            mouse_warp: false,
            theme_index: 0,
            emulator_path: String::new(),
            launch_wrapper: String::new(),
            last_selected: None,
            path: path.to_path_buf(),
        }
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Self::parse(path, &String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::at(path)),
            Err(e) => Err(StoreError::read(path, e)),
        }
    }

    fn parse(path: &Path, content: &str) -> Self {
        let mut settings = Self::at(path);
        let mut lines = content.lines();

        if let Some(first) = lines.next() {
            let parts: Vec<&str> = first.split('|').collect();
            if parts.len() >= 3 {
                settings.background_enabled = parts[0] == "1";
                settings.mouse_warp = parts[1] == "1";
                settings.theme_index = parts[2].trim().parse().unwrap_or(0);
                if settings.theme_index >= THEME_COUNT {
                    settings.theme_index = 0;
                }
            }
            if let Some(emulator) = parts.get(3) {
                settings.emulator_path = emulator.trim_end().to_string();
            }
        }

        let second = lines.next().map(str::trim_end).unwrap_or_default();
        if settings.emulator_path.is_empty() {
            settings.emulator_path = second.to_string();
        }
        settings.launch_wrapper = lines.next().map(str::trim).unwrap_or_default().to_string();
        settings.last_selected = lines
            .next()
            .map(str::trim_end)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);
        settings
    }

    pub fn to_file_string(&self) -> String {
        let flag = |b: bool| if b { "1" } else { "0" };
        let single_line = |s: &str| s.replace(['\r', '\n'], " ");
        format!(
            "{}|{}|{}\n{}\n{}\n{}\n",
            flag(self.background_enabled),
            flag(self.mouse_warp),
            self.theme_index,
            single_line(&self.emulator_path),
            single_line(&self.launch_wrapper),
            single_line(self.last_selected.as_deref().unwrap_or_default()),
        )
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        ensure_parent_dirs(&self.path).map_err(|e| StoreError::write(&self.path, e))?;
        std::fs::write(&self.path, self.to_file_string())
            .map_err(|e| StoreError::write(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_emulator(&self) -> bool {
        !self.emulator_path.is_empty()
    }

    pub fn theme_name(&self) -> &'static str {
        THEMES
            .get(self.theme_index as usize)
            .copied()
            .unwrap_or(THEMES[0])
    }

    /// Set the launch wrapper command string.
    pub fn set_launch_wrapper(&mut self, wrapper: &str) {
        self.launch_wrapper = wrapper.trim().to_string();
    }

    /// Split the launch wrapper into program and arguments.
    pub fn wrapper_args(&self) -> Result<Vec<String>, LaunchError> {
        if self.launch_wrapper.is_empty() {
            return Ok(Vec::new());
        }
        shell_words::split(&self.launch_wrapper).map_err(|e| LaunchError::Wrapper {
            wrapper: self.launch_wrapper.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Settings {
        Settings::parse(Path::new("/tmp/launcher_config.txt"), content)
    }

    #[test]
    fn test_load_default() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&tmp.path().join("launcher_config.txt")).unwrap();
        assert!(settings.background_enabled);
        assert!(!settings.mouse_warp);
        assert_eq!(settings.theme_index, 0);
        assert!(!settings.has_emulator());
        assert!(settings.wrapper_args().unwrap().is_empty());
    }

    #[test]
    fn test_two_line_format() {
        let settings = parse("0|1|4\r\nC:\\DREAMM\\dreamm.exe  \r\n");
        assert!(!settings.background_enabled);
        assert!(settings.mouse_warp);
        assert_eq!(settings.theme_index, 4);
        assert_eq!(settings.theme_name(), "Halloween");
        assert_eq!(settings.emulator_path, "C:\\DREAMM\\dreamm.exe");
        assert_eq!(settings.last_selected, None);
    }

    #[test]
    fn test_emulator_on_first_line() {
        let settings = parse("1|1|5|C:\\DREAMM\\dreamm.exe\n");
        assert_eq!(settings.theme_index, 5);
        assert_eq!(settings.emulator_path, "C:\\DREAMM\\dreamm.exe");
    }

    #[test]
    fn test_bad_theme_resets() {
        assert_eq!(parse("1|0|abc\n").theme_index, 0);
        assert_eq!(parse("1|0|17\n").theme_index, 0);
    }

    #[test]
    fn test_short_first_line_keeps_defaults() {
        let settings = parse("0|1\n/usr/bin/dreamm\n");
        assert!(settings.background_enabled);
        assert!(!settings.mouse_warp);
        assert_eq!(settings.emulator_path, "/usr/bin/dreamm");
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cfg").join("launcher_config.txt");

        let mut settings = Settings::at(&path);
        settings.mouse_warp = true;
        settings.theme_index = 2;
        settings.emulator_path = "/opt/dreamm/dreamm".to_string();
        settings.set_launch_wrapper("  gamemoderun  ");
        settings.last_selected = Some("Full Throttle".to_string());
        settings.save().unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.launch_wrapper, "gamemoderun");
    }

    #[test]
    fn test_wrapper_args() {
        let mut settings = parse("");
        settings.set_launch_wrapper("mangohud gamescope -f --");
        assert_eq!(
            settings.wrapper_args().unwrap(),
            vec!["mangohud", "gamescope", "-f", "--"]
        );

        settings.set_launch_wrapper("env 'A B=1' run");
        assert_eq!(settings.wrapper_args().unwrap(), vec!["env", "A B=1", "run"]);

        settings.set_launch_wrapper("unterminated 'quote");
        assert!(matches!(
            settings.wrapper_args(),
            Err(LaunchError::Wrapper { .. })
        ));
    }
}
