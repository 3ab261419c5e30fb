//! Path handling for library entries and the launcher's data files.
//!
//! Entry paths are stored as plain strings because they usually point at
//! Windows locations (`C:\GAMES\DOOM\DOOM.EXE`) that the emulator, not this
//! process, interprets. The helpers here therefore split on both `\` and `/`
//! instead of relying on the host's `Path` rules.
//!
//! This module also resolves where the launcher keeps its own files and where
//! DREAMM installs its native titles.

use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// File name of the primary database.
pub const DATABASE_FILE: &str = "games.db";
/// File name of the settings file.
pub const SETTINGS_FILE: &str = "launcher_config.txt";
/// File name of the pre-0.2 combined database, read once for migration.
pub const LEGACY_DATABASE_FILE: &str = "games_db.txt";

/// Locations of every file the launcher reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub database: PathBuf,
    pub settings: PathBuf,
    pub legacy_database: PathBuf,
}

impl StorePaths {
    /// All files inside a single directory.
    pub fn in_dir(dir: &Path) -> Self {
        StorePaths {
            database: dir.join(DATABASE_FILE),
            settings: dir.join(SETTINGS_FILE),
            legacy_database: dir.join(LEGACY_DATABASE_FILE),
        }
    }

    /// Default location (`~/.local/share/MortisLauncher/` on Linux,
    /// `%APPDATA%\MortisLauncher\` on Windows).
    pub fn default_location() -> Self {
        Self::in_dir(&data_dir())
    }
}

/// The launcher's data directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("MortisLauncher")
}

/// Root of DREAMM's own installation tree (`<root>/<product>/<version>/`).
///
/// DREAMM keeps it under the roaming application-data folder, which `dirs`
/// exposes as the config directory.
pub fn dreamm_install_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("Aaron Giles")
        .join("DREAMM")
        .join("install")
}

/// Case-insensitive sort key for display names (NFC normalized, lowercase).
pub fn sort_key(name: &str) -> String {
    name.nfc().collect::<String>().to_lowercase()
}

/// Get the parent directory of a path (handles both / and \).
///
/// A parent that is a filesystem or drive root keeps its separator:
/// `C:\DOOM.EXE` -> `C:\`, `/doom` -> `/`.
pub fn parent_path(path: &str) -> Option<&str> {
    let idx = path.rfind(['\\', '/'])?;
    let head = &path[..idx];
    if head.is_empty() || is_drive_prefix(head) {
        Some(&path[..idx + 1])
    } else {
        Some(head)
    }
}

fn is_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Get the filename from a path (handles both / and \).
pub fn file_name(path: &str) -> &str {
    path.rfind(['\\', '/'])
        .map(|idx| &path[idx + 1..])
        .unwrap_or(path)
}

/// Filename without its last extension: `DOOM.EXE` -> `DOOM`.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Get file extension (without the dot, original case).
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Create parent directories for a path if they don't exist
pub fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Drive roots the file browser can jump to.
#[cfg(windows)]
pub fn available_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.exists())
        .collect()
}

/// Drive roots the file browser can jump to.
#[cfg(not(windows))]
pub fn available_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}
