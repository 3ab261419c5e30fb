//! One-time import of the pre-0.2 `games_db.txt`.
//!
//! The old launcher kept everything in one file:
//!
//! ```text
//! C:\DREAMM\dreamm.exe
//! Name|Exe|Setup|Machine|Unused|RAM|AudioMask|VidIdx|W|H|D|MIPS|Iso
//! ```
//!
//! Records are mapped into [`LibraryEntry`], appended to the current library
//! unless an entry with the same executable already exists, and saved. The
//! legacy file is removed only after that save succeeded, so an interrupted
//! migration simply runs again and deduplication keeps it from importing
//! anything twice.

use std::path::Path;

use super::entry::{AudioFlags, LibraryEntry, Machine, Platform, Status, DEFAULT_VIDEO_HW};
use super::record::Fields;
use super::Library;
use crate::error::StoreError;
use crate::paths::StorePaths;
use crate::settings::Settings;

/// Legacy records shorter than this are skipped.
pub const LEGACY_MIN_FIELDS: usize = 12;

/// RAM above this (in KB) marks a legacy record as a Windows title.
const WINDOWS_RAM_THRESHOLD_KB: u32 = 16384;
/// Colour depth above this marks a legacy record as a Windows title.
const WINDOWS_DEPTH_THRESHOLD: u32 = 8;

/// Parsed content of a legacy database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyDatabase {
    /// Emulator path from the first line.
    pub emulator_path: Option<String>,
    pub entries: Vec<LibraryEntry>,
}

impl LegacyDatabase {
    pub fn parse(content: &str) -> Self {
        let mut db = LegacyDatabase::default();
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());

        db.emulator_path = lines.next().map(ToString::to_string);
        db.entries = lines.filter_map(parse_legacy_record).collect();
        db
    }
}

/// Map one legacy record into the current entry shape.
pub fn parse_legacy_record(line: &str) -> Option<LibraryEntry> {
    let fields = Fields::split(line);
    if fields.len() < LEGACY_MIN_FIELDS {
        return None;
    }

    let machine = match fields.number(3, "machine", 0i64) {
        1 => Machine::Tandy,
        _ => Machine::Pc,
    };
    let iso_path = fields
        .raw(12)
        .filter(|iso| *iso != "0" && iso.len() > 2)
        .unwrap_or_default()
        .to_string();

    let mut entry = LibraryEntry {
        name: fields.text(0),
        exe_path: fields.text(1),
        setup_path: fields.text(2),
        machine,
        ram_kb: fields.number(5, "ramKB", 640),
        audio: AudioFlags::from_mask(fields.number(6, "audioMask", 0)),
        video_hw: fields.number(7, "videoHw", DEFAULT_VIDEO_HW),
        width: fields.number(8, "width", 640),
        height: fields.number(9, "height", 480),
        depth: fields.number(10, "depth", 8),
        mips: fields.number(11, "mips", 0),
        iso_path,
        status: Status::Playable,
        ..Default::default()
    };
    if entry.video_hw >= super::entry::VIDEO_HARDWARE.len() {
        entry.video_hw = DEFAULT_VIDEO_HW;
    }
    entry.platform = resolve_platform(&entry.name, entry.ram_kb, entry.depth);
    Some(entry)
}

/// Guess whether a legacy record describes a Windows title.
pub fn resolve_platform(name: &str, ram_kb: u32, depth: u32) -> Platform {
    if ram_kb > WINDOWS_RAM_THRESHOLD_KB
        || depth > WINDOWS_DEPTH_THRESHOLD
        || name.contains("(win)")
        || name.contains("Windows")
    {
        Platform::Windows
    } else {
        Platform::Dos
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub imported: usize,
    pub skipped_duplicates: usize,
    /// Emulator path adopted into the settings, if any.
    pub emulator_path: Option<String>,
    /// Whether the legacy file was removed afterwards.
    pub legacy_removed: bool,
}

/// Append legacy entries whose executable is not in `library` yet. An empty
/// executable path is compared like any other.
/// Returns `(imported, skipped)`.
pub fn merge_into(library: &mut Library, entries: Vec<LibraryEntry>) -> (usize, usize) {
    let mut fresh: Vec<LibraryEntry> = Vec::new();
    let mut skipped = 0;
    for entry in entries {
        let duplicate = library
            .entries()
            .iter()
            .chain(fresh.iter())
            .any(|e| e.exe_path == entry.exe_path);
        if duplicate {
            skipped += 1;
        } else {
            fresh.push(entry);
        }
    }
    let imported = fresh.len();
    library.extend(fresh);
    (imported, skipped)
}

/// Run the legacy migration if `games_db.txt` exists.
///
/// Must run before the library is loaded for the session: it reads and
/// rewrites the primary database itself.
pub fn migrate_legacy(
    paths: &StorePaths,
    settings: &mut Settings,
) -> Result<Option<MigrationReport>, StoreError> {
    if !paths.legacy_database.exists() {
        return Ok(None);
    }
    tracing::info!("Legacy database found. Starting migration...");

    let bytes = std::fs::read(&paths.legacy_database)
        .map_err(|e| StoreError::read(&paths.legacy_database, e))?;
    let legacy = LegacyDatabase::parse(&String::from_utf8_lossy(&bytes));
    if legacy.emulator_path.is_none() {
        tracing::warn!(
            "Legacy database {} is empty, leaving it in place",
            paths.legacy_database.display()
        );
        return Ok(None);
    }

    let mut report = MigrationReport::default();

    if let Some(emulator) = legacy.emulator_path.as_deref() {
        if settings.emulator_path.is_empty() && Path::new(emulator).exists() {
            settings.emulator_path = emulator.to_string();
            settings.save()?;
            tracing::info!("Imported DREAMM path: {emulator}");
            report.emulator_path = Some(emulator.to_string());
        }
    }

    let mut library = Library::load(&paths.database)?;
    let (imported, skipped) = merge_into(&mut library, legacy.entries);
    report.imported = imported;
    report.skipped_duplicates = skipped;
    library.save(&paths.database)?;
    tracing::info!("Migration complete. Imported {imported} games ({skipped} already present).");

    match std::fs::remove_file(&paths.legacy_database) {
        Ok(()) => {
            report.legacy_removed = true;
            tracing::info!(
                "Legacy file '{}' deleted.",
                paths.legacy_database.display()
            );
        }
        Err(e) => {
            tracing::warn!("Could not delete legacy file: {e}");
        }
    }

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "\
C:\\DREAMM\\dreamm.exe\r\n\
Doom|C:\\G\\DOOM.EXE|C:\\G\\SETUP.EXE|0|0|640|8|4|640|480|8|0|0\r\n\
\r\n\
Loom (Tandy)|C:\\LOOM\\LOOM.EXE||1|0|640|0|2|320|200|4|10\r\n\
Rebel Assault II (win)|C:\\RA2\\REBEL2.EXE||0|0|640|0|5|640|480|8|0|C:\\ISO\\RA2.CUE\r\n\
Too|Short|record\r\n";

    fn write_legacy(dir: &Path, content: &str) -> StorePaths {
        let paths = StorePaths::in_dir(dir);
        std::fs::write(&paths.legacy_database, content).unwrap();
        paths
    }

    fn empty_settings(paths: &StorePaths) -> Settings {
        Settings::at(&paths.settings)
    }

    #[test]
    fn test_parse_legacy_database() {
        let db = LegacyDatabase::parse(LEGACY);
        assert_eq!(db.emulator_path.as_deref(), Some("C:\\DREAMM\\dreamm.exe"));
        assert_eq!(db.entries.len(), 3);

        let doom = &db.entries[0];
        assert_eq!(doom.name, "Doom");
        assert_eq!(doom.exe_path, "C:\\G\\DOOM.EXE");
        assert_eq!(doom.setup_path, "C:\\G\\SETUP.EXE");
        assert_eq!(doom.audio.enabled_names(), vec!["sb16"]);
        assert_eq!(doom.video_hw, 4);
        assert_eq!(doom.mips, 0);
        assert!(doom.iso_path.is_empty());
        assert_eq!(doom.platform, Platform::Dos);
        assert_eq!(doom.status, Status::Playable);

        let loom = &db.entries[1];
        assert_eq!(loom.machine, Machine::Tandy);
        assert_eq!(loom.mips, 10);

        let rebel = &db.entries[2];
        assert_eq!(rebel.iso_path, "C:\\ISO\\RA2.CUE");
        assert_eq!(rebel.platform, Platform::Windows);
    }

    #[test]
    fn test_legacy_field_defaults() {
        let entry = parse_legacy_record("X|C:\\X.EXE||?|0|?|?|?|?|?|?|?").unwrap();
        assert_eq!(entry.machine, Machine::Pc);
        assert_eq!(entry.ram_kb, 640);
        assert_eq!(entry.audio, AudioFlags::none());
        assert_eq!(entry.video_hw, 5);
        assert_eq!((entry.width, entry.height, entry.depth), (640, 480, 8));
        assert_eq!(entry.mips, 0);
    }

    #[test]
    fn test_resolve_platform() {
        assert_eq!(resolve_platform("Doom", 640, 8), Platform::Dos);
        assert_eq!(resolve_platform("Doom", 16384, 8), Platform::Dos);
        assert_eq!(resolve_platform("Doom", 16385, 8), Platform::Windows);
        assert_eq!(resolve_platform("Doom", 640, 16), Platform::Windows);
        assert_eq!(resolve_platform("Grim (win)", 640, 8), Platform::Windows);
        assert_eq!(resolve_platform("Windows Entertainment Pack", 640, 8), Platform::Windows);
        assert_eq!(resolve_platform("windows lowercase", 640, 8), Platform::Dos);
    }

    #[test]
    fn test_migrate_imports_and_removes_legacy_file() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_legacy(tmp.path(), LEGACY);
        let mut settings = empty_settings(&paths);

        let report = migrate_legacy(&paths, &mut settings).unwrap().unwrap();
        assert_eq!(report.imported, 3);
        assert!(report.legacy_removed);
        assert!(!paths.legacy_database.exists());
        // The emulator path does not exist on this machine, so it is not adopted.
        assert_eq!(report.emulator_path, None);
        assert!(settings.emulator_path.is_empty());

        let library = Library::load(&paths.database).unwrap();
        let names: Vec<&str> = library.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Doom", "Loom (Tandy)", "Rebel Assault II (win)"]);
    }

    #[test]
    fn test_migrate_adopts_existing_emulator_path() {
        let tmp = tempfile::tempdir().unwrap();
        let emulator = tmp.path().join("dreamm");
        std::fs::write(&emulator, "").unwrap();
        let content = format!("{}\nDoom|C:\\G\\DOOM.EXE||0|0|640|8|4|640|480|8|0\n", emulator.display());
        let paths = write_legacy(tmp.path(), &content);
        let mut settings = empty_settings(&paths);

        let report = migrate_legacy(&paths, &mut settings).unwrap().unwrap();
        assert_eq!(report.emulator_path, Some(emulator.display().to_string()));
        assert_eq!(settings.emulator_path, emulator.display().to_string());

        let reloaded = Settings::load_from(&paths.settings).unwrap();
        assert_eq!(reloaded.emulator_path, emulator.display().to_string());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_legacy(tmp.path(), LEGACY);
        let mut settings = empty_settings(&paths);
        migrate_legacy(&paths, &mut settings).unwrap();

        // Simulate a crash before the legacy file was deleted.
        std::fs::write(&paths.legacy_database, LEGACY).unwrap();
        let report = migrate_legacy(&paths, &mut settings).unwrap().unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped_duplicates, 3);

        let library = Library::load(&paths.database).unwrap();
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn test_rerun_does_not_duplicate_entry_without_exe() {
        let tmp = tempfile::tempdir().unwrap();
        let content = "C:\\DREAMM\\dreamm.exe\nNoExe||C:\\X\\SETUP.EXE|0|0|640|8|4|640|480|8|0\n";
        let paths = write_legacy(tmp.path(), content);
        let mut settings = empty_settings(&paths);
        let report = migrate_legacy(&paths, &mut settings).unwrap().unwrap();
        assert_eq!(report.imported, 1);

        std::fs::write(&paths.legacy_database, content).unwrap();
        let report = migrate_legacy(&paths, &mut settings).unwrap().unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped_duplicates, 1);

        let library = Library::load(&paths.database).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.entries()[0].setup_path, "C:\\X\\SETUP.EXE");
    }

    #[test]
    fn test_duplicates_within_legacy_file() {
        let mut library = Library::default();
        let entries = vec![
            LibraryEntry {
                exe_path: "C:\\A.EXE".to_string(),
                ..LibraryEntry::named("A")
            },
            LibraryEntry {
                exe_path: "C:\\A.EXE".to_string(),
                ..LibraryEntry::named("A again")
            },
        ];
        assert_eq!(merge_into(&mut library, entries), (1, 1));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_no_legacy_file() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::in_dir(tmp.path());
        let mut settings = empty_settings(&paths);
        assert_eq!(migrate_legacy(&paths, &mut settings).unwrap(), None);
        assert!(!paths.database.exists());
    }
}
