//! End-to-end engine lifecycle against a scratch data directory.

use std::path::Path;

use mortis_core::launcher::{HostWindow, NoWindow};
use mortis_core::library::{ListFilter, PlatformFilter};
use mortis_core::{Engine, Platform, Status, StorePaths};

const LEGACY: &str = "\
/nonexistent/dreamm\n\
Doom|DOOMPATH|DOOMSETUP|0|0|640|8|4|640|480|8|0|0\n\
Grim Fandango (win)|C:\\GRIM\\GRIMFANDANGO.EXE||0|0|65536|32|5|640|480|16|0|C:\\ISO\\GRIM.ISO\n";

fn open(dir: &Path) -> Engine {
    Engine::open_with_install_root(StorePaths::in_dir(dir), dir.join("install")).unwrap()
}

#[test]
fn test_legacy_migration_on_first_start() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("games_db.txt"), LEGACY).unwrap();

    let engine = open(tmp.path());
    assert!(!tmp.path().join("games_db.txt").exists());
    assert_eq!(engine.entries().len(), 2);

    let grim = engine.entry("Grim Fandango (win)").unwrap();
    assert_eq!(grim.platform, Platform::Windows);
    assert_eq!(grim.status, Status::Playable);
    assert_eq!(grim.iso_path, "C:\\ISO\\GRIM.ISO");

    let windows = ListFilter {
        platform: PlatformFilter::Windows,
        ..Default::default()
    };
    assert_eq!(engine.filtered(&windows).count(), 1);
    drop(engine);

    // A second start sees no legacy file and keeps the imported entries.
    let engine = open(tmp.path());
    assert_eq!(engine.entries().len(), 2);
}

#[test]
fn test_v1_database_upgrades_on_save() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("games.db"),
        "Loom|0|1|C:\\LOOM\\LOOM.EXE||||||0|640|Classic\n",
    )
    .unwrap();

    let engine = open(tmp.path());
    let loom = engine.entry("Loom").unwrap();
    assert_eq!(loom.description, "Classic");
    assert_eq!(loom.mips, 60);
    drop(engine);

    let saved = std::fs::read_to_string(tmp.path().join("games.db")).unwrap();
    assert_eq!(saved.lines().next().unwrap().split('|').count(), 20);
}

#[cfg(unix)]
#[derive(Default)]
struct CountingWindow {
    hidden: usize,
    restored: usize,
}

#[cfg(unix)]
impl HostWindow for CountingWindow {
    fn hide(&mut self) {
        self.hidden += 1;
    }
    fn restore(&mut self) {
        self.restored += 1;
    }
}

/// Write a fake emulator that records its arguments and environment.
#[cfg(unix)]
fn fake_emulator(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("dreamm");
    let log = dir.join("dreamm.log");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\" >> '{log}'; done\necho \"warp=$SDL_MOUSE_RELATIVE_MODE_WARP\" >> '{log}'\nexit 7\n",
            log = log.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn test_discover_and_launch_native_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let install = tmp.path().join("install").join("lec-dott").join("dott-dos-cd");
    std::fs::create_dir_all(&install).unwrap();
    let emulator = fake_emulator(tmp.path());

    let mut engine = open(tmp.path());
    engine
        .update_settings(|s| {
            s.emulator_path = emulator.display().to_string();
            s.mouse_warp = true;
        })
        .unwrap();
    assert_eq!(engine.discover().unwrap(), 1);

    let name = "Day of the Tentacle (DOS)";
    engine.edit(name, |e| e.force_maximized = true).unwrap();
    let command = engine.build_command(name, false).unwrap();
    assert_eq!(
        command.to_string(),
        format!(
            "\"{}\" -run \"{}\" -maximized",
            emulator.display(),
            install.display()
        )
    );

    let mut window = CountingWindow::default();
    let status = engine.launch(name, false, &mut window).unwrap().unwrap();
    assert_eq!(status.code(), Some(7));
    assert_eq!((window.hidden, window.restored), (1, 1));

    let log = std::fs::read_to_string(tmp.path().join("dreamm.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(
        lines,
        vec![
            "-run",
            install.to_str().unwrap(),
            "-maximized",
            "warp=1"
        ]
    );

    // Setup mode needs a setup path.
    assert!(engine.launch(name, true, &mut NoWindow).unwrap().is_none());
}
