//! The engine ties the library, settings and file browser together.
//!
//! A front end constructs one [`Engine`] and routes every user action
//! through it. Every mutation is persisted before the call returns.

use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};

use anyhow::{Context, Result};

use crate::discovery;
use crate::launcher::command::{build_command, build_persistent_profile, EmulatorCommand};
use crate::launcher::{process, FsProbe, HostWindow, LaunchConfig, PathProbe};
use crate::library::legacy::migrate_legacy;
use crate::library::{Library, LibraryEntry, ListFilter, Platform};
use crate::paths::{dreamm_install_root, StorePaths};
use crate::scanner::{initial_browse_dir, DirectoryBrowser};
use crate::settings::Settings;

pub struct Engine {
    paths: StorePaths,
    install_root: PathBuf,
    settings: Settings,
    library: Library,
    browser: DirectoryBrowser,
}

impl Engine {
    /// Open the engine on `paths`, discovering from DREAMM's default
    /// install root.
    pub fn open(paths: StorePaths) -> Result<Self> {
        Self::open_with_install_root(paths, dreamm_install_root())
    }

    /// Startup sequence: settings, legacy migration, library, discovery.
    pub fn open_with_install_root(paths: StorePaths, install_root: PathBuf) -> Result<Self> {
        let mut settings = Settings::load_from(&paths.settings).context("Failed to load settings")?;

        if let Some(report) =
            migrate_legacy(&paths, &mut settings).context("Failed to migrate legacy database")?
        {
            tracing::debug!("Legacy migration: {report:?}");
        }

        let mut library = Library::load(&paths.database).context("Failed to load library")?;
        if let Some(name) = settings.last_selected.as_deref() {
            if !library.select(name) {
                tracing::debug!("Last selected entry {name:?} is gone");
            }
        }
        tracing::info!(
            "Loaded {} entries from {}",
            library.len(),
            paths.database.display()
        );

        let mut engine = Engine {
            paths,
            install_root,
            settings,
            library,
            browser: DirectoryBrowser::new(),
        };
        if engine.settings.has_emulator() {
            discovery::scan_root(&engine.install_root, &mut engine.library);
        }
        engine.save()?;
        Ok(engine)
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        self.library.entries()
    }

    pub fn filtered<'a>(
        &'a self,
        criteria: &'a ListFilter,
    ) -> impl Iterator<Item = &'a LibraryEntry> + 'a {
        self.library.filter(criteria)
    }

    pub fn entry(&self, name: &str) -> Option<&LibraryEntry> {
        self.library.get(name)
    }

    pub fn selected(&self) -> Option<&LibraryEntry> {
        self.library.selected()
    }

    /// Persist library and settings.
    pub fn save(&mut self) -> Result<()> {
        self.settings.last_selected = self.library.selected_name().map(ToString::to_string);
        self.library
            .save(&self.paths.database)
            .context("Failed to save library")?;
        self.settings.save().context("Failed to save settings")?;
        Ok(())
    }

    /// Add a placeholder entry, select it and return its name.
    pub fn add(&mut self) -> Result<String> {
        let name = self.library.add_placeholder().name.clone();
        self.save()?;
        Ok(name)
    }

    /// Apply `f` to the entry called `name`. Returns the (possibly renamed)
    /// entry's name, or `None` if there is no such entry.
    pub fn edit<F>(&mut self, name: &str, f: F) -> Result<Option<String>>
    where
        F: FnOnce(&mut LibraryEntry),
    {
        let Some(edited) = self.library.edit(name, f).map(|e| e.name.clone()) else {
            return Ok(None);
        };
        self.save()?;
        Ok(Some(edited))
    }

    /// Switch an entry between DOS and Windows, resetting RAM and audio.
    /// Returns `false` if the entry is missing or native.
    pub fn set_platform(&mut self, name: &str, platform: Platform) -> Result<bool> {
        let mut changed = false;
        self.library.edit(name, |e| changed = e.apply_platform_defaults(platform));
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let Some(removed) = self.library.remove(name) else {
            return Ok(false);
        };
        tracing::info!("Removed {}", removed.name);
        self.save()?;
        Ok(true)
    }

    pub fn select(&mut self, name: &str) -> Result<bool> {
        if !self.library.select(name) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Scan DREAMM's install root for new installations. Returns how many
    /// entries were added.
    pub fn discover(&mut self) -> Result<usize> {
        let added = discovery::scan_root(&self.install_root, &mut self.library);
        if added > 0 {
            self.save()?;
        }
        Ok(added)
    }

    pub fn build_command(&self, name: &str, run_setup: bool) -> Option<EmulatorCommand> {
        self.build_command_with(name, run_setup, &FsProbe)
    }

    pub fn build_command_with(
        &self,
        name: &str,
        run_setup: bool,
        probe: &dyn PathProbe,
    ) -> Option<EmulatorCommand> {
        let entry = self.library.get(name)?;
        build_command(&self.settings.emulator_path, entry, run_setup, probe)
    }

    fn launch_config(&self, command: &EmulatorCommand) -> Result<LaunchConfig> {
        let wrapper = self
            .settings
            .wrapper_args()
            .context("Invalid launch wrapper")?;
        Ok(LaunchConfig::from_command(command)
            .with_mouse_warp(self.settings.mouse_warp)
            .with_wrapper(wrapper))
    }

    /// Run an entry and wait for it to exit, hiding `window` meanwhile.
    ///
    /// Returns `Ok(None)` when no command can be built for the entry.
    pub fn launch(
        &mut self,
        name: &str,
        run_setup: bool,
        window: &mut dyn HostWindow,
    ) -> Result<Option<ExitStatus>> {
        let Some(command) = self.build_command(name, run_setup) else {
            tracing::warn!("Nothing to launch for {name:?}");
            return Ok(None);
        };
        tracing::info!("Launching: {command}");

        let config = self.launch_config(&command)?;
        self.save()?;
        let status = process::run_with_hidden_window(&config, window)
            .with_context(|| format!("Failed to launch {name}"))?;
        Ok(Some(status))
    }

    /// Have DREAMM create a `.dreamm` profile for the entry. Does not wait.
    pub fn make_profile(&self, name: &str) -> Result<Option<Child>> {
        let Some(entry) = self.library.get(name) else {
            return Ok(None);
        };
        let Some(command) =
            build_persistent_profile(&self.settings.emulator_path, entry, &FsProbe)
        else {
            tracing::warn!("Cannot create a DREAMM profile for {name:?}");
            return Ok(None);
        };
        tracing::info!("Creating DREAMM profile: {command}");

        let config = self.launch_config(&command)?;
        let child = process::spawn(&config)
            .with_context(|| format!("Failed to create a profile for {name}"))?;
        Ok(Some(child))
    }

    /// Change settings and persist them.
    pub fn update_settings<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings.launch_wrapper = self.settings.launch_wrapper.trim().to_string();
        self.settings.emulator_path = self.settings.emulator_path.trim_end().to_string();
        self.save()
    }

    /// Open the file browser for `target`. Returns the scan generation.
    pub fn browse(&mut self, target: &str, filters: &[String]) -> u64 {
        let start = initial_browse_dir(target, self.browser.last_path());
        self.browser.request(start, filters)
    }

    /// Navigate the file browser to `dir`.
    pub fn browse_dir(&mut self, dir: impl Into<PathBuf>, filters: &[String]) -> u64 {
        self.browser.request(dir, filters)
    }

    /// Non-blocking; returns `true` when a new listing was applied.
    pub fn poll_browser(&mut self) -> bool {
        self.browser.poll()
    }

    pub fn wait_browser(&mut self) -> bool {
        self.browser.wait()
    }

    pub fn browser(&self) -> &DirectoryBrowser {
        &self.browser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path) -> Engine {
        Engine::open_with_install_root(StorePaths::in_dir(dir), dir.join("install")).unwrap()
    }

    #[test]
    fn test_open_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());
        assert!(engine.entries().is_empty());
        assert!(engine.selected().is_none());
        assert!(tmp.path().join("games.db").exists());
        assert!(tmp.path().join("launcher_config.txt").exists());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = open(tmp.path());
        let name = engine.add().unwrap();
        let renamed = engine
            .edit(&name, |e| {
                e.name = "Sam & Max Hit the Road".to_string();
                e.exe_path = "C:\\SAMNMAX\\SAMNMAX.EXE".to_string();
            })
            .unwrap();
        assert_eq!(renamed.as_deref(), Some("Sam & Max Hit the Road"));
        engine.add().unwrap();
        engine.select("Sam & Max Hit the Road").unwrap();
        drop(engine);

        let engine = open(tmp.path());
        assert_eq!(engine.entries().len(), 2);
        assert_eq!(engine.selected().unwrap().exe_path, "C:\\SAMNMAX\\SAMNMAX.EXE");
    }

    #[test]
    fn test_set_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = open(tmp.path());
        let name = engine.add().unwrap();
        assert!(engine.set_platform(&name, Platform::Windows).unwrap());
        assert_eq!(engine.entry(&name).unwrap().ram_kb, 65536);
        assert!(!engine.set_platform("missing", Platform::Windows).unwrap());
    }

    #[test]
    fn test_discovery_needs_emulator_at_startup() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("install/lec-loom/loom-dos")).unwrap();

        let mut engine = open(tmp.path());
        assert!(engine.entries().is_empty());

        engine
            .update_settings(|s| s.emulator_path = "/opt/dreamm/dreamm  ".to_string())
            .unwrap();
        assert_eq!(engine.settings().emulator_path, "/opt/dreamm/dreamm");
        drop(engine);

        let mut engine = open(tmp.path());
        assert_eq!(engine.entries().len(), 1);
        assert_eq!(engine.entries()[0].name, "Loom (DOS)");
        assert_eq!(engine.discover().unwrap(), 0);
    }

    #[test]
    fn test_launch_without_command() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = open(tmp.path());
        let name = engine.add().unwrap();
        let mut window = crate::launcher::NoWindow;
        assert!(engine.launch(&name, false, &mut window).unwrap().is_none());
        assert!(engine.make_profile(&name).unwrap().is_none());
        assert!(engine.launch("missing", false, &mut window).unwrap().is_none());
    }

    #[test]
    fn test_browse_starts_at_target_parent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("GAME.EXE"), "").unwrap();
        let mut engine = open(tmp.path());
        let target = tmp.path().join("GAME.EXE").display().to_string();
        engine.browse(&target, &[".exe".to_string()]);
        assert!(engine.wait_browser());
        assert_eq!(engine.browser().current_path(), Some(tmp.path()));
        let names: Vec<&str> = engine
            .browser()
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["GAME.EXE"]);
    }
}
