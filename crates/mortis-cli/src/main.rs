//! Mortis CLI - manage a DREAMM game library from the terminal
//!
//! # Commands
//!
//! - `mortis list` - Show the library (optionally filtered)
//! - `mortis add` / `edit` / `remove` - Maintain entries
//! - `mortis discover` - Import titles DREAMM installed itself
//! - `mortis command <name>` - Print the DREAMM command line for an entry
//! - `mortis launch <name>` - Run an entry and wait for it
//! - `mortis make-profile <name>` - Have DREAMM write a `.dreamm` profile
//! - `mortis browse [path]` - List a directory the way the file picker does
//! - `mortis settings` - Show or change launcher settings
//!
//! Data lives in the platform data directory (`~/.local/share/MortisLauncher`
//! on Linux) unless `--data-dir` is given.

mod edit;
mod logging;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mortis_core::launcher::NoWindow;
use mortis_core::library::entry::{
    COLOR_DEPTHS, MIPS_PRESETS, RAM_PRESETS_KB, RESOLUTION_PRESETS,
};
use mortis_core::library::{PlatformFilter, StatusFilter};
use mortis_core::paths::{available_roots, data_dir, dreamm_install_root};
use mortis_core::settings::THEMES;
use mortis_core::{Engine, LibraryEntry, ListFilter, StorePaths};
use serde_json::json;

use edit::{EditArgs, EntryChanges};

/// Mortis CLI - library manager for the DREAMM emulator
#[derive(Parser)]
#[command(name = "mortis")]
#[command(about = "Library manager for the DREAMM emulator")]
#[command(version)]
struct Cli {
    /// Directory holding games.db and launcher_config.txt
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// DREAMM install root to discover titles in
    #[arg(long, global = true)]
    install_root: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Also write logs to <data dir>/logs/mortis.log
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlatformFilterArg {
    All,
    Dos,
    Windows,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFilterArg {
    All,
    Playable,
    Unplayable,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the library
    List {
        /// Only names containing this text (case-sensitive)
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long, value_enum, default_value = "all")]
        platform: PlatformFilterArg,
        #[arg(long, value_enum, default_value = "all")]
        status: StatusFilterArg,
    },

    /// Show every field of one entry
    Show { name: String },

    /// Add a new entry and select it
    Add(EditArgs),

    /// Change fields of an entry
    Edit {
        name: String,
        #[command(flatten)]
        changes: EditArgs,
    },

    /// Delete an entry
    Remove { name: String },

    /// Select an entry (remembered across runs)
    Select { name: String },

    /// Scan DREAMM's install folder for new titles
    Discover,

    /// List a directory with the file browser's filtering and ordering
    Browse {
        /// File or directory to start from
        target: Option<String>,
        /// Extensions to show, e.g. --ext exe --ext com
        #[arg(long = "ext")]
        extensions: Vec<String>,
        /// Print the available filesystem roots instead
        #[arg(long)]
        roots: bool,
    },

    /// Print the DREAMM command line for an entry
    Command {
        name: String,
        /// Build the setup command instead
        #[arg(long)]
        setup: bool,
    },

    /// Run an entry and wait for DREAMM to exit
    Launch {
        name: String,
        /// Run the setup program instead
        #[arg(long)]
        setup: bool,
    },

    /// Have DREAMM write a .dreamm profile for an entry
    MakeProfile { name: String },

    /// Show the editor's preset values
    Presets,

    /// Show or change launcher settings
    Settings {
        /// Path to the DREAMM executable
        #[arg(long)]
        emulator: Option<String>,
        /// Set SDL_MOUSE_RELATIVE_MODE_WARP for DREAMM
        #[arg(long)]
        mouse_warp: Option<bool>,
        #[arg(long)]
        background: Option<bool>,
        /// Theme index (0 = seasonal)
        #[arg(long)]
        theme: Option<u32>,
        /// Command prefixed to every launch, e.g. "gamemoderun"
        #[arg(long)]
        wrapper: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(data_dir);
    let log_file = cli.log_file.then(|| logging::log_file_path(&data_dir));
    logging::init(log_file.as_deref())?;

    let install_root = cli
        .install_root
        .clone()
        .unwrap_or_else(dreamm_install_root);
    let mut engine = Engine::open_with_install_root(StorePaths::in_dir(&data_dir), install_root)
        .with_context(|| format!("Failed to open library in {}", data_dir.display()))?;

    run(&cli, &mut engine)
}

fn run(cli: &Cli, engine: &mut Engine) -> Result<()> {
    match &cli.command {
        Commands::List {
            filter,
            platform,
            status,
        } => {
            let criteria = ListFilter {
                name_contains: filter.clone(),
                platform: match platform {
                    PlatformFilterArg::All => PlatformFilter::All,
                    PlatformFilterArg::Dos => PlatformFilter::Dos,
                    PlatformFilterArg::Windows => PlatformFilter::Windows,
                },
                status: match status {
                    StatusFilterArg::All => StatusFilter::All,
                    StatusFilterArg::Playable => StatusFilter::Playable,
                    StatusFilterArg::Unplayable => StatusFilter::Unplayable,
                },
            };
            let entries: Vec<&LibraryEntry> = engine.filtered(&criteria).collect();
            let selected = engine.library().selected_name();
            if cli.json {
                print_json(&json!({ "selected": selected, "entries": entries }))?;
            } else {
                for entry in entries {
                    let marker = if Some(entry.name.as_str()) == selected { '*' } else { ' ' };
                    println!(
                        "{marker} {:<48} {:<14} {:?}",
                        entry.name,
                        entry.platform.label(),
                        entry.status
                    );
                }
            }
        }

        Commands::Show { name } => {
            let entry = find(engine, name)?;
            if cli.json {
                print_json(entry)?;
            } else {
                print_entry(entry);
            }
        }

        Commands::Add(args) => {
            let changes = EntryChanges::try_from(args.clone())?;
            let name = engine.add()?;
            let name = apply_changes(engine, &name, changes)?;
            report(cli, &format!("Added {name}"), &json!({ "added": name }))?;
        }

        Commands::Edit { name, changes } => {
            find(engine, name)?;
            let changes = EntryChanges::try_from(changes.clone())?;
            let name = apply_changes(engine, name, changes)?;
            report(cli, &format!("Updated {name}"), &json!({ "updated": name }))?;
        }

        Commands::Remove { name } => {
            if !engine.remove(name)? {
                bail!("No entry named {name:?}");
            }
            report(cli, &format!("Removed {name}"), &json!({ "removed": name }))?;
        }

        Commands::Select { name } => {
            if !engine.select(name)? {
                bail!("No entry named {name:?}");
            }
            report(cli, &format!("Selected {name}"), &json!({ "selected": name }))?;
        }

        Commands::Discover => {
            let added = engine.discover()?;
            report(
                cli,
                &format!(
                    "Found {added} new DREAMM installation(s) in {}",
                    engine.install_root().display()
                ),
                &json!({ "added": added }),
            )?;
        }

        Commands::Browse {
            target,
            extensions,
            roots,
        } => {
            if *roots {
                let roots = available_roots();
                if cli.json {
                    print_json(&roots)?;
                } else {
                    for root in roots {
                        println!("{}", root.display());
                    }
                }
                return Ok(());
            }
            engine.browse(target.as_deref().unwrap_or_default(), extensions);
            engine.wait_browser();
            let browser = engine.browser();
            if cli.json {
                print_json(&json!({
                    "path": browser.current_path(),
                    "entries": browser.entries(),
                }))?;
            } else {
                if let Some(path) = browser.current_path() {
                    println!("{}", path.display());
                }
                for entry in browser.entries() {
                    let slash = if entry.is_directory { "/" } else { "" };
                    println!("  {}{slash}", entry.name);
                }
            }
        }

        Commands::Command { name, setup } => {
            find(engine, name)?;
            let Some(command) = engine.build_command(name, *setup) else {
                bail!("Cannot build a command for {name:?} (is the emulator set and the program present?)");
            };
            if cli.json {
                print_json(&json!({
                    "command_line": command.to_string(),
                    "program": command.program,
                    "args": command.process_args(),
                }))?;
            } else {
                println!("{command}");
            }
        }

        Commands::Launch { name, setup } => {
            find(engine, name)?;
            let Some(status) = engine.launch(name, *setup, &mut NoWindow)? else {
                bail!("Nothing to launch for {name:?}");
            };
            report(
                cli,
                &format!("DREAMM exited with {status}"),
                &json!({ "exit_code": status.code() }),
            )?;
        }

        Commands::MakeProfile { name } => {
            find(engine, name)?;
            let Some(child) = engine.make_profile(name)? else {
                bail!("Cannot create a profile for {name:?} (an existing executable is required)");
            };
            report(
                cli,
                &format!("Started DREAMM (pid {}) to create the profile", child.id()),
                &json!({ "pid": child.id() }),
            )?;
        }

        Commands::Presets => {
            if cli.json {
                print_json(&json!({
                    "ram_kb": RAM_PRESETS_KB,
                    "mips": MIPS_PRESETS.iter().map(|p| json!({ "value": p.value, "label": p.label })).collect::<Vec<_>>(),
                    "resolutions": RESOLUTION_PRESETS.iter().map(|p| json!({
                        "width": p.width, "height": p.height, "depth": p.depth, "label": p.label,
                    })).collect::<Vec<_>>(),
                    "color_depths": COLOR_DEPTHS,
                }))?;
            } else {
                println!("RAM (KB): {:?}", RAM_PRESETS_KB);
                println!("MIPS:");
                for preset in MIPS_PRESETS {
                    println!("  {:>4}  {}", preset.value, preset.label);
                }
                println!("Resolutions:");
                for preset in RESOLUTION_PRESETS {
                    println!("  {}", preset.label);
                }
                println!("Colour depths: {:?}", COLOR_DEPTHS);
            }
        }

        Commands::Settings {
            emulator,
            mouse_warp,
            background,
            theme,
            wrapper,
        } => {
            if let Some(theme) = theme {
                if *theme as usize >= THEMES.len() {
                    bail!("Theme must be between 0 and {}", THEMES.len() - 1);
                }
            }
            if emulator.is_some()
                || mouse_warp.is_some()
                || background.is_some()
                || theme.is_some()
                || wrapper.is_some()
            {
                engine.update_settings(|s| {
                    if let Some(path) = emulator {
                        s.emulator_path = path.clone();
                    }
                    if let Some(warp) = mouse_warp {
                        s.mouse_warp = *warp;
                    }
                    if let Some(bg) = background {
                        s.background_enabled = *bg;
                    }
                    if let Some(theme) = theme {
                        s.theme_index = *theme;
                    }
                    if let Some(wrapper) = wrapper {
                        s.set_launch_wrapper(wrapper);
                    }
                })?;
            }

            let s = engine.settings();
            if cli.json {
                print_json(&json!({
                    "emulator_path": s.emulator_path,
                    "mouse_warp": s.mouse_warp,
                    "background_enabled": s.background_enabled,
                    "theme": s.theme_index,
                    "theme_name": s.theme_name(),
                    "launch_wrapper": s.launch_wrapper,
                    "last_selected": s.last_selected,
                    "settings_file": s.path(),
                }))?;
            } else {
                println!("Emulator:      {}", display_or_unset(&s.emulator_path));
                println!("Mouse warp:    {}", s.mouse_warp);
                println!("Background:    {}", s.background_enabled);
                println!("Theme:         {} ({})", s.theme_index, s.theme_name());
                println!("Launch wrapper: {}", display_or_unset(&s.launch_wrapper));
                println!("Settings file: {}", s.path().display());
            }
        }
    }
    Ok(())
}

fn find<'a>(engine: &'a Engine, name: &str) -> Result<&'a LibraryEntry> {
    engine
        .entry(name)
        .with_context(|| format!("No entry named {name:?}"))
}

/// Platform switch first, so explicit RAM/audio flags override its defaults.
fn apply_changes(engine: &mut Engine, name: &str, changes: EntryChanges) -> Result<String> {
    if let Some(platform) = changes.platform() {
        if !engine.set_platform(name, platform)? {
            bail!("{name:?} is a native DREAMM installation; its platform cannot be switched");
        }
    }
    engine
        .edit(name, |entry| changes.apply(entry))?
        .with_context(|| format!("No entry named {name:?}"))
}

fn report(cli: &Cli, text: &str, value: &serde_json::Value) -> Result<()> {
    if cli.json {
        print_json(value)
    } else {
        println!("{text}");
        Ok(())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn print_entry(entry: &LibraryEntry) {
    println!("Name:        {}", entry.name);
    if !entry.description.is_empty() {
        println!("Description: {}", entry.description);
    }
    println!("Platform:    {}", entry.platform.label());
    println!("Status:      {:?}", entry.status);
    for (label, value) in [
        ("Executable", &entry.exe_path),
        ("Setup", &entry.setup_path),
        ("Install", &entry.install_path),
        ("CD image", &entry.iso_path),
        ("Root path", &entry.root_path_override),
    ] {
        if !value.is_empty() {
            println!("{:<12} {value}", format!("{label}:"));
        }
    }
    if entry.is_native() {
        return;
    }
    println!("Machine:     {}", entry.machine.property_value());
    println!("RAM:         {} KB", entry.ram_kb);
    if entry.mips <= 0 {
        println!("MIPS:        unlimited");
    } else {
        println!("MIPS:        {}", entry.mips);
    }
    println!("Audio:       {}", entry.audio.enabled_names().join("+"));
    println!("Video:       {}", entry.video_hw_name());
    println!(
        "Resolution:  {}x{}x{}",
        entry.width, entry.height, entry.depth
    );
}
