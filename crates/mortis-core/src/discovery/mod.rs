//! Discovery of titles installed by DREAMM itself.
//!
//! DREAMM keeps each installed product under
//! `<install root>/<folder id>/<version id>/`. Every version directory not
//! yet referenced by an entry's install path becomes a new native entry.

pub mod catalog;

use std::path::Path;

use walkdir::WalkDir;

use crate::library::{Library, LibraryEntry, Platform, Status};

pub const DISCOVERED_DESCRIPTION: &str = "Auto-detected DREAMM installation.";

const LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("-de", " - DE"),
    ("-fr", " - FR"),
    ("-es", " - ES"),
    ("-it", " - IT"),
    ("-jp", " - JP"),
    ("-pt", " - PT"),
    ("-br", " - BR"),
    ("-kr", " - KR"),
    ("-zh", " - ZH"),
    ("-tw", " - TW"),
];

/// Display name and platform for an installed version.
///
/// The name is the catalog title (or the raw folder ID) followed by a
/// platform qualifier, a demo marker and a language suffix, each derived
/// from tokens in the version ID.
pub fn resolve_name(folder_id: &str, version_id: &str) -> (String, Platform) {
    let mut name = catalog::title_for(folder_id)
        .unwrap_or(folder_id)
        .to_string();
    let version = version_id.to_lowercase();

    let platform = if version.contains("win") {
        name.push_str(" (Windows)");
        Platform::Windows
    } else if version.contains("fmtowns") || version.contains("fm-towns") {
        name.push_str(" (FM Towns)");
        Platform::NativeNoEmulation
    } else if version.contains("mac") {
        name.push_str(" (Mac)");
        Platform::NativeNoEmulation
    } else if version.contains("dos") {
        name.push_str(" (DOS)");
        Platform::Dos
    } else {
        Platform::Dos
    };

    if version.contains("demo") {
        name.push_str(" (Demo)");
    }
    if let Some((_, suffix)) = LANGUAGE_TAGS
        .iter()
        .find(|(tag, _)| version.contains(tag))
    {
        name.push_str(suffix);
    }

    (name, platform)
}

/// Entries for every installed version under `root` that `library` does not
/// reference yet. A missing root yields nothing.
pub fn find_new_installations(root: &Path, library: &Library) -> Vec<LibraryEntry> {
    if !root.is_dir() {
        tracing::debug!("DREAMM install root {} not found", root.display());
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() != 1
                || (e.file_type().is_dir() && !e.file_name().to_string_lossy().starts_with('~'))
        });

    let mut found: Vec<LibraryEntry> = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        if entry.depth() != 2 || !entry.file_type().is_dir() {
            continue;
        }
        let install_path = entry.path().to_string_lossy().into_owned();
        if library.contains_install_path(&install_path)
            || found.iter().any(|e| e.install_path == install_path)
        {
            continue;
        }

        let Some(folder_id) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        let version_id = entry.file_name().to_string_lossy();
        let (name, _) = resolve_name(&folder_id, &version_id);

        found.push(LibraryEntry {
            name,
            description: DISCOVERED_DESCRIPTION.to_string(),
            platform: Platform::NativeNoEmulation,
            status: Status::Playable,
            install_path,
            ..Default::default()
        });
    }
    found
}

/// Add every new installation under `root` to `library`. Returns how many
/// entries were added.
pub fn scan_root(root: &Path, library: &mut Library) -> usize {
    let found = find_new_installations(root, library);
    let added = found.len();
    if added > 0 {
        library.extend(found);
        tracing::info!("Scanned and added {added} new DREAMM games.");
    }
    added
}
