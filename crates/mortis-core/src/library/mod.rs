//! The persisted library of managed installations.
//!
//! [`Library`] owns the entry list for the lifetime of the application. The
//! list is kept sorted by display name at all times and the selection is
//! tracked by name, so it survives every insert, delete and re-sort.

pub mod entry;
pub mod legacy;
pub mod record;

use std::path::Path;

use crate::error::StoreError;
use crate::paths::{ensure_parent_dirs, sort_key};

pub use entry::{AudioFlags, LibraryEntry, Machine, Platform, Status, WindowMode};
pub use record::{format_record, parse_or, parse_record, SchemaVersion};

/// Platform criterion of a [`ListFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Dos,
    Windows,
}

impl PlatformFilter {
    fn matches(self, platform: Platform) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Dos => platform == Platform::Dos,
            PlatformFilter::Windows => platform == Platform::Windows,
        }
    }
}

/// Status criterion of a [`ListFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Unplayable,
    Playable,
}

impl StatusFilter {
    fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Unplayable => status == Status::Unplayable,
            StatusFilter::Playable => status == Status::Playable,
        }
    }
}

/// View criteria for the entry list. Filtering never changes the library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-sensitive substring of the name. Empty matches everything.
    pub name_contains: String,
    pub platform: PlatformFilter,
    pub status: StatusFilter,
}

impl ListFilter {
    pub fn matches(&self, entry: &LibraryEntry) -> bool {
        entry.name.contains(self.name_contains.as_str())
            && self.platform.matches(entry.platform)
            && self.status.matches(entry.status)
    }
}

/// Sorted list of entries plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: Vec<LibraryEntry>,
    selected: Option<String>,
}

impl Library {
    /// Build a library from arbitrary entries. Sorts them.
    pub fn from_entries(entries: Vec<LibraryEntry>) -> Self {
        let mut library = Library {
            entries,
            selected: None,
        };
        library.sort();
        library
    }

    /// Parse the content of a database file. Malformed records are skipped.
    pub fn parse(content: &str) -> Self {
        let mut dropped = 0usize;
        let entries = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let entry = parse_record(line.trim_end_matches('\r'));
                if entry.is_none() {
                    dropped += 1;
                }
                entry
            })
            .collect();
        if dropped > 0 {
            tracing::warn!("Skipped {dropped} malformed library record(s)");
        }
        Self::from_entries(entries)
    }

    /// Load the library from `path`. A missing file is an empty library.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let library = Self::parse(&String::from_utf8_lossy(&bytes));
                tracing::debug!("Loaded {} entries from {}", library.len(), path.display());
                Ok(library)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::read(path, e)),
        }
    }

    /// Serialize every entry, one record per line.
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let mut entry = entry.clone();
            entry.sanitize();
            out.push_str(&format_record(&entry));
            out.push('\n');
        }
        out
    }

    /// Write the library to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        ensure_parent_dirs(path).map_err(|e| StoreError::write(path, e))?;
        std::fs::write(path, self.to_file_string()).map_err(|e| StoreError::write(path, e))
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with exactly this name.
    pub fn get(&self, name: &str) -> Option<&LibraryEntry> {
        self.position(name).map(|idx| &self.entries[idx])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Stable case-insensitive sort by name, then re-resolve the selection.
    pub fn sort(&mut self) {
        self.entries.sort_by_cached_key(|e| sort_key(&e.name));
        if let Some(name) = &self.selected {
            if self.position(name).is_none() {
                tracing::debug!("Selected entry {name:?} no longer exists");
                self.selected = None;
            }
        }
    }

    /// Append entries and re-sort once.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = LibraryEntry>) {
        self.entries.extend(entries);
        self.sort();
    }

    pub fn push(&mut self, entry: LibraryEntry) {
        self.extend(std::iter::once(entry));
    }

    /// Add a placeholder entry and select it. The name is made unique by
    /// appending a counter when "New Game" is already taken.
    pub fn add_placeholder(&mut self) -> &LibraryEntry {
        let mut entry = LibraryEntry::placeholder();
        let mut counter = 2;
        while self.get(&entry.name).is_some() {
            entry.name = format!("{} {counter}", entry::PLACEHOLDER_NAME);
            counter += 1;
        }
        let name = entry.name.clone();
        self.push(entry);
        self.selected = Some(name.clone());
        let idx = self.position(&name).unwrap_or(0);
        &self.entries[idx]
    }

    /// Remove the first entry with this name. Clears the selection if it
    /// pointed there and no other entry carries the name.
    pub fn remove(&mut self, name: &str) -> Option<LibraryEntry> {
        let idx = self.position(name)?;
        let removed = self.entries.remove(idx);
        self.sort();
        Some(removed)
    }

    /// Mutate the first entry with this name in place, then re-sort. A
    /// selection on that entry follows a rename.
    pub fn edit<F>(&mut self, name: &str, f: F) -> Option<&LibraryEntry>
    where
        F: FnOnce(&mut LibraryEntry),
    {
        let idx = self.position(name)?;
        let entry = &mut self.entries[idx];
        f(entry);
        entry.sanitize();
        if entry.name.trim().is_empty() {
            entry.name = name.to_string();
        }
        let new_name = entry.name.clone();

        if self.selected.as_deref() == Some(name) {
            self.selected = Some(new_name.clone());
        }
        self.sort();
        self.get(&new_name)
    }

    /// Select the entry with this name. Returns `false` if none exists.
    pub fn select(&mut self, name: &str) -> bool {
        if self.position(name).is_some() {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&LibraryEntry> {
        self.selected_index().map(|idx| &self.entries[idx])
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_deref().and_then(|name| self.position(name))
    }

    pub fn filter<'a>(
        &'a self,
        criteria: &'a ListFilter,
    ) -> impl Iterator<Item = &'a LibraryEntry> + 'a {
        self.entries.iter().filter(move |e| criteria.matches(e))
    }

    pub fn contains_install_path(&self, path: &str) -> bool {
        !path.is_empty() && self.entries.iter().any(|e| e.install_path == path)
    }
}
