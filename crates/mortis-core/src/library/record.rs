//! Pipe-delimited record format of `games.db`.
//!
//! Fields are positional and the schema has only ever grown at the end, so
//! the version of a record is implied by how many fields it carries:
//!
//! | version | fields | layout |
//! |---|---|---|
//! | v1 | 3..=12 | name, platform, status, exe, setup, install, windowed, maximized, fullscreen, machine, ramKB, description |
//! | v2 | 13..   | v1, iso, rootPath, mips, audioMask, videoHw, width, height, depth |
//!
//! Missing trailing fields take their defaults, extra trailing fields are
//! ignored, and a numeric field that does not parse falls back to its
//! default without dropping the record.

use std::str::FromStr;

use super::entry::{
    AudioFlags, LibraryEntry, Machine, Platform, Status, DEFAULT_VIDEO_HW, VIDEO_HARDWARE,
};

pub const FIELD_SEPARATOR: char = '|';

/// Records shorter than this are dropped.
pub const MIN_FIELDS: usize = 3;
pub const V1_FIELDS: usize = 12;
pub const V2_FIELDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    /// Version implied by a record's field count, `None` if too short.
    pub fn detect(field_count: usize) -> Option<Self> {
        if field_count < MIN_FIELDS {
            None
        } else if field_count <= V1_FIELDS {
            Some(SchemaVersion::V1)
        } else {
            Some(SchemaVersion::V2)
        }
    }
}

/// Parse `raw`, falling back to `default` when it is not a valid `T`.
pub fn parse_or<T: FromStr>(raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or(default)
}

/// Positional view over one split record.
pub(crate) struct Fields<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub(crate) fn split(line: &'a str) -> Self {
        Fields {
            parts: line.split(FIELD_SEPARATOR).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn raw(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    pub(crate) fn text(&self, index: usize) -> String {
        self.raw(index).unwrap_or_default().to_string()
    }

    pub(crate) fn flag(&self, index: usize) -> bool {
        self.raw(index) == Some("1")
    }

    pub(crate) fn number<T>(&self, index: usize, field: &str, default: T) -> T
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        let Some(raw) = self.raw(index) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!("Field {field}={raw:?} is not a number, using {default:?}");
                default
            }
        }
    }

    pub(crate) fn ordinal<E>(
        &self,
        index: usize,
        field: &str,
        from_ordinal: fn(i64) -> Option<E>,
        default: E,
    ) -> E {
        let Some(raw) = self.raw(index) else {
            return default;
        };
        match raw.trim().parse::<i64>().ok().and_then(from_ordinal) {
            Some(value) => value,
            None => {
                tracing::debug!("Field {field}={raw:?} is not a valid ordinal, using default");
                default
            }
        }
    }
}

/// Parse one line of `games.db`. Returns `None` for records that are too
/// short or have no name.
pub fn parse_record(line: &str) -> Option<LibraryEntry> {
    let fields = Fields::split(line);
    let version = SchemaVersion::detect(fields.len())?;
    if fields.raw(0).unwrap_or_default().is_empty() {
        return None;
    }

    let mut entry = entry_from_v1(&fields);
    if version >= SchemaVersion::V2 {
        apply_v2(&mut entry, &fields);
    }
    Some(entry)
}

/// Map the v1 prefix. Fields v1 does not know keep their defaults.
fn entry_from_v1(fields: &Fields<'_>) -> LibraryEntry {
    let defaults = LibraryEntry::default();
    LibraryEntry {
        name: fields.text(0),
        platform: fields.ordinal(1, "platform", Platform::from_ordinal, defaults.platform),
        status: fields.ordinal(2, "status", Status::from_ordinal, defaults.status),
        exe_path: fields.text(3),
        setup_path: fields.text(4),
        install_path: fields.text(5),
        force_windowed: fields.flag(6),
        force_maximized: fields.flag(7),
        force_fullscreen: fields.flag(8),
        machine: fields.ordinal(9, "machine", Machine::from_ordinal, defaults.machine),
        ram_kb: fields.number(10, "ramKB", defaults.ram_kb),
        description: fields.text(11),
        ..defaults
    }
}

/// Map the fields v2 appended after the description.
fn apply_v2(entry: &mut LibraryEntry, fields: &Fields<'_>) {
    let defaults = LibraryEntry::default();
    entry.iso_path = fields.text(12);
    entry.root_path_override = fields.text(13);
    entry.mips = fields.number(14, "mips", defaults.mips);
    entry.audio = fields
        .raw(15)
        .map(|raw| AudioFlags::from_mask(parse_or(raw, defaults.audio.mask())))
        .unwrap_or(defaults.audio);
    entry.video_hw = fields.number(16, "videoHw", defaults.video_hw);
    if entry.video_hw >= VIDEO_HARDWARE.len() {
        entry.video_hw = DEFAULT_VIDEO_HW;
    }
    entry.width = fields.number(17, "width", defaults.width);
    entry.height = fields.number(18, "height", defaults.height);
    entry.depth = fields.number(19, "depth", defaults.depth);
}

/// Serialize an entry in the current schema.
pub fn format_record(entry: &LibraryEntry) -> String {
    let flag = |b: bool| if b { "1" } else { "0" };
    let fields: [String; V2_FIELDS] = [
        entry.name.clone(),
        entry.platform.ordinal().to_string(),
        entry.status.ordinal().to_string(),
        entry.exe_path.clone(),
        entry.setup_path.clone(),
        entry.install_path.clone(),
        flag(entry.force_windowed).to_string(),
        flag(entry.force_maximized).to_string(),
        flag(entry.force_fullscreen).to_string(),
        entry.machine.ordinal().to_string(),
        entry.ram_kb.to_string(),
        entry.description.clone(),
        entry.iso_path.clone(),
        entry.root_path_override.clone(),
        entry.mips.to_string(),
        entry.audio.mask().to_string(),
        entry.video_hw.to_string(),
        entry.width.to_string(),
        entry.height.to_string(),
        entry.depth.to_string(),
    ];
    fields.join("|")
}
