//! Library management engine for Mortis Launcher, a front end for the DREAMM
//! emulator.
//!
//! The crate keeps a persisted library of program installations, discovers
//! titles DREAMM installed itself, lists directories for the file browser and
//! turns entries into DREAMM command lines.

pub mod discovery;
pub mod engine;
pub mod error;
pub mod launcher;
pub mod library;
pub mod paths;
pub mod scanner;
pub mod settings;

pub use engine::Engine;
pub use error::{LaunchError, StoreError};
pub use library::{Library, LibraryEntry, ListFilter, Platform, Status};
pub use paths::StorePaths;
pub use settings::Settings;
